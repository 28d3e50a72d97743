use std::collections::HashMap;

use log::debug;

/// A single STEP entity record: `#<id> = <TYPE> ( <params> ) ;`
///
/// Parameters are kept as raw top-level tokens; interpretation (reference,
/// number, string, nested list) happens at the call site via the accessors
/// below. No schema validation is done beyond the type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEntity {
    pub id: u64,
    pub entity_type: String,
    pub params: Vec<String>,
}

impl StepEntity {
    /// Token at `index` read as an entity reference (`#123`).
    #[must_use]
    pub fn reference(&self, index: usize) -> Option<u64> {
        self.params.get(index).and_then(|t| parse_reference(t))
    }

    /// Token at `index` read as a real number.
    #[must_use]
    pub fn float(&self, index: usize) -> Option<f64> {
        self.params.get(index).and_then(|t| t.parse::<f64>().ok())
    }

    /// Token at `index` read as a quoted STEP string, unescaped.
    #[must_use]
    pub fn string(&self, index: usize) -> Option<String> {
        let token = self.params.get(index)?;
        let inner = token.strip_prefix('\'')?.strip_suffix('\'')?;
        Some(decode_step_text(inner))
    }

    /// Token at `index` read as a nested numeric list (`(1.,2.,3.)`).
    #[must_use]
    pub fn float_list(&self, index: usize) -> Option<Vec<f64>> {
        let token = self.params.get(index)?;
        let inner = token.strip_prefix('(')?.strip_suffix(')')?;
        Some(
            split_parameters(inner)
                .iter()
                .filter_map(|t| t.parse::<f64>().ok())
                .collect(),
        )
    }

    /// Token at `index` read as a nested reference list (`(#4,#5)`).
    #[must_use]
    pub fn reference_list(&self, index: usize) -> Option<Vec<u64>> {
        let token = self.params.get(index)?;
        let inner = token.strip_prefix('(')?.strip_suffix(')')?;
        Some(
            split_parameters(inner)
                .iter()
                .filter_map(|t| parse_reference(t))
                .collect(),
        )
    }

    /// True when any parameter token equals the given enum marker (`.X.`).
    #[must_use]
    pub fn has_enum(&self, marker: &str) -> bool {
        self.params.iter().any(|t| t == marker)
    }
}

/// Id-keyed entity table for one document. Read-only once built, so unit
/// and element resolution can re-run against it in any order.
#[derive(Debug, Default)]
pub struct StepFile {
    pub entities: HashMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    /// Builds the entity table from document text.
    ///
    /// Lines that do not start with `#`, blank lines, and header lines are
    /// ignored. A line that starts with `#` but does not match the record
    /// grammar is skipped with a diagnostic; it never fails the parse.
    /// Duplicate ids overwrite earlier records (last write wins).
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entities = HashMap::new();
        let mut schema = String::new();

        for line in content.lines() {
            let line = line.trim();

            if line.starts_with("FILE_SCHEMA") {
                if let Some(start) = line.find("('") {
                    if let Some(end) = line[start + 2..].find('\'') {
                        schema = line[start + 2..start + 2 + end].to_string();
                    }
                }
                continue;
            }

            if !line.starts_with('#') {
                continue;
            }

            match Self::parse_entity_line(line) {
                Some(entity) => {
                    entities.insert(entity.id, entity);
                }
                None => debug!("skipping malformed entity line: {line}"),
            }
        }

        StepFile { entities, schema }
    }

    fn parse_entity_line(line: &str) -> Option<StepEntity> {
        let line = line.trim_end_matches(';').trim_end();

        let (id_part, rest) = line.split_once('=')?;
        let id: u64 = id_part.trim().strip_prefix('#')?.trim().parse().ok()?;

        let rest = rest.trim();
        let open = rest.find('(')?;
        let close = rest.rfind(')')?;
        if close < open {
            return None;
        }

        let entity_type = rest[..open].trim().to_string();
        if entity_type.is_empty() {
            return None;
        }

        Some(StepEntity {
            id,
            entity_type,
            params: split_parameters(&rest[open + 1..close]),
        })
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one type, ascending id so callers see a stable order.
    #[must_use]
    pub fn entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

/// Splits a parameter list at top-level commas.
///
/// Commas inside nested parentheses or inside quoted strings do not split;
/// a nested list like `(2,3)` stays one token. Unbalanced input flushes the
/// trailing accumulation instead of failing. Pure and stateless.
#[must_use]
pub fn split_parameters(params: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut in_string = false;

    for ch in params.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(ch);
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if !in_string && depth == 0 => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    tokens
}

/// Reads an entity reference token (`#123`).
#[must_use]
pub fn parse_reference(token: &str) -> Option<u64> {
    token.trim().strip_prefix('#')?.parse().ok()
}

/// Unescapes STEP string content: `''` apostrophes, `\\`, and the
/// `\X2\..\X0\`, `\X\hh`, `\S\c` encodings.
fn decode_step_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cur = s;

    while !cur.is_empty() {
        if let Some(rest) = cur.strip_prefix("''") {
            out.push('\'');
            cur = rest;
        } else if let Some(rest) = cur.strip_prefix("\\\\") {
            out.push('\\');
            cur = rest;
        } else if let Some(rest) = cur.strip_prefix("\\X2\\") {
            let (hex, tail) = rest.split_once("\\X0\\").unwrap_or((rest, ""));
            for chunk in hex.as_bytes().chunks(4) {
                let code = std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .and_then(char::from_u32);
                if let Some(c) = code {
                    out.push(c);
                }
            }
            cur = tail;
        } else if let Some(rest) = cur.strip_prefix("\\X\\") {
            if rest.len() >= 2 && rest.is_char_boundary(2) {
                if let Ok(code) = u8::from_str_radix(&rest[..2], 16) {
                    out.push(code as char);
                }
                cur = &rest[2..];
            } else {
                cur = "";
            }
        } else if let Some(rest) = cur.strip_prefix("\\S\\") {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(((c as u8).wrapping_add(128)) as char);
            }
            cur = chars.as_str();
        } else {
            let mut chars = cur.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            cur = chars.as_str();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_at_top_level_commas_only() {
        assert_eq!(split_parameters("1,(2,3),4"), vec!["1", "(2,3)", "4"]);
    }

    #[test]
    fn split_preserves_quoted_commas() {
        assert_eq!(split_parameters("'a,b',#5,$"), vec!["'a,b'", "#5", "$"]);
    }

    #[test]
    fn split_of_empty_input_is_empty() {
        assert_eq!(split_parameters(""), Vec::<String>::new());
    }

    #[test]
    fn split_flushes_unbalanced_input() {
        assert_eq!(split_parameters("1,(2,3"), vec!["1", "(2,3"]);
    }

    #[test]
    fn parses_entity_lines() {
        let file = StepFile::parse(
            "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
             #1=IFCCARTESIANPOINT((0.,0.,0.));\n\
             #2 = IFCWALL ( 'guid', $, 'Wall', $, $, #3, $, $ )\n\
             ENDSEC;\n",
        );

        assert_eq!(file.schema, "IFC4");
        assert_eq!(file.entities.len(), 2);

        let wall = file.get_entity(2).unwrap();
        assert_eq!(wall.entity_type, "IFCWALL");
        assert_eq!(wall.string(2), Some("Wall".to_string()));
        assert_eq!(wall.reference(5), Some(3));

        let point = file.get_entity(1).unwrap();
        assert_eq!(point.float_list(0), Some(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn malformed_marker_lines_are_skipped() {
        let file =
            StepFile::parse("#notanid=IFCWALL();\n#=IFCWALL();\n#7 garbage\n#8=IFCSLAB($);\n");
        assert_eq!(file.entities.len(), 1);
        assert!(file.get_entity(8).is_some());
    }

    #[test]
    fn duplicate_ids_take_the_last_record() {
        let file = StepFile::parse("#1=IFCWALL($);\n#1=IFCSLAB($);\n");
        assert_eq!(file.get_entity(1).unwrap().entity_type, "IFCSLAB");
    }

    #[test]
    fn decodes_escaped_strings() {
        let file = StepFile::parse("#1=IFCWALL('it''s \\X2\\00E9\\X0\\');");
        let entity = file.get_entity(1).unwrap();
        assert_eq!(entity.string(0), Some("it's \u{e9}".to_string()));
    }

    #[test]
    fn entities_by_type_is_id_ordered() {
        let file = StepFile::parse("#9=IFCWALL($);\n#2=IFCWALL($);\n#5=IFCSLAB($);\n");
        let ids: Vec<u64> = file
            .entities_by_type("IFCWALL")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 9]);
    }
}
