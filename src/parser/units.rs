use log::debug;

use crate::parser::step::StepFile;

/// Document-level length unit: a scale to meters plus the declared label
/// (prefix and base name concatenated, e.g. `MILLIMETRE`).
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUnit {
    pub scale: f64,
    pub label: Option<String>,
}

impl Default for DocumentUnit {
    fn default() -> Self {
        Self {
            scale: 1.0,
            label: None,
        }
    }
}

const LENGTH_UNIT_MARKER: &str = ".LENGTHUNIT.";

const PREFIX_SCALES: &[(&str, f64)] = &[
    ("MILLI", 0.001),
    ("CENTI", 0.01),
    ("DECI", 0.1),
    ("MICRO", 1e-6),
];

/// Scans the entity table for a length-unit declaration.
///
/// Any entity whose type tag contains `UNIT` and whose parameters carry the
/// `.LENGTHUNIT.` marker counts as the declaration; the first one in id
/// order wins. Absent or unrecognized declarations degrade to meters,
/// never to an error.
#[must_use]
pub fn document_unit(step: &StepFile) -> DocumentUnit {
    let mut unit_entities: Vec<_> = step
        .entities
        .values()
        .filter(|e| e.entity_type.contains("UNIT") && e.has_enum(LENGTH_UNIT_MARKER))
        .collect();
    unit_entities.sort_by_key(|e| e.id);

    let Some(entity) = unit_entities.first() else {
        return DocumentUnit::default();
    };

    let prefix = entity.params.iter().find_map(|token| {
        let inner = token.strip_prefix('.')?.strip_suffix('.')?;
        PREFIX_SCALES.iter().find(|(name, _)| *name == inner)
    });

    let base = entity
        .params
        .iter()
        .rev()
        .find_map(|token| {
            let inner = token.strip_prefix('.')?.strip_suffix('.')?;
            (inner != "LENGTHUNIT" && inner.contains("METRE")).then(|| inner.to_string())
        })
        .unwrap_or_else(|| "METRE".to_string());

    match prefix {
        Some((name, scale)) => DocumentUnit {
            scale: *scale,
            label: Some(format!("{name}{base}")),
        },
        None => {
            debug!(
                "length unit #{} has no recognized prefix, using meters",
                entity.id
            );
            DocumentUnit {
                scale: 1.0,
                label: Some(base),
            }
        }
    }
}

/// Scale to meters for a free-text per-element unit string.
///
/// Case-insensitive substring match; anything unrecognized is treated as
/// meters.
#[must_use]
pub fn hint_scale(unit: &str) -> f64 {
    let unit = unit.to_ascii_lowercase();
    if unit.contains("milli") {
        0.001
    } else if unit.contains("centi") {
        0.01
    } else if unit.contains("deci") {
        0.1
    } else if unit.contains("micro") {
        1e-6
    } else if unit.contains("foot") || unit.contains("feet") {
        0.3048
    } else if unit.contains("inch") {
        0.0254
    } else {
        1.0
    }
}

/// Scale for one element: a per-element unit hint, when present, overrides
/// the document-level scale for that element only.
#[must_use]
pub fn element_scale(document: &DocumentUnit, hint: Option<&str>) -> f64 {
    match hint {
        Some(unit) => hint_scale(unit),
        None => document.scale,
    }
}
