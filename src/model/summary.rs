use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{ElementKind, PositionedElement};

/// One aggregated summary row for a kind of element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub unit: Option<String>,
    pub count: usize,
    /// Level name to accumulated measure; present only when measure data
    /// was supplied alongside the elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<BTreeMap<String, f64>>,
}

/// Reduces a positioned-element list to per-kind summary rows.
///
/// Count is the number of elements of that kind; unit is the first
/// non-null unit seen for the kind in input order and is never overwritten.
/// When `measures` (element id to numeric measure) is supplied, each row
/// also carries per-level totals for the elements that have both a level
/// and a measure. Rows are ordered by descending count, ties keeping
/// first-encountered order. Pure: identical input yields identical output.
#[must_use]
pub fn summarize(
    elements: &[PositionedElement],
    measures: Option<&HashMap<u64, f64>>,
) -> Vec<SummaryItem> {
    let mut order: Vec<ElementKind> = Vec::new();
    let mut rows: HashMap<ElementKind, SummaryItem> = HashMap::new();

    for element in elements {
        let row = rows.entry(element.kind).or_insert_with(|| {
            order.push(element.kind);
            SummaryItem {
                kind: element.kind,
                unit: None,
                count: 0,
                totals: measures.map(|_| BTreeMap::new()),
            }
        });

        row.count += 1;
        if row.unit.is_none() {
            row.unit.clone_from(&element.unit);
        }

        if let (Some(measures), Some(level)) = (measures, element.level.as_deref()) {
            if let Some(measure) = measures.get(&element.id) {
                if let Some(totals) = row.totals.as_mut() {
                    *totals.entry(level.to_string()).or_insert(0.0) += measure;
                }
            }
        }
    }

    let mut items: Vec<SummaryItem> = order
        .into_iter()
        .filter_map(|kind| rows.remove(&kind))
        .collect();
    // Stable sort keeps first-encountered order within equal counts.
    items.sort_by_key(|item| std::cmp::Reverse(item.count));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(id: u64, kind: ElementKind, level: Option<&str>, unit: Option<&str>) -> PositionedElement {
        PositionedElement {
            id,
            kind,
            position: [0.0; 3],
            yaw: 0.0,
            level: level.map(str::to_string),
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn counts_per_kind_and_sorts_by_descending_count() {
        let elements = vec![
            element(1, ElementKind::Door, None, None),
            element(2, ElementKind::Wall, None, None),
            element(3, ElementKind::Wall, None, None),
        ];

        let summary = summarize(&elements, None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].kind, ElementKind::Wall);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[1].kind, ElementKind::Door);
        assert_eq!(summary[1].count, 1);
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let elements = vec![
            element(1, ElementKind::Window, None, None),
            element(2, ElementKind::Beam, None, None),
            element(3, ElementKind::Column, None, None),
        ];

        let kinds: Vec<ElementKind> = summarize(&elements, None).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Window, ElementKind::Beam, ElementKind::Column]
        );
    }

    #[test]
    fn first_seen_unit_is_never_overwritten() {
        let elements = vec![
            element(1, ElementKind::Wall, None, None),
            element(2, ElementKind::Wall, None, Some("MILLIMETRE")),
            element(3, ElementKind::Wall, None, Some("METRE")),
        ];

        assert_eq!(
            summarize(&elements, None)[0].unit,
            Some("MILLIMETRE".to_string())
        );
    }

    #[test]
    fn is_idempotent() {
        let elements = vec![
            element(1, ElementKind::Wall, Some("L1"), Some("METRE")),
            element(2, ElementKind::Slab, Some("L2"), None),
            element(3, ElementKind::Wall, Some("L2"), None),
        ];

        assert_eq!(summarize(&elements, None), summarize(&elements, None));
    }

    #[test]
    fn totals_accumulate_per_level_when_measures_supplied() {
        let elements = vec![
            element(1, ElementKind::Wall, Some("L1"), None),
            element(2, ElementKind::Wall, Some("L1"), None),
            element(3, ElementKind::Wall, Some("L2"), None),
            element(4, ElementKind::Wall, None, None),
        ];
        let measures = HashMap::from([(1, 2.5), (2, 1.5), (3, 4.0), (4, 9.0)]);

        let summary = summarize(&elements, Some(&measures));
        let totals = summary[0].totals.as_ref().unwrap();
        assert_eq!(totals.get("L1"), Some(&4.0));
        assert_eq!(totals.get("L2"), Some(&4.0));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn totals_are_absent_without_measures() {
        let elements = vec![element(1, ElementKind::Stair, Some("L1"), None)];
        assert_eq!(summarize(&elements, None)[0].totals, None);
    }
}
