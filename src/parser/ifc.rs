use std::collections::HashMap;

use log::debug;

use crate::model::{summarize, ElementKind, Level, PositionedElement, SceneModel};
use crate::parser::placement::{self, resolve_placement};
use crate::parser::step::{parse_reference, StepEntity, StepFile};
use crate::parser::units::{self, DocumentUnit};

// Entity type tag to element kind (IFC4 and IFC2X3 compatible).
const ELEMENT_KINDS: &[(&str, ElementKind)] = &[
    ("IFCWALL", ElementKind::Wall),
    ("IFCWALLSTANDARDCASE", ElementKind::Wall),
    ("IFCSLAB", ElementKind::Slab),
    ("IFCBEAM", ElementKind::Beam),
    ("IFCCOLUMN", ElementKind::Column),
    ("IFCDOOR", ElementKind::Door),
    ("IFCWINDOW", ElementKind::Window),
    ("IFCSTAIR", ElementKind::Stair),
];

// Fallback grid for elements without resolvable placement data.
const GRID_SPACING: f64 = 5.0;
const GRID_HEIGHT: f64 = 0.0;

/// Runs the whole pipeline over document text: entity table, unit
/// detection, element extraction with placement resolution, summary rows.
///
/// Per-record problems degrade to safe defaults; this never fails.
#[must_use]
pub fn parse_scene(content: &str) -> SceneModel {
    let step = StepFile::parse(content);
    let unit = units::document_unit(&step);
    let (elements, levels) = extract_elements(&step, &unit);
    let summary = summarize(&elements, None);

    SceneModel {
        schema: step.schema,
        unit: unit.label,
        levels,
        elements,
        summary,
    }
}

fn kind_of(entity_type: &str) -> Option<ElementKind> {
    ELEMENT_KINDS
        .iter()
        .find(|(tag, _)| *tag == entity_type)
        .map(|(_, kind)| *kind)
}

/// Extracts every recognized element with an absolute position.
///
/// Matches are visited in ascending id order so that extraction order, and
/// with it the fallback grid, is deterministic. Elements without a
/// resolvable local placement get a grid cell instead of being dropped.
fn extract_elements(step: &StepFile, unit: &DocumentUnit) -> (Vec<PositionedElement>, Vec<Level>) {
    let storeys = extract_storeys(step);
    let element_to_storey = extract_spatial_containment(step);

    let mut matched: Vec<(&StepEntity, ElementKind)> = step
        .entities
        .values()
        .filter_map(|e| kind_of(&e.entity_type).map(|k| (e, k)))
        .collect();
    matched.sort_by_key(|(e, _)| e.id);

    let grid_side = (matched.len() as f64).sqrt().ceil().max(1.0) as usize;

    let mut elements = Vec::with_capacity(matched.len());
    let mut storey_counts: HashMap<u64, usize> = HashMap::new();

    for (index, (entity, kind)) in matched.iter().enumerate() {
        let storey_id = element_to_storey.get(&entity.id).copied();
        if let Some(sid) = storey_id {
            *storey_counts.entry(sid).or_insert(0) += 1;
        }

        let level = storey_id
            .and_then(|sid| storeys.iter().find(|s| s.0 == sid))
            .map(|s| s.1.clone());

        let unit_label = unit.label.clone();
        let scale = units::element_scale(unit, unit_label.as_deref());

        let (position, yaw) = match placement_reference(step, entity) {
            Some(placement_id) => {
                let resolved = resolve_placement(step, placement_id, scale);
                (resolved.translation, resolved.yaw)
            }
            None => {
                debug!(
                    "{} #{} has no resolvable placement, using grid fallback",
                    entity.entity_type, entity.id
                );
                (grid_position(index, grid_side), 0.0)
            }
        };

        elements.push(PositionedElement {
            id: entity.id,
            kind: *kind,
            position,
            yaw,
            level,
            unit: unit_label,
        });
    }

    let mut levels: Vec<Level> = storeys
        .into_iter()
        .map(|(id, name, elevation)| Level {
            name,
            elevation,
            element_count: storey_counts.get(&id).copied().unwrap_or(0),
        })
        .collect();

    // Roof first, matching how viewers list storeys.
    levels.sort_by(|a, b| {
        b.elevation
            .partial_cmp(&a.elevation)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    (elements, levels)
}

/// First parameter token that references a local placement entity.
fn placement_reference(step: &StepFile, entity: &StepEntity) -> Option<u64> {
    entity
        .params
        .iter()
        .filter_map(|t| parse_reference(t))
        .find(|&id| {
            step.get_entity(id)
                .is_some_and(|e| e.entity_type == placement::LOCAL_PLACEMENT)
        })
}

/// Deterministic square-grid cell for placement-less elements: side is
/// `ceil(sqrt(total))`, so every extraction index maps to its own cell.
fn grid_position(index: usize, side: usize) -> [f64; 3] {
    let row = index / side;
    let col = index % side;
    [
        col as f64 * GRID_SPACING,
        GRID_HEIGHT,
        row as f64 * GRID_SPACING,
    ]
}

/// Storey id, name and elevation, ascending id order.
fn extract_storeys(step: &StepFile) -> Vec<(u64, String, f64)> {
    step.entities_by_type("IFCBUILDINGSTOREY")
        .iter()
        .map(|e| {
            let name = e
                .string(2)
                .unwrap_or_else(|| format!("Storey #{}", e.id));
            let elevation = e.float(9).unwrap_or(0.0);
            (e.id, name, elevation)
        })
        .collect()
}

/// Element to storey map from spatial containment relations.
fn extract_spatial_containment(step: &StepFile) -> HashMap<u64, u64> {
    let mut element_to_storey = HashMap::new();

    for rel in step.entities_by_type("IFCRELCONTAINEDINSPATIALSTRUCTURE") {
        // Index 4 = RelatedElements (list), index 5 = RelatingStructure.
        let Some(storey_id) = rel.reference(5) else {
            continue;
        };
        for element_id in rel.reference_list(4).unwrap_or_default() {
            element_to_storey.insert(element_id, storey_id);
        }
    }

    element_to_storey
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MILLI_DOC: &str = "ISO-10303-21;\n\
        HEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
        #10=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
        #1=IFCCARTESIANPOINT((0.,0.,0.));\n\
        #2=IFCAXIS2PLACEMENT3D(#1,$,$);\n\
        #3=IFCLOCALPLACEMENT($,#2);\n\
        #4=IFCWALL('guid',$,'Wall',$,$,#3,$,$);\n\
        ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn single_wall_document_end_to_end() {
        let scene = parse_scene(MILLI_DOC);

        assert_eq!(scene.schema, "IFC4");
        assert_eq!(scene.unit, Some("MILLIMETRE".to_string()));
        assert_eq!(scene.elements.len(), 1);

        let wall = &scene.elements[0];
        assert_eq!(wall.id, 4);
        assert_eq!(wall.kind, ElementKind::Wall);
        assert_eq!(wall.position, [0.0, 0.0, 0.0]);
        assert_eq!(wall.yaw, 0.0);

        assert_eq!(scene.summary.len(), 1);
        assert_eq!(scene.summary[0].kind, ElementKind::Wall);
        assert_eq!(scene.summary[0].count, 1);
    }

    #[test]
    fn milli_scale_applies_through_placement() {
        let scene = parse_scene(
            "#10=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
             #1=IFCCARTESIANPOINT((1000.,2000.,3000.));\n\
             #2=IFCAXIS2PLACEMENT3D(#1,$,$);\n\
             #3=IFCLOCALPLACEMENT($,#2);\n\
             #4=IFCCOLUMN('guid',$,'C1',$,$,#3,$,$);\n",
        );
        assert_eq!(scene.elements[0].position, [1.0, 3.0, 2.0]);
    }

    #[test]
    fn placement_less_elements_fall_back_to_distinct_grid_cells() {
        let scene = parse_scene(
            "#1=IFCWALL('a',$,'W1',$,$,$,$,$);\n\
             #2=IFCWALL('b',$,'W2',$,$,$,$,$);\n\
             #3=IFCDOOR('c',$,'D1',$,$,$,$,$);\n\
             #4=IFCDOOR('d',$,'D2',$,$,$,$,$);\n\
             #5=IFCSLAB('e',$,'S1',$,$,$,$);\n",
        );

        assert_eq!(scene.elements.len(), 5);
        let mut cells: Vec<(i64, i64)> = scene
            .elements
            .iter()
            .map(|e| (e.position[0] as i64, e.position[2] as i64))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 5, "fallback cells must not collide");
        for element in &scene.elements {
            assert_eq!(element.position[1], GRID_HEIGHT);
        }
    }

    #[test]
    fn elements_carry_their_storey_name() {
        let scene = parse_scene(
            "#1=IFCBUILDINGSTOREY('g',$,'Level 2',$,$,$,$,$,$,3000.);\n\
             #2=IFCWALL('w',$,'Wall',$,$,$,$,$);\n\
             #3=IFCRELCONTAINEDINSPATIALSTRUCTURE('r',$,$,$,(#2),#1);\n",
        );

        assert_eq!(scene.elements[0].level, Some("Level 2".to_string()));
        assert_eq!(
            scene.levels,
            vec![Level {
                name: "Level 2".to_string(),
                elevation: 3000.0,
                element_count: 1,
            }]
        );
    }

    #[test]
    fn levels_are_listed_roof_first() {
        let scene = parse_scene(
            "#1=IFCBUILDINGSTOREY('a',$,'Ground',$,$,$,$,$,$,0.);\n\
             #2=IFCBUILDINGSTOREY('b',$,'Roof',$,$,$,$,$,$,6000.);\n",
        );
        let names: Vec<&str> = scene.levels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Roof", "Ground"]);
    }

    #[test]
    fn unrecognized_entities_are_ignored() {
        let scene = parse_scene("#1=IFCROOF('a',$,'R',$,$,$,$,$);\n#2=IFCWALL('b',$,'W',$,$,$,$,$);\n");
        assert_eq!(scene.elements.len(), 1);
        assert_eq!(scene.elements[0].kind, ElementKind::Wall);
    }

    #[test]
    fn extraction_order_is_ascending_id() {
        let scene = parse_scene(
            "#9=IFCWALL('a',$,'W9',$,$,$,$,$);\n\
             #2=IFCWALL('b',$,'W2',$,$,$,$,$);\n\
             #5=IFCWALL('c',$,'W5',$,$,$,$,$);\n",
        );
        let ids: Vec<u64> = scene.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
