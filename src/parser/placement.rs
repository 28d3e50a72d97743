use log::debug;

use crate::parser::step::{parse_reference, StepEntity, StepFile};

/// Walk limit for the parent chain; malformed documents can reference
/// themselves, so the fold must terminate without relying on input shape.
const MAX_CHAIN_STEPS: usize = 128;

pub(crate) const LOCAL_PLACEMENT: &str = "IFCLOCALPLACEMENT";
const CARTESIAN_POINT: &str = "IFCCARTESIANPOINT";
const DIRECTION: &str = "IFCDIRECTION";

/// Absolute placement in viewer coordinates: translation in meters
/// (X-east, Y-up, Z-south) and yaw about the vertical axis in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedPlacement {
    pub translation: [f64; 3],
    pub yaw: f64,
}

/// One frame of a placement chain, already remapped to target axes.
#[derive(Debug, Clone, Copy)]
struct Frame {
    translation: [f64; 3],
    yaw: f64,
}

/// Resolves a local-placement reference to an absolute translation and yaw
/// by walking the parent chain.
///
/// Best effort by construction: an unresolved reference, a target that is
/// not a local placement, or an overlong/cyclic chain ends the walk and the
/// accumulation so far is returned. This never fails.
#[must_use]
pub fn resolve_placement(step: &StepFile, start_id: u64, scale: f64) -> ResolvedPlacement {
    // Innermost frame first; the fold below runs outermost first so parent
    // rotations apply to child offsets.
    let mut chain: Vec<Frame> = Vec::new();
    let mut next = Some(start_id);

    while let Some(id) = next {
        if chain.len() >= MAX_CHAIN_STEPS {
            debug!("placement chain from #{start_id} exceeds {MAX_CHAIN_STEPS} steps, truncating");
            break;
        }

        let placement = match step.get_entity(id) {
            Some(e) if e.entity_type == LOCAL_PLACEMENT => e,
            _ => break,
        };

        // IFCLOCALPLACEMENT(PlacementRelTo, RelativePlacement)
        let axis = placement.reference(1).and_then(|r| step.get_entity(r));
        chain.push(resolve_axis_placement(step, axis, scale));

        next = placement.reference(0);
    }

    let mut acc = ResolvedPlacement::default();
    for frame in chain.iter().rev() {
        let [x, y, z] = frame.translation;
        let (sin, cos) = acc.yaw.sin_cos();
        acc.translation[0] += cos * x + sin * z;
        acc.translation[1] += y;
        acc.translation[2] += -sin * x + cos * z;
        acc.yaw += frame.yaw;
    }

    acc
}

/// Resolves one axis placement to a target-space frame.
///
/// The location point is scaled to meters and remapped from source axes
/// (X-east, Y-north, Z-up) to target axes (X-east, Y-up, Z-south); the
/// optional reference direction contributes `atan2(dy, dx)` as local yaw.
/// A missing point means origin, a missing direction zero yaw.
fn resolve_axis_placement(step: &StepFile, axis: Option<&StepEntity>, scale: f64) -> Frame {
    let mut frame = Frame {
        translation: [0.0; 3],
        yaw: 0.0,
    };

    let Some(axis) = axis else {
        return frame;
    };

    // IFCAXIS2PLACEMENT3D(Location, Axis, RefDirection)
    if let Some(point) = axis
        .reference(0)
        .and_then(|r| step.get_entity(r))
        .filter(|e| e.entity_type == CARTESIAN_POINT)
        .and_then(|e| e.float_list(0))
    {
        let coord = |i: usize| point.get(i).copied().unwrap_or(0.0) * scale;
        frame.translation = [coord(0), coord(2), coord(1)];
    }

    // Axis2 placements carry the reference direction last (after the
    // optional vertical axis in the 3D form).
    let direction = axis
        .params
        .iter()
        .skip(1)
        .filter_map(|t| parse_reference(t))
        .filter_map(|r| step.get_entity(r))
        .filter(|e| e.entity_type == DIRECTION)
        .last()
        .and_then(|e| e.float_list(0));

    if let Some(ratios) = direction {
        if ratios.len() >= 2 {
            frame.yaw = ratios[1].atan2(ratios[0]);
        }
    }

    frame
}
