pub mod ifc;
pub mod placement;
pub mod step;
pub mod units;

pub use ifc::parse_scene;
pub use placement::{resolve_placement, ResolvedPlacement};
pub use step::{split_parameters, StepEntity, StepFile};
pub use units::{document_unit, DocumentUnit};
