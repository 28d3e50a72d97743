use serde::{Deserialize, Serialize};

/// The recognized building-element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Wall,
    Slab,
    Beam,
    Column,
    Door,
    Window,
    Stair,
}

impl ElementKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Slab => "Slab",
            Self::Beam => "Beam",
            Self::Column => "Column",
            Self::Door => "Door",
            Self::Window => "Window",
            Self::Stair => "Stair",
        }
    }
}

/// One extracted element with its absolute placement.
///
/// Position is meters in viewer axes (X-east, Y-up, Z-south), yaw is
/// radians about the vertical axis. Instances are replaced wholesale per
/// document load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedElement {
    pub id: u64,
    pub kind: ElementKind,
    pub position: [f64; 3],
    pub yaw: f64,
    pub level: Option<String>,
    pub unit: Option<String>,
}
