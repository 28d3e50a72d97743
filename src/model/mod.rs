pub mod element;
pub mod level;
pub mod scene;
pub mod summary;

pub use element::{ElementKind, PositionedElement};
pub use level::Level;
pub use scene::SceneModel;
pub use summary::{summarize, SummaryItem};
