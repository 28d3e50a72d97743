use serde::Serialize;

use super::{Level, PositionedElement, SummaryItem};

/// The complete result set of one document load.
///
/// Plain serializable data with no references back into the parser; each
/// load produces a fresh, independently owned instance.
#[derive(Debug, Default, Serialize)]
pub struct SceneModel {
    pub schema: String,
    /// Declared document length unit label, when one was found.
    pub unit: Option<String>,
    pub levels: Vec<Level>,
    pub elements: Vec<PositionedElement>,
    pub summary: Vec<SummaryItem>,
}

impl SceneModel {
    #[must_use]
    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }
}
