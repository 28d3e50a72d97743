use serde::{Deserialize, Serialize};

/// A named building storey with its elevation (in source units) and how
/// many extracted elements it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub elevation: f64,
    pub element_count: usize,
}
