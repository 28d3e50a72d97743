//! Load boundaries: raw documents, pre-structured payloads, and the
//! generation-token store that keeps overlapping loads from clobbering
//! each other.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{summarize, PositionedElement, SceneModel, SummaryItem};
use crate::parser::parse_scene;

/// Loads and parses a document from disk.
///
/// Reading is the only fallible step; a transport failure is fatal for this
/// load alone and leaves any previously committed scene untouched.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SceneModel, LoadError> {
    let content = std::fs::read_to_string(&path).map_err(|source| LoadError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    Ok(parse_scene(&content))
}

/// An already-structured payload produced upstream: an element list and an
/// optional summary in the same shapes this crate emits.
#[derive(Debug, Deserialize)]
struct ScenePayload {
    elements: Vec<PositionedElement>,
    #[serde(default)]
    summary: Option<Vec<SummaryItem>>,
}

/// Builds a scene from a pre-structured JSON payload, bypassing parsing.
///
/// A payload without summary rows gets them recomputed from its elements.
pub fn scene_from_payload(json: &str) -> Result<SceneModel, LoadError> {
    let payload: ScenePayload = serde_json::from_str(json)?;
    let summary = payload
        .summary
        .unwrap_or_else(|| summarize(&payload.elements, None));
    let unit = payload.elements.iter().find_map(|e| e.unit.clone());

    Ok(SceneModel {
        schema: String::new(),
        unit,
        levels: Vec::new(),
        elements: payload.elements,
        summary,
    })
}

/// Token handed out per load attempt; only the newest one may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Holds the currently displayed scene across overlapping loads.
///
/// A new load can start before a prior one resolves, so every attempt is
/// tagged with a monotonically increasing generation; a result arriving
/// with a stale token is discarded instead of overwriting newer data.
#[derive(Debug, Default)]
pub struct SceneStore {
    generation: u64,
    scene: Option<SceneModel>,
}

impl SceneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load attempt, invalidating all earlier tokens.
    pub fn begin(&mut self) -> LoadToken {
        self.generation += 1;
        LoadToken(self.generation)
    }

    /// Installs `scene` when `token` is still current; returns whether the
    /// result was accepted.
    pub fn commit(&mut self, token: LoadToken, scene: SceneModel) -> bool {
        if token.0 == self.generation {
            self.scene = Some(scene);
            true
        } else {
            debug!(
                "discarding stale load result (generation {} < {})",
                token.0, self.generation
            );
            false
        }
    }

    #[must_use]
    pub fn scene(&self) -> Option<&SceneModel> {
        self.scene.as_ref()
    }
}
