use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::ExportError;
use crate::model::SceneModel;

/// Writes the whole scene (elements, levels, summary) as pretty JSON.
pub fn export_json<P: AsRef<Path>>(scene: &SceneModel, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    serde_json::to_writer_pretty(BufWriter::new(file), scene)?;
    Ok(())
}
