use crate::error::ExportError;
use crate::model::SceneModel;
use std::fs::File;
use std::path::Path;

pub fn export_csv<P: AsRef<Path>>(scene: &SceneModel, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["Type", "Count", "Unit"])?;

    for item in &scene.summary {
        let count = item.count.to_string();
        writer.write_record([
            item.kind.label(),
            count.as_str(),
            item.unit.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
