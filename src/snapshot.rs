use crate::error::Result;
use crate::models::Snapshot;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Write `snapshot` to `path`, replacing whatever was there.
///
/// The document goes to a temporary file next to the target first and is
/// renamed into place, so readers never observe a half-written snapshot.
pub fn persist(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut file, snapshot)?;
    file.write_all(b"\n")?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), count = snapshot.count(), "Snapshot written");
    Ok(())
}
