use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// The only parts of a previous snapshot a run looks at.
#[derive(Debug, Deserialize)]
struct PreviousSnapshot {
    last_updated: Option<String>,
    count: Option<u64>,
}

/// Read the `last_updated` checkpoint left by the previous run.
///
/// Never fails: a missing, unreadable or malformed file means there is no
/// checkpoint and the run does a full query.
pub fn load_last_checkpoint(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No previous snapshot");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read previous snapshot");
            return None;
        }
    };

    let previous: PreviousSnapshot = match serde_json::from_str(&contents) {
        Ok(previous) => previous,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Previous snapshot is not valid JSON");
            return None;
        }
    };

    if let Some(last_updated) = &previous.last_updated {
        info!(
            last_updated = %last_updated,
            previous_count = previous.count.unwrap_or(0),
            "Loaded checkpoint from previous snapshot"
        );
    }

    previous.last_updated
}
