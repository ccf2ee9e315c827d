//! Loading dialog documents from `<root>/<category>/<name>.json`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RavelError, Result};
use crate::graph::Dialog;

/// Well-known dialog categories.
pub struct DialogCategory;

impl DialogCategory {
    pub const EXAMPLES: &'static str = "examples";
}

/// Path of a named dialog within a category.
pub fn dialog_path(root: &Path, name: &str, category: &str) -> PathBuf {
    root.join(category).join(format!("{}.json", name))
}

/// Read and parse a dialog by name and category.
pub async fn load_dialog(root: &Path, name: &str, category: &str) -> Result<Dialog> {
    let path = dialog_path(root, name, category);
    debug!(path = %path.display(), "Loading dialog");

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RavelError::DialogNotFound(path.display().to_string())
        } else {
            RavelError::Io(e)
        }
    })?;

    Dialog::from_json_str(&content)
}

/// List the dialog names available in a category, sorted.
pub async fn list_dialogs(root: &Path, category: &str) -> Result<Vec<String>> {
    let dir = root.join(category);
    let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RavelError::DialogNotFound(dir.display().to_string())
        } else {
            RavelError::Io(e)
        }
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
