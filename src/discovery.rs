use crate::error::EtlError;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Data files found under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl DataFiles {
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Recursively collects the absolute paths of every regular file under
/// `root` whose extension is `extension`. Paths are sorted.
pub fn find_data_files(root: &Path, extension: &str) -> Result<DataFiles, EtlError> {
    let root = root.canonicalize().map_err(|e| EtlError::Discovery {
        root: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !root.is_dir() {
        return Err(EtlError::Discovery {
            root,
            reason: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();

    Ok(DataFiles { root, files })
}
