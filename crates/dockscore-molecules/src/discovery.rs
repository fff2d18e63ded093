//! Discovery of docking result files.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default directory holding scored ligands.
pub const DEFAULT_INPUT_DIR: &str = "scored";

/// Default file name suffix of a scored ligand.
pub const DEFAULT_SUFFIX: &str = "_scored.sdf";

/// A result file and the ligand id derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub ligand: String,
}

impl CandidateFile {
    /// Build from a path, stripping `suffix` from the file name. Returns
    /// `None` when the name does not end with the suffix.
    pub fn from_path(path: &Path, suffix: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let ligand = name.strip_suffix(suffix)?;
        Some(Self {
            path: path.to_path_buf(),
            ligand: ligand.to_string(),
        })
    }
}

/// List result files directly under `dir` whose names end with `suffix`.
///
/// Hidden files are skipped, as a shell glob would. The result is sorted by
/// path so repeated runs over the same directory visit files in the same
/// order. A missing or unreadable directory is an empty result.
pub fn discover(dir: &Path, suffix: &str) -> Vec<CandidateFile> {
    let entries = match dir.read_dir() {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Input directory does not exist");
            return Vec::new();
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot read input directory");
            return Vec::new();
        }
    };

    let mut files: Vec<CandidateFile> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|path| {
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'))
        })
        // metadata() follows symlinks
        .filter(|path| path.metadata().map(|m| m.is_file()).unwrap_or(false))
        .filter_map(|path| CandidateFile::from_path(&path, suffix))
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!(dir = %dir.display(), n_files = files.len(), "Discovered result files");
    files
}
