//! Per-file molecule extraction with failure isolation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::discovery::CandidateFile;
use crate::parser::MoleculeParser;
use crate::record::ChemRecord;

/// Cause recorded when a file opens but yields no usable molecule.
pub const NO_MOLECULES_PARSED: &str = "no molecules parsed";

/// A file that contributed no rows, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub ligand: String,
    pub cause: String,
}

impl FailureEntry {
    pub fn new(ligand: &str, cause: impl Into<String>) -> Self {
        Self {
            ligand: ligand.to_string(),
            cause: cause.into(),
        }
    }
}

/// Outcome of reading one file: at least one molecule, or a failure.
pub enum Extraction {
    Parsed(Vec<Box<dyn ChemRecord>>),
    Failed(FailureEntry),
}

impl std::fmt::Debug for Extraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extraction::Parsed(mols) => f.debug_tuple("Parsed").field(&mols.len()).finish(),
            Extraction::Failed(entry) => f.debug_tuple("Failed").field(entry).finish(),
        }
    }
}

/// Parse `file` and drop placeholder entries. Parser errors are returned as
/// data so the caller can move on to the next file.
pub fn extract(parser: &dyn MoleculeParser, file: &CandidateFile) -> Extraction {
    let entries = match parser.parse_file(&file.path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(ligand = %file.ligand, error = %e, "Failed to parse result file");
            return Extraction::Failed(FailureEntry::new(&file.ligand, e.to_string()));
        }
    };

    let total = entries.len();
    let mols: Vec<Box<dyn ChemRecord>> = entries.into_iter().flatten().collect();
    debug!(ligand = %file.ligand, total, usable = mols.len(), "Parsed result file");

    if mols.is_empty() {
        warn!(ligand = %file.ligand, "No molecules parsed from result file");
        return Extraction::Failed(FailureEntry::new(&file.ligand, NO_MOLECULES_PARSED));
    }

    Extraction::Parsed(mols)
}
