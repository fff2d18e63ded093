//! Trait for chemical file parsers.
//!
//! Provides an abstraction over the file-to-molecules step so extraction can
//! run against the built-in SD reader, another backend, or canned data in
//! tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{ChemRecord, MockRecord};

/// Entries produced from one file. `None` marks an entry the parser could
/// not build even though the file as a whole was readable.
pub type ParsedEntries = Vec<Option<Box<dyn ChemRecord>>>;

/// A file-level parse failure. The display text becomes the failure cause
/// shown in the run report.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8 (byte offset {offset})")]
    Encoding { offset: usize },

    #[error("{0}")]
    Message(String),
}

/// Turns a file into a sequence of molecule entries.
///
/// Implementations must not validate chemistry: unusual valences, charges or
/// explicit hydrogens are kept as authored. Only input that cannot be read
/// at all is a file-level error.
pub trait MoleculeParser: Send + Sync {
    fn parse_file(&self, path: &Path) -> Result<ParsedEntries, ParseError>;
}

// ── Mock Implementation for Testing ────────────────────────────────────────

#[derive(Debug, Clone)]
enum MockOutcome {
    Entries(Vec<Option<MockRecord>>),
    Error(String),
}

/// Parser with canned per-path outcomes. Unknown paths fail with a
/// not-found message.
#[derive(Debug, Clone, Default)]
pub struct MockParser {
    outcomes: HashMap<PathBuf, MockOutcome>,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the entries a path parses to.
    pub fn with_entries(mut self, path: impl Into<PathBuf>, entries: Vec<Option<MockRecord>>) -> Self {
        self.outcomes.insert(path.into(), MockOutcome::Entries(entries));
        self
    }

    /// Register a file-level error for a path.
    pub fn with_error(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.outcomes
            .insert(path.into(), MockOutcome::Error(message.to_string()));
        self
    }
}

impl MoleculeParser for MockParser {
    fn parse_file(&self, path: &Path) -> Result<ParsedEntries, ParseError> {
        match self.outcomes.get(path) {
            Some(MockOutcome::Entries(entries)) => Ok(entries
                .iter()
                .map(|e| e.clone().map(|r| Box::new(r) as Box<dyn ChemRecord>))
                .collect()),
            Some(MockOutcome::Error(msg)) => Err(ParseError::Message(msg.clone())),
            None => Err(ParseError::Message(format!(
                "no such file: {}",
                path.display()
            ))),
        }
    }
}
