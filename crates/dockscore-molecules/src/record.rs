//! Narrow interface over a parsed molecule.
//!
//! Extraction and projection only ask a molecule whether it carries a named
//! data item and what its text is. Parser backends implement this trait.

/// A single molecule entry with named scalar properties.
pub trait ChemRecord {
    /// Whether the record carries a property with exactly this name.
    fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// The raw text of a named property, as authored in the file.
    fn property(&self, name: &str) -> Option<&str>;
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// In-memory record with hand-set properties.
#[derive(Debug, Clone, Default)]
pub struct MockRecord {
    props: Vec<(String, String)>,
}

impl MockRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.props.push((name.to_string(), value.to_string()));
        self
    }
}

impl ChemRecord for MockRecord {
    fn property(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
