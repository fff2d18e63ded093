use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockscoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed {property} value {value:?} for ligand {ligand}")]
    MalformedProperty {
        ligand: String,
        property: String,
        value: String,
    },

    #[error("Worker error: {0}")]
    Worker(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DockscoreError>;
