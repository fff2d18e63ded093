//! dockscore-molecules — Reading docking results out of SD files.
//!
//! This crate covers the ingestion half of a scoring run:
//! 1. Discovering `<ligand>_scored.sdf` result files
//! 2. Parsing each file into molecule records (no sanitization)
//! 3. Projecting the docking score properties of each molecule into a row
//! 4. Aggregating rows and per-file failures across the whole run

pub mod record;
pub mod parser;
pub mod sdf;
pub mod discovery;
pub mod extract;
pub mod projector;
pub mod pipeline;

pub use discovery::{discover, CandidateFile};
pub use extract::{extract, Extraction, FailureEntry, NO_MOLECULES_PARSED};
pub use parser::{MoleculeParser, ParseError};
pub use pipeline::{Aggregation, Aggregator};
pub use projector::{project, MalformedPolicy, Row};
pub use record::ChemRecord;
pub use sdf::{SdfParser, SdfRecord};
