//! Projection of a molecule's docking scores into a report row.

use dockscore_common::{DockscoreError, Result, ScoreProperty};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::ChemRecord;

/// What to do with a score property whose text is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Record the score as missing and log a warning.
    #[default]
    Missing,
    /// Fail the whole run.
    Abort,
}

/// One molecule's scores. `None` is the missing marker.
///
/// Field order is the report column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub ligand: String,
    #[serde(rename = "CNNscore")]
    pub cnn_score: Option<f64>,
    #[serde(rename = "CNNaffinity")]
    pub cnn_affinity: Option<f64>,
    #[serde(rename = "Affinity")]
    pub affinity: Option<f64>,
}

impl Row {
    /// A row with every score missing.
    pub fn empty(ligand: &str) -> Self {
        Self {
            ligand: ligand.to_string(),
            cnn_score: None,
            cnn_affinity: None,
            affinity: None,
        }
    }

    pub fn get(&self, property: ScoreProperty) -> Option<f64> {
        match property {
            ScoreProperty::CnnScore => self.cnn_score,
            ScoreProperty::CnnAffinity => self.cnn_affinity,
            ScoreProperty::Affinity => self.affinity,
        }
    }

    fn slot_mut(&mut self, property: ScoreProperty) -> &mut Option<f64> {
        match property {
            ScoreProperty::CnnScore => &mut self.cnn_score,
            ScoreProperty::CnnAffinity => &mut self.cnn_affinity,
            ScoreProperty::Affinity => &mut self.affinity,
        }
    }
}

/// Build the row for one molecule of `ligand`.
///
/// Absent properties are missing. A NaN score is also stored as missing so
/// it ranks with the other unscored rows.
pub fn project(record: &dyn ChemRecord, ligand: &str, policy: MalformedPolicy) -> Result<Row> {
    let mut row = Row::empty(ligand);

    for property in ScoreProperty::ALL {
        let Some(raw) = record.property(property.tag()) else {
            continue;
        };

        let value = match raw.trim().parse::<f64>() {
            Ok(v) if v.is_nan() => {
                debug!(ligand, property = property.tag(), "NaN score treated as missing");
                None
            }
            Ok(v) => Some(v),
            Err(_) => match policy {
                MalformedPolicy::Missing => {
                    warn!(
                        ligand,
                        property = property.tag(),
                        value = raw,
                        "Non-numeric score treated as missing"
                    );
                    None
                }
                MalformedPolicy::Abort => {
                    return Err(DockscoreError::MalformedProperty {
                        ligand: ligand.to_string(),
                        property: property.tag().to_string(),
                        value: raw.to_string(),
                    });
                }
            },
        };

        *row.slot_mut(property) = value;
    }

    Ok(row)
}
