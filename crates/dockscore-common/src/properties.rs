//! The fixed set of docking score properties read from each molecule.

use std::fmt;

/// A score tag written by the docking run as an SD data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreProperty {
    CnnScore,
    CnnAffinity,
    Affinity,
}

impl ScoreProperty {
    /// All recognised properties, in report column order.
    pub const ALL: [ScoreProperty; 3] = [
        ScoreProperty::CnnScore,
        ScoreProperty::CnnAffinity,
        ScoreProperty::Affinity,
    ];

    /// The SD data item name.
    pub fn tag(self) -> &'static str {
        match self {
            ScoreProperty::CnnScore => "CNNscore",
            ScoreProperty::CnnAffinity => "CNNaffinity",
            ScoreProperty::Affinity => "Affinity",
        }
    }
}

impl fmt::Display for ScoreProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
