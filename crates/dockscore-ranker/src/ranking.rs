//! Ordering of the final table.
//!
//! Rows are ranked by `CNNaffinity`, highest first. Rows without a value go
//! after every scored row, and equal values keep their input order.

use std::cmp::Ordering;

use dockscore_common::ScoreProperty;
use dockscore_molecules::Row;

/// The column the final table is ranked by.
pub const RANK_BY: ScoreProperty = ScoreProperty::CnnAffinity;

/// Descending comparison with `None` after every present value.
pub fn compare_desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of `rows` into report order. Never adds or drops a row.
pub fn rank(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort_by(|a, b| compare_desc_missing_last(a.get(RANK_BY), b.get(RANK_BY)));
    rows
}
