//! Run report: skipped-file summary, CSV artifact, completion line.

use std::io::{self, Write};
use std::path::Path;

use dockscore_common::{DockscoreError, Result, ScoreProperty};
use dockscore_molecules::{FailureEntry, Row};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Default report location, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "gnina_scores.csv";

/// Column names in order: `ligand` then every score property.
pub fn header() -> Vec<&'static str> {
    std::iter::once("ligand")
        .chain(ScoreProperty::ALL.iter().map(|p| p.tag()))
        .collect()
}

/// Write the skipped-file block. Writes nothing when there are no failures.
pub fn write_failure_report<W: Write>(out: &mut W, failures: &[FailureEntry]) -> io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    writeln!(out, "Skipped {} files due to parse errors:", failures.len())?;
    for entry in failures {
        writeln!(out, "  - {}: {}", entry.ligand, entry.cause)?;
    }
    Ok(())
}

pub fn completion_line(n_rows: usize, path: &Path) -> String {
    format!("Wrote {} scored ligands to {}", n_rows, path.display())
}

/// Write `rows` as CSV to `path` with no index column.
///
/// The table is written to a temporary file next to `path` and renamed into
/// place, so `path` either holds the complete table or is left untouched.
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        // serialize() only emits the header along with the first row
        if rows.is_empty() {
            writer.write_record(header())?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| DockscoreError::Io(e.error))?;
    info!(path = %path.display(), n_rows = rows.len(), "Wrote score table");
    Ok(())
}

/// Read a table written by [`write_csv`]. Empty score fields come back as
/// missing.
pub fn read_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<Row>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    debug!(path = %path.display(), n_rows = rows.len(), "Read score table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ligand: &str, score: Option<f64>, cnn_affinity: Option<f64>, affinity: Option<f64>) -> Row {
        Row {
            ligand: ligand.to_string(),
            cnn_score: score,
            cnn_affinity,
            affinity,
        }
    }

    #[test]
    fn test_failure_report_format() {
        let failures = vec![
            FailureEntry::new("lig1", "syntax error at line 4"),
            FailureEntry::new("lig2", "no molecules parsed"),
        ];
        let mut out = Vec::new();
        write_failure_report(&mut out, &failures).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Skipped 2 files due to parse errors:\n  - lig1: syntax error at line 4\n  - lig2: no molecules parsed\n"
        );
    }

    #[test]
    fn test_failure_report_silent_when_empty() {
        let mut out = Vec::new();
        write_failure_report(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_completion_line() {
        assert_eq!(
            completion_line(0, Path::new("gnina_scores.csv")),
            "Wrote 0 scored ligands to gnina_scores.csv"
        );
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(
            &path,
            &[
                row("a", Some(0.8), Some(7.2), Some(-7.0)),
                row("b,c", None, None, None),
            ],
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "ligand,CNNscore,CNNaffinity,Affinity\na,0.8,7.2,-7.0\n\"b,c\",,,\n"
        );
    }

    #[test]
    fn test_empty_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ligand,CNNscore,CNNaffinity,Affinity\n"
        );
        assert!(read_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            row("x", Some(0.91), Some(6.25), Some(-8.5)),
            row("x", Some(0.1), None, Some(-3.0)),
            row("y", None, None, None),
        ];
        write_csv(&path, &rows).unwrap();
        assert_eq!(read_csv(&path).unwrap(), rows);
    }

    #[test]
    fn test_overwrite_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &vec![row("old", Some(1.0), Some(1.0), Some(1.0)); 3]).unwrap();
        write_csv(&path, &[row("new", None, Some(2.0), None)]).unwrap();
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows, vec![row("new", None, Some(2.0), None)]);
    }

    #[test]
    fn test_unwritable_destination_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(write_csv(&path, &[]), Err(DockscoreError::Io(_))));
        assert!(!path.exists());
    }
}
