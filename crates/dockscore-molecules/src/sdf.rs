//! Structure Data Format (SDF) reader.
//!
//! Reads multi-record SD files as written by docking tools: each record is a
//! molfile (V2000 or V3000) followed by `> <name>` data items, terminated by
//! `$$$$`. Only the structure of the file is checked. Atoms, bonds and
//! charges are never sanitized, and explicit hydrogens are kept.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::parser::{MoleculeParser, ParseError, ParsedEntries};
use crate::record::ChemRecord;

const RECORD_DELIMITER: &str = "$$$$";
const MOL_END: &str = "M  END";
const MAX_V2000_COUNT: usize = 999;

/// Molfile connection table version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MolfileVersion {
    V2000,
    V3000,
}

/// One molecule entry of an SD file.
#[derive(Debug, Clone)]
pub struct SdfRecord {
    title: String,
    version: MolfileVersion,
    atom_count: usize,
    bond_count: usize,
    properties: Vec<(String, String)>,
}

impl SdfRecord {
    /// First header line of the molfile.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> MolfileVersion {
        self.version
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    pub fn bond_count(&self) -> usize {
        self.bond_count
    }

    /// Data items in file order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ChemRecord for SdfRecord {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Why a single record could not be built.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("line {line}: {reason}")]
pub struct RecordError {
    /// 1-based line number in the file.
    pub line: usize,
    pub reason: String,
}

impl RecordError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self { line, reason: reason.into() }
    }
}

/// A record's lines plus the 0-based file line index of its first line.
struct Block<'a> {
    start: usize,
    lines: Vec<&'a str>,
}

/// Parse SD text into one result per record.
pub fn parse_sdf(text: &str) -> Vec<Result<SdfRecord, RecordError>> {
    split_records(text)
        .into_iter()
        .map(|block| parse_record(&block))
        .collect()
}

fn split_records(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current = Block { start: 0, lines: Vec::new() };

    for (idx, line) in text.lines().enumerate() {
        if line.trim_end() == RECORD_DELIMITER {
            let next = Block { start: idx + 1, lines: Vec::new() };
            blocks.push(std::mem::replace(&mut current, next));
        } else {
            current.lines.push(line);
        }
    }

    // An unterminated last record counts unless it is only whitespace
    if current.lines.iter().any(|l| !l.trim().is_empty()) {
        blocks.push(current);
    }

    blocks
}

fn parse_record(block: &Block<'_>) -> Result<SdfRecord, RecordError> {
    let lines = &block.lines;
    // 1-based file line number of a block-relative index
    let line_no = |i: usize| block.start + i + 1;

    if lines.len() < 4 {
        return Err(RecordError::new(
            line_no(lines.len()),
            "truncated molfile header",
        ));
    }

    let title = lines[0].trim().to_string();
    let counts = lines[3];

    let (version, atom_count, bond_count, end_idx) = if counts.trim_end().ends_with("V3000") {
        let (atoms, bonds) = v3000_counts(&lines[4..]);
        let end = find_mol_end(lines, 4)
            .ok_or_else(|| RecordError::new(line_no(lines.len()), "missing M  END"))?;
        (MolfileVersion::V3000, atoms, bonds, end)
    } else {
        let (atoms, bonds) = v2000_counts(counts)
            .ok_or_else(|| RecordError::new(line_no(3), "invalid counts line"))?;

        let atom_start: usize = 4;
        let (bond_start, props_start) = atom_start
            .checked_add(atoms)
            .and_then(|b| Some((b, b.checked_add(bonds)?)))
            .ok_or_else(|| RecordError::new(line_no(3), "atom/bond counts out of range"))?;
        if lines.len() < props_start {
            return Err(RecordError::new(
                line_no(lines.len()),
                format!("expected {atoms} atom and {bonds} bond lines"),
            ));
        }

        for i in atom_start..bond_start {
            check_atom_line(lines[i]).map_err(|reason| RecordError::new(line_no(i), reason))?;
        }
        for i in bond_start..props_start {
            check_bond_line(lines[i], atoms)
                .map_err(|reason| RecordError::new(line_no(i), reason))?;
        }

        let end = find_mol_end(lines, props_start)
            .ok_or_else(|| RecordError::new(line_no(lines.len()), "missing M  END"))?;
        (MolfileVersion::V2000, atoms, bonds, end)
    };

    Ok(SdfRecord {
        title,
        version,
        atom_count,
        bond_count,
        properties: parse_data_items(&lines[end_idx + 1..]),
    })
}

/// Atom and bond counts from a V2000 counts line. Fixed columns first, then
/// whitespace separated fields for files written by lenient tools.
fn v2000_counts(line: &str) -> Option<(usize, usize)> {
    let fixed = line
        .get(0..3)
        .zip(line.get(3..6))
        .and_then(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)));
    if fixed.is_some() {
        return fixed;
    }

    let mut cols = line.split_whitespace();
    let atoms: usize = cols.next()?.parse().ok()?;
    let bonds: usize = cols.next()?.parse().ok()?;
    // V2000 count fields are three digits wide
    (atoms <= MAX_V2000_COUNT && bonds <= MAX_V2000_COUNT).then_some((atoms, bonds))
}

/// Counts from the `M  V30 COUNTS` line, if present.
fn v3000_counts(lines: &[&str]) -> (usize, usize) {
    lines
        .iter()
        .find_map(|l| l.strip_prefix("M  V30 COUNTS"))
        .map(|rest| {
            let mut cols = rest.split_whitespace().map(|c| c.parse::<usize>().unwrap_or(0));
            (cols.next().unwrap_or(0), cols.next().unwrap_or(0))
        })
        .unwrap_or((0, 0))
}

fn check_atom_line(line: &str) -> Result<(), String> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 4 {
        return Err("atom line does not have enough columns".to_string());
    }
    for (axis, col) in ["x", "y", "z"].iter().zip(&cols[..3]) {
        if col.parse::<f64>().is_err() {
            return Err(format!("could not parse {axis} coordinate {col:?}"));
        }
    }
    Ok(())
}

fn check_bond_line(line: &str, atoms: usize) -> Result<(), String> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 3 {
        return Err("bond line does not have enough columns".to_string());
    }
    for col in &cols[..2] {
        let idx: usize = col
            .parse()
            .map_err(|_| format!("could not parse bond atom index {col:?}"))?;
        if idx == 0 || idx > atoms {
            return Err(format!("bond references atom {idx} out of range"));
        }
    }
    if cols[2].parse::<u8>().is_err() {
        return Err(format!("could not parse bond type {:?}", cols[2]));
    }
    Ok(())
}

fn find_mol_end(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&i| lines[i].starts_with(MOL_END))
}

/// Data items: a `>` header line naming the item in angle brackets, then
/// value lines up to the next blank line. A repeated name keeps the last
/// value.
fn parse_data_items(lines: &[&str]) -> Vec<(String, String)> {
    let mut items: Vec<(String, String)> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if !line.starts_with('>') {
            continue;
        }

        let mut value_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            value_lines.push(lines[i]);
            i += 1;
        }

        let Some(name) = data_item_name(line) else {
            debug!(header = line, "Skipping data item without a name");
            continue;
        };
        let value = value_lines.join("\n");

        match items.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value,
            None => items.push((name.to_string(), value)),
        }
    }

    items
}

fn data_item_name(header: &str) -> Option<&str> {
    let open = header.find('<')?;
    let rest = &header[open + 1..];
    let close = rest.find('>')?;
    Some(&rest[..close])
}

/// SD file parser backed by [`parse_sdf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SdfParser;

impl SdfParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse in-memory SD text. Broken records become `None`.
    pub fn parse_str(&self, text: &str) -> ParsedEntries {
        parse_sdf(text)
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| match rec {
                Ok(r) => Some(Box::new(r) as Box<dyn ChemRecord>),
                Err(e) => {
                    warn!(record = idx + 1, error = %e, "Skipping unparseable SD record");
                    None
                }
            })
            .collect()
    }
}

impl MoleculeParser for SdfParser {
    fn parse_file(&self, path: &Path) -> Result<ParsedEntries, ParseError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| ParseError::Encoding {
            offset: e.utf8_error().valid_up_to(),
        })?;
        debug!(path = %path.display(), bytes = text.len(), "Read SD file");
        Ok(self.parse_str(&text))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
