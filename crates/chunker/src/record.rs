use std::collections::BTreeMap;

use crate::cell::Cell;

/// One input row keyed by normalized column label.
pub type Record = BTreeMap<String, Cell>;

/// Normalizes a header cell into a column label.
///
/// Trims, turns newlines into spaces and runs a single pass of
/// double-space to single-space. Not a full whitespace normalizer.
pub fn normalize_header(cell: &Cell) -> String {
    cell.to_string()
        .trim()
        .replace('\n', " ")
        .replace("  ", " ")
}

pub fn normalize_headers(header: &[Cell]) -> Vec<String> {
    header.iter().map(normalize_header).collect()
}

/// Derives the account identifier from the first cell of a row.
///
/// Returns `None` for rows that carry no usable identifier (blank cell,
/// text without digits). Those rows are skipped, never reported as errors.
pub fn account_id(first: &Cell) -> Option<String> {
    let raw = match first {
        Cell::Empty => return None,
        c if c.is_numeric() => c.integer_text()?,
        c => c.to_string().trim().to_string(),
    };

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Zips labels with row values, dropping unlabeled columns.
pub fn build_record(labels: &[String], values: &[Cell]) -> Record {
    labels
        .iter()
        .zip(values)
        .filter(|(label, _)| !label.is_empty())
        .map(|(label, value)| (label.clone(), value.clone()))
        .collect()
}

/// Shard key for an identifier: its first `prefix_len` characters.
pub fn shard_key(id: &str, prefix_len: usize) -> &str {
    match id.char_indices().nth(prefix_len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
