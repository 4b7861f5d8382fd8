use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use super::model::{CellValue, Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// What can go wrong while loading a CSV. The unreadable-file case is the
/// only failure the UI ever surfaces; everything below the file level
/// (unparseable cells) degrades to missing values instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading file metadata: {0}")]
    Io(#[from] std::io::Error),
    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV has no header row")]
    EmptyFile,
}

// ---------------------------------------------------------------------------
// CSV loading + column kind inference
// ---------------------------------------------------------------------------

/// Date formats the sniffer accepts. Datetime forms are truncated to their
/// date part. Tried in order, first match wins.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Distinct-value cutoff below which a text column is treated as
/// categorical and gets a value multi-select instead of a search box.
pub const CATEGORICAL_MAX_UNIQUE: usize = 50;

/// Try to read a cell as a date.
pub fn parse_date(s: &str) -> Option<chrono::NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Try to read a cell as a number. Non-finite values count as missing, like
/// any other unparseable cell.
fn parse_number(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Decide a column's kind from its raw cells.
///
/// * `Number` when every non-blank cell parses as a finite float (and at
///   least one does);
/// * `Date` when at least `max(5, n_rows / 2)` cells parse as dates — the
///   guard keeps short all-text columns from being mistaken for dates;
/// * otherwise `Categorical` below the distinct-value cutoff, else `Text`.
fn infer_kind(raw: &[String], n_rows: usize) -> ColumnKind {
    let non_blank: Vec<&str> = raw
        .iter()
        .map(String::as_str)
        .filter(|s| !is_blank(s))
        .collect();

    if !non_blank.is_empty() && non_blank.iter().all(|s| parse_number(s).is_some()) {
        return ColumnKind::Number;
    }

    let date_hits = non_blank.iter().filter(|s| parse_date(s).is_some()).count();
    if date_hits >= 5.max(n_rows / 2) {
        return ColumnKind::Date;
    }

    let distinct: std::collections::BTreeSet<&str> = non_blank.iter().copied().collect();
    if distinct.len() <= CATEGORICAL_MAX_UNIQUE {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    }
}

/// Convert a raw cell under an already-decided kind. Failed coercions in
/// typed columns keep their raw text (displayable, missing for ranges).
fn coerce(raw: &str, kind: ColumnKind) -> CellValue {
    if is_blank(raw) {
        return CellValue::Missing;
    }
    match kind {
        ColumnKind::Number => match parse_number(raw) {
            Some(v) => CellValue::Number(v),
            None => CellValue::Text(raw.to_string()),
        },
        ColumnKind::Date => match parse_date(raw) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Text(raw.to_string()),
        },
        ColumnKind::Categorical | ColumnKind::Text => CellValue::Text(raw.to_string()),
    }
}

/// Load a CSV file into a typed [`Table`].
///
/// The header row names the columns. Rows shorter than the header are
/// padded with blanks, longer rows are truncated. Each column's kind is
/// inferred from its values before coercion.
pub fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(LoadError::EmptyFile);
    }
    let width = headers.len();

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); width];
    for record in reader.records() {
        let record = record?;
        for (i, raw_col) in raw_columns.iter_mut().enumerate() {
            raw_col.push(record.get(i).unwrap_or("").to_string());
        }
    }
    let n_rows = raw_columns.first().map_or(0, Vec::len);

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| {
            let kind = infer_kind(&raw, n_rows);
            let values = raw.iter().map(|cell| coerce(cell, kind)).collect();
            Column { name, kind, values }
        })
        .collect();

    let table = Table { columns };
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Read-through cache keyed by path + modification time
// ---------------------------------------------------------------------------

/// Caches the last loaded table. A hit requires the same path and an
/// unchanged modification time; the only other invalidation is the user
/// clearing it explicitly.
#[derive(Debug, Default)]
pub struct CachedLoader {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    table: Table,
}

impl CachedLoader {
    /// Load `path`, reusing the cached table when the file is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Table, LoadError> {
        let modified = std::fs::metadata(path)?.modified()?;

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.modified == modified {
                log::debug!("cache hit for {}", path.display());
                return Ok(entry.table.clone());
            }
        }

        let table = load_csv(path)?;
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            modified,
            table: table.clone(),
        });
        Ok(table)
    }

    /// Drop the cached table; the next load re-reads the file.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
