use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes the CSV sniffer
/// produces. A `Text` cell inside a `Number` or `Date` column is an
/// unparseable leftover: it still displays its raw text but counts as
/// missing for range filters.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Missing => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric reading of the cell, `None` for anything non-numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Date reading of the cell, `None` for anything non-date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred type of a column
// ---------------------------------------------------------------------------

/// The inferred kind of a column, which decides the filter widget it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Date,
    /// Text with few distinct values – filtered by a value multi-select.
    Categorical,
    /// Free text – filtered by substring / regex.
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Categorical => "category",
            ColumnKind::Text => "text",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named column of the loaded CSV.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Min/max over the numeric cells, `None` when there are none.
    pub fn numeric_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for v in self.values.iter().filter_map(CellValue::as_number) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        bounds
    }

    /// Min/max over the date cells, `None` when there are none.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for d in self.values.iter().filter_map(CellValue::as_date) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            });
        }
        bounds
    }

    /// Sorted distinct string forms of the non-missing cells.
    pub fn unique_strings(&self) -> BTreeSet<String> {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .map(|v| v.to_string())
            .collect()
    }
}

/// The full loaded table: ordered named columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn display_forms() {
        assert_eq!(CellValue::Text("Linen".into()).to_string(), "Linen");
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(0.5).to_string(), "0.5");
        assert_eq!(CellValue::Date(date(2024, 3, 7)).to_string(), "2024-03-07");
        assert_eq!(CellValue::Missing.to_string(), "");
    }

    #[test]
    fn typed_accessors_ignore_leftover_text() {
        let leftover = CellValue::Text("n/a".into());
        assert_eq!(leftover.as_number(), None);
        assert_eq!(leftover.as_date(), None);
        assert!(!leftover.is_missing());
        assert!(CellValue::Missing.is_missing());
    }

    #[test]
    fn bounds_skip_non_matching_cells() {
        let col = Column {
            name: "width_cm".into(),
            kind: ColumnKind::Number,
            values: vec![
                CellValue::Number(140.0),
                CellValue::Missing,
                CellValue::Text("n/a".into()),
                CellValue::Number(90.0),
            ],
        };
        assert_eq!(col.numeric_bounds(), Some((90.0, 140.0)));
        assert_eq!(col.date_bounds(), None);
    }

    #[test]
    fn unique_strings_sorted_without_missing() {
        let col = Column {
            name: "status".into(),
            kind: ColumnKind::Categorical,
            values: vec![
                CellValue::Text("low".into()),
                CellValue::Missing,
                CellValue::Text("in stock".into()),
                CellValue::Text("low".into()),
            ],
        };
        let uniques: Vec<String> = col.unique_strings().into_iter().collect();
        assert_eq!(uniques, vec!["in stock".to_string(), "low".to_string()]);
    }
}
