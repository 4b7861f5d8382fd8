use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use super::model::{Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// FilterSpec – one user-supplied predicate per column
// ---------------------------------------------------------------------------

/// A per-column predicate, one variant per [`ColumnKind`]. Empty predicates
/// (blank query, no values selected, full range with missing included) pass
/// every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Case-insensitive substring match; with `regex` set the query compiles
    /// as a case-insensitive regex. An invalid regex falls back to literal
    /// substring matching.
    Text { query: String, regex: bool },
    /// Membership of the cell's string form in the selected set. An empty
    /// selection means "no constraint", not "hide everything".
    Values { selected: BTreeSet<String> },
    /// Closed numeric interval; cells without a numeric reading (blanks and
    /// unparseable leftovers) are governed by `include_missing`.
    NumberRange {
        lo: f64,
        hi: f64,
        include_missing: bool,
    },
    /// Closed date interval, same missing-value rule as `NumberRange`.
    DateRange {
        start: NaiveDate,
        end: NaiveDate,
        include_missing: bool,
    },
}

/// Per-column filter selections, keyed by column name. Columns without an
/// entry are unconstrained.
pub type FilterState = BTreeMap<String, FilterSpec>;

/// Build the default (pass-everything) filter state for a table. Number and
/// date columns without a single parseable value get no entry at all; there
/// is nothing to range over.
pub fn init_filter_state(table: &Table) -> FilterState {
    let mut filters = FilterState::new();
    for col in &table.columns {
        let spec = match col.kind {
            ColumnKind::Number => col.numeric_bounds().map(|(lo, hi)| FilterSpec::NumberRange {
                lo,
                hi,
                include_missing: true,
            }),
            ColumnKind::Date => col.date_bounds().map(|(start, end)| FilterSpec::DateRange {
                start,
                end,
                include_missing: true,
            }),
            ColumnKind::Categorical => Some(FilterSpec::Values {
                selected: BTreeSet::new(),
            }),
            ColumnKind::Text => Some(FilterSpec::Text {
                query: String::new(),
                regex: false,
            }),
        };
        if let Some(spec) = spec {
            filters.insert(col.name.clone(), spec);
        }
    }
    filters
}

// ---------------------------------------------------------------------------
// Boolean masks
// ---------------------------------------------------------------------------

/// Case-insensitive contains, matching against the cell's string form.
/// Missing cells never match a text query.
fn contains_mask(column: &Column, query: &str, use_regex: bool) -> Vec<bool> {
    if use_regex {
        match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => {
                return column
                    .values
                    .iter()
                    .map(|v| !v.is_missing() && re.is_match(&v.to_string()))
                    .collect();
            }
            Err(err) => {
                // Invalid pattern: quietly degrade to a literal search.
                log::debug!("invalid regex {query:?} ({err}), matching literally");
            }
        }
    }
    let needle = query.to_lowercase();
    column
        .values
        .iter()
        .map(|v| !v.is_missing() && v.to_string().to_lowercase().contains(&needle))
        .collect()
}

/// Evaluate one predicate against one column: one bool per row, true where
/// the row passes.
pub fn column_mask(column: &Column, spec: &FilterSpec) -> Vec<bool> {
    let n = column.values.len();
    match spec {
        FilterSpec::Text { query, regex } => {
            if query.is_empty() {
                vec![true; n]
            } else {
                contains_mask(column, query, *regex)
            }
        }
        FilterSpec::Values { selected } => {
            if selected.is_empty() {
                vec![true; n]
            } else {
                column
                    .values
                    .iter()
                    .map(|v| !v.is_missing() && selected.contains(&v.to_string()))
                    .collect()
            }
        }
        FilterSpec::NumberRange {
            lo,
            hi,
            include_missing,
        } => column
            .values
            .iter()
            .map(|v| match v.as_number() {
                Some(x) => *lo <= x && x <= *hi,
                None => *include_missing,
            })
            .collect(),
        FilterSpec::DateRange {
            start,
            end,
            include_missing,
        } => column
            .values
            .iter()
            .map(|v| match v.as_date() {
                Some(d) => *start <= d && d <= *end,
                None => *include_missing,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// ViewSpec / View – from predicates to a projected row subset
// ---------------------------------------------------------------------------

/// Everything the user has dialled in: per-column predicates, the global
/// quick filter, and the chosen columns. An empty `visible` set means all
/// columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub filters: FilterState,
    pub quick: String,
    pub visible: BTreeSet<String>,
}

/// The derived view: indices into the table's rows and columns. Recomputed
/// from scratch on every filter change; the table itself is never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
}

impl View {
    pub fn n_rows(&self) -> usize {
        self.row_indices.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_indices.len()
    }
}

/// Apply a [`ViewSpec`] to a table.
///
/// Per-column masks are intersected first; then the quick filter drops rows
/// whose *visible* cells all fail a case-insensitive contains; finally the
/// view is projected onto the visible columns. Specs naming columns the
/// table does not have are ignored.
pub fn build_view(table: &Table, spec: &ViewSpec) -> View {
    let mut mask = vec![true; table.n_rows()];

    for (name, filter) in &spec.filters {
        let Some(column) = table.column(name) else {
            continue;
        };
        for (keep, pass) in mask.iter_mut().zip(column_mask(column, filter)) {
            *keep = *keep && pass;
        }
    }

    let col_indices: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| spec.visible.is_empty() || spec.visible.contains(&c.name))
        .map(|(i, _)| i)
        .collect();

    if !spec.quick.is_empty() {
        let needle = spec.quick.to_lowercase();
        for (row, keep) in mask.iter_mut().enumerate() {
            if !*keep {
                continue;
            }
            *keep = col_indices.iter().any(|&ci| {
                let cell = &table.columns[ci].values[row];
                !cell.is_missing() && cell.to_string().to_lowercase().contains(&needle)
            });
        }
    }

    View {
        row_indices: mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect(),
        col_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn text_col(name: &str, cells: &[Option<&str>]) -> Column {
        Column {
            name: name.into(),
            kind: ColumnKind::Text,
            values: cells
                .iter()
                .map(|c| match c {
                    Some(s) => CellValue::Text((*s).to_string()),
                    None => CellValue::Missing,
                })
                .collect(),
        }
    }

    fn number_col(name: &str, cells: &[Option<f64>]) -> Column {
        Column {
            name: name.into(),
            kind: ColumnKind::Number,
            values: cells
                .iter()
                .map(|c| match c {
                    Some(v) => CellValue::Number(*v),
                    None => CellValue::Missing,
                })
                .collect(),
        }
    }

    fn sample_table() -> Table {
        Table {
            columns: vec![
                text_col(
                    "fabric",
                    &[Some("Linen"), Some("Wool blend"), Some("Silk"), Some("Cotton")],
                ),
                Column {
                    name: "collection".into(),
                    kind: ColumnKind::Categorical,
                    values: ["Spring", "Autumn", "Spring", "Autumn"]
                        .iter()
                        .map(|s| CellValue::Text((*s).to_string()))
                        .collect(),
                },
                number_col("price", &[Some(12.5), Some(8.0), None, Some(30.0)]),
            ],
        }
    }

    /// Materialise a view back into a table, for idempotence checks.
    fn materialize(table: &Table, view: &View) -> Table {
        Table {
            columns: view
                .col_indices
                .iter()
                .map(|&ci| {
                    let col = &table.columns[ci];
                    Column {
                        name: col.name.clone(),
                        kind: col.kind,
                        values: view
                            .row_indices
                            .iter()
                            .map(|&ri| col.values[ri].clone())
                            .collect(),
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn empty_predicates_pass_all_rows() {
        let table = sample_table();
        let spec = ViewSpec {
            filters: FilterState::from([
                (
                    "fabric".into(),
                    FilterSpec::Text {
                        query: String::new(),
                        regex: false,
                    },
                ),
                (
                    "collection".into(),
                    FilterSpec::Values {
                        selected: BTreeSet::new(),
                    },
                ),
            ]),
            ..ViewSpec::default()
        };
        let view = build_view(&table, &spec);
        assert_eq!(view.n_rows(), 4);
        assert_eq!(view.n_cols(), 3);
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let col = text_col("fabric", &[Some("Linen"), Some("WOOL blend"), None]);
        let mask = column_mask(
            &col,
            &FilterSpec::Text {
                query: "wool".into(),
                regex: false,
            },
        );
        assert_eq!(mask, vec![false, true, false]);
    }

    #[test]
    fn invalid_regex_falls_back_to_literal() {
        let col = text_col("notes", &[Some("price [tbd]"), Some("tbd")]);
        let mask = column_mask(
            &col,
            &FilterSpec::Text {
                query: "[tbd".into(),
                regex: true,
            },
        );
        // "[tbd" is not a valid pattern; it must match as a substring.
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn regex_filter_matches_case_insensitively() {
        let col = text_col("fabric", &[Some("Linen 120"), Some("Wool"), Some("linen 80")]);
        let mask = column_mask(
            &col,
            &FilterSpec::Text {
                query: r"^linen \d+$".into(),
                regex: true,
            },
        );
        assert_eq!(mask, vec![true, false, true]);
    }

    #[test]
    fn value_selection_matches_membership() {
        let table = sample_table();
        let mask = column_mask(
            table.column("collection").unwrap(),
            &FilterSpec::Values {
                selected: BTreeSet::from(["Spring".to_string()]),
            },
        );
        assert_eq!(mask, vec![true, false, true, false]);
    }

    #[test]
    fn include_missing_governs_unparseable_cells() {
        let mut col = number_col("price", &[Some(10.0), None, Some(50.0)]);
        // An unparseable leftover behaves exactly like a blank.
        col.values.push(CellValue::Text("n/a".into()));

        let with_missing = FilterSpec::NumberRange {
            lo: 0.0,
            hi: 20.0,
            include_missing: true,
        };
        assert_eq!(column_mask(&col, &with_missing), vec![true, true, false, true]);

        let without_missing = FilterSpec::NumberRange {
            lo: 0.0,
            hi: 20.0,
            include_missing: false,
        };
        assert_eq!(
            column_mask(&col, &without_missing),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn date_range_is_inclusive() {
        let d = |day| chrono::NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let col = Column {
            name: "available".into(),
            kind: ColumnKind::Date,
            values: vec![
                CellValue::Date(d(1)),
                CellValue::Date(d(15)),
                CellValue::Date(d(31)),
                CellValue::Missing,
            ],
        };
        let spec = FilterSpec::DateRange {
            start: d(1),
            end: d(15),
            include_missing: false,
        };
        assert_eq!(column_mask(&col, &spec), vec![true, true, false, false]);
    }

    #[test]
    fn combined_filters_intersect() {
        let table = sample_table();
        let spring = FilterSpec::Values {
            selected: BTreeSet::from(["Spring".to_string()]),
        };
        let cheap = FilterSpec::NumberRange {
            lo: 0.0,
            hi: 15.0,
            include_missing: false,
        };

        let only_spring = build_view(
            &table,
            &ViewSpec {
                filters: FilterState::from([("collection".into(), spring.clone())]),
                ..ViewSpec::default()
            },
        );
        let only_cheap = build_view(
            &table,
            &ViewSpec {
                filters: FilterState::from([("price".into(), cheap.clone())]),
                ..ViewSpec::default()
            },
        );
        let both = build_view(
            &table,
            &ViewSpec {
                filters: FilterState::from([
                    ("collection".into(), spring),
                    ("price".into(), cheap),
                ]),
                ..ViewSpec::default()
            },
        );

        let expected: Vec<usize> = only_spring
            .row_indices
            .iter()
            .copied()
            .filter(|i| only_cheap.row_indices.contains(i))
            .collect();
        assert_eq!(both.row_indices, expected);
        assert_eq!(both.row_indices, vec![0]);
    }

    #[test]
    fn refiltering_a_filtered_view_is_idempotent() {
        let table = sample_table();
        let spec = ViewSpec {
            filters: FilterState::from([(
                "price".into(),
                FilterSpec::NumberRange {
                    lo: 10.0,
                    hi: 40.0,
                    include_missing: false,
                },
            )]),
            quick: "o".into(),
            ..ViewSpec::default()
        };
        let first = build_view(&table, &spec);
        let narrowed = materialize(&table, &first);
        let second = build_view(&narrowed, &spec);
        assert_eq!(second.n_rows(), first.n_rows());
        assert_eq!(second.n_cols(), first.n_cols());
    }

    #[test]
    fn quick_filter_only_sees_visible_columns() {
        let table = sample_table();
        // "Autumn" only appears in the collection column; with that column
        // hidden the quick filter must not find it.
        let spec = ViewSpec {
            quick: "autumn".into(),
            visible: BTreeSet::from(["fabric".to_string(), "price".to_string()]),
            ..ViewSpec::default()
        };
        let view = build_view(&table, &spec);
        assert_eq!(view.n_rows(), 0);

        let spec_all = ViewSpec {
            quick: "autumn".into(),
            ..ViewSpec::default()
        };
        assert_eq!(build_view(&table, &spec_all).n_rows(), 2);
    }

    #[test]
    fn projection_keeps_table_column_order() {
        let table = sample_table();
        let spec = ViewSpec {
            visible: BTreeSet::from(["price".to_string(), "fabric".to_string()]),
            ..ViewSpec::default()
        };
        let view = build_view(&table, &spec);
        assert_eq!(view.col_indices, vec![0, 2]);
    }

    #[test]
    fn unknown_filter_columns_are_ignored() {
        let table = sample_table();
        let spec = ViewSpec {
            filters: FilterState::from([(
                "discontinued".into(),
                FilterSpec::Text {
                    query: "x".into(),
                    regex: false,
                },
            )]),
            ..ViewSpec::default()
        };
        assert_eq!(build_view(&table, &spec).n_rows(), 4);
    }

    #[test]
    fn default_state_passes_everything() {
        let table = sample_table();
        let filters = init_filter_state(&table);
        assert_eq!(filters.len(), 3);
        let view = build_view(
            &table,
            &ViewSpec {
                filters,
                ..ViewSpec::default()
            },
        );
        assert_eq!(view.n_rows(), 4);
    }
}
