use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::data::filter::{build_view, init_filter_state, FilterSpec, View, ViewSpec};
use crate::data::loader::CachedLoader;
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// Path of the loaded file, kept for reloads.
    pub source: Option<PathBuf>,

    /// Read-through loader cache keyed by path + mtime.
    pub loader: CachedLoader,

    /// Per-column filters, quick filter, and column selection.
    pub view_spec: ViewSpec,

    /// The current filtered/projected view (cached).
    pub view: View,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load (or cache-read) a CSV and make it the current table.
    pub fn load_path(&mut self, path: &Path) {
        match self.loader.load(path) {
            Ok(table) => {
                self.source = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-read the current file from disk, bypassing the cache.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.loader.clear();
            self.load_path(&path);
        }
    }

    /// Ingest a newly loaded table and reset the view to defaults.
    pub fn set_table(&mut self, table: Table) {
        self.view_spec = ViewSpec {
            filters: init_filter_state(&table),
            quick: String::new(),
            visible: BTreeSet::new(),
        };
        self.view = build_view(&table, &self.view_spec);
        self.table = Some(table);
        self.status_message = None;
    }

    /// Recompute the cached view after any widget change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.view = build_view(table, &self.view_spec);
        }
    }

    /// Reset every filter to its pass-all default and drop the loader
    /// cache, mirroring the dashboard's "clear all filters" button.
    pub fn clear_filters(&mut self) {
        if let Some(table) = &self.table {
            self.view_spec = ViewSpec {
                filters: init_filter_state(table),
                quick: String::new(),
                visible: BTreeSet::new(),
            };
        }
        self.loader.clear();
        self.refilter();
    }

    /// Apply a saved view spec. Saved filters are merged over the current
    /// table's defaults; entries and visible-column picks naming columns the
    /// table does not have are dropped.
    pub fn apply_view_spec(&mut self, spec: ViewSpec) {
        let ViewSpec {
            filters,
            quick,
            mut visible,
        } = spec;

        if let Some(table) = &self.table {
            let mut merged = init_filter_state(table);
            for (name, filter) in filters {
                if merged.contains_key(&name) {
                    merged.insert(name, filter);
                }
            }
            let known: BTreeSet<String> = table.column_names().map(str::to_string).collect();
            visible.retain(|name| known.contains(name));
            self.view_spec = ViewSpec {
                filters: merged,
                quick,
                visible,
            };
        } else {
            self.view_spec = ViewSpec {
                filters,
                quick,
                visible,
            };
        }
        self.refilter();
    }

    /// Toggle one value in a categorical column's selection.
    pub fn toggle_value(&mut self, column: &str, value: &str) {
        if let Some(FilterSpec::Values { selected }) = self.view_spec.filters.get_mut(column) {
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
            self.refilter();
        }
    }

    /// Select every value of a categorical column.
    pub fn select_all_values(&mut self, column: &str) {
        let Some(table) = &self.table else { return };
        let Some(all) = table.column(column).map(|c| c.unique_strings()) else {
            return;
        };
        if let Some(FilterSpec::Values { selected }) = self.view_spec.filters.get_mut(column) {
            *selected = all;
            self.refilter();
        }
    }

    /// Empty a categorical column's selection (back to "no constraint").
    pub fn select_none_values(&mut self, column: &str) {
        if let Some(FilterSpec::Values { selected }) = self.view_spec.filters.get_mut(column) {
            selected.clear();
            self.refilter();
        }
    }

    /// Show or hide a column. An empty selection means all columns, so the
    /// first hide seeds the set with every other column.
    pub fn set_column_visible(&mut self, column: &str, visible: bool) {
        let Some(table) = &self.table else { return };
        if self.view_spec.visible.is_empty() && !visible {
            self.view_spec.visible = table
                .column_names()
                .filter(|n| *n != column)
                .map(str::to_string)
                .collect();
        } else if visible {
            self.view_spec.visible.insert(column.to_string());
            // Back to "everything selected" collapses to the empty set.
            if self.view_spec.visible.len() == table.n_cols() {
                self.view_spec.visible.clear();
            }
        } else {
            self.view_spec.visible.remove(column);
        }
        self.refilter();
    }

    /// Whether a column is currently shown.
    pub fn is_column_visible(&self, column: &str) -> bool {
        self.view_spec.visible.is_empty() || self.view_spec.visible.contains(column)
    }
}
