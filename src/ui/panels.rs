use chrono::NaiveDate;
use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::export_view;
use crate::data::filter::FilterSpec;
use crate::data::model::ColumnKind;
use crate::data::session;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Per-frame snapshot of a column's facts, cloned out of the table so the
/// widgets below can borrow the filter state mutably.
struct ColumnInfo {
    name: String,
    kind: ColumnKind,
    uniques: Vec<String>,
    numeric_bounds: Option<(f64, f64)>,
    date_bounds: Option<(NaiveDate, NaiveDate)>,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let columns: Vec<ColumnInfo> = match &state.table {
        Some(table) => table
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                kind: c.kind,
                uniques: if c.kind == ColumnKind::Categorical {
                    c.unique_strings().into_iter().collect()
                } else {
                    Vec::new()
                },
                numeric_bounds: c.numeric_bounds(),
                date_bounds: c.date_bounds(),
            })
            .collect(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Global tools ----
            ui.strong("Quick filter");
            ui.text_edit_singleline(&mut state.view_spec.quick)
                .on_hover_text("Contains, case-insensitive, across all visible columns");

            ui.add_space(4.0);
            if ui.button("Clear all filters").clicked() {
                state.clear_filters();
            }
            ui.separator();

            // ---- Column chooser ----
            egui::CollapsingHeader::new(RichText::new("Columns to show").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for info in &columns {
                        let mut shown = state.is_column_visible(&info.name);
                        if ui.checkbox(&mut shown, &info.name).changed() {
                            state.set_column_visible(&info.name, shown);
                        }
                    }
                });
            ui.separator();

            // ---- Per-column filter widgets (collapsible) ----
            for info in &columns {
                let header_text = format!("{}  ({})", info.name, info.kind);
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&info.name)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        column_filter_widget(ui, state, info);
                    });
            }
        });

    // Recompute the view after any widget changes.
    state.refilter();
}

/// The filter widget for one column, dispatched on its inferred kind.
fn column_filter_widget(ui: &mut Ui, state: &mut AppState, info: &ColumnInfo) {
    match info.kind {
        ColumnKind::Text => {
            if let Some(FilterSpec::Text { query, regex }) =
                state.view_spec.filters.get_mut(&info.name)
            {
                ui.horizontal(|ui: &mut Ui| {
                    ui.text_edit_singleline(query)
                        .on_hover_text("Contains, case-insensitive");
                    ui.checkbox(regex, "Regex");
                });
            }
        }

        ColumnKind::Categorical => {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_values(&info.name);
                }
                if ui.small_button("None").clicked() {
                    state.select_none_values(&info.name);
                }
            });

            // Re-borrow after the potential mutation from All/None.
            let Some(FilterSpec::Values { selected }) =
                state.view_spec.filters.get_mut(&info.name)
            else {
                return;
            };

            if selected.is_empty() {
                ui.weak("Nothing selected (showing all).");
            } else {
                ui.weak(format!("{} of {} selected", selected.len(), info.uniques.len()));
            }

            for val in &info.uniques {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                }
            }
        }

        ColumnKind::Number => {
            let Some(FilterSpec::NumberRange {
                lo,
                hi,
                include_missing,
            }) = state.view_spec.filters.get_mut(&info.name)
            else {
                ui.weak("No numeric values found.");
                return;
            };
            let (min_v, max_v) = info.numeric_bounds.unwrap_or((*lo, *hi));
            let speed = if max_v > min_v { (max_v - min_v) / 100.0 } else { 1.0 };

            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                ui.add(DragValue::new(&mut *lo).speed(speed).range(min_v..=max_v));
                ui.label("to");
                ui.add(DragValue::new(&mut *hi).speed(speed).range(min_v..=max_v));
            });
            // Keep the interval well-formed after dragging.
            if *lo > *hi {
                std::mem::swap(lo, hi);
            }
            ui.checkbox(include_missing, "Include blanks");
        }

        ColumnKind::Date => {
            let Some(FilterSpec::DateRange {
                start,
                end,
                include_missing,
            }) = state.view_spec.filters.get_mut(&info.name)
            else {
                ui.weak("No valid dates found.");
                return;
            };
            if let Some((first, last)) = info.date_bounds {
                ui.weak(format!("data from {first} to {last}"));
            }

            let start_salt = format!("{}_start", info.name);
            let end_salt = format!("{}_end", info.name);
            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                ui.add(DatePickerButton::new(&mut *start).id_salt(&start_salt));
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("to");
                ui.add(DatePickerButton::new(&mut *end).id_salt(&end_salt));
            });
            if *start > *end {
                std::mem::swap(start, end);
            }
            ui.checkbox(include_missing, "Include blanks");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export filtered CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Save view…").clicked() {
                save_view_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load view…").clicked() {
                load_view_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.table.is_some() {
            ui.label(format!(
                "Rows: {} | Columns: {}",
                state.view.n_rows(),
                state.view.n_cols()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered CSV")
        .set_file_name("export.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export_view(table, &state.view, &path) {
            Ok(()) => {
                state.status_message = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn save_view_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save view")
        .set_file_name("view.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match session::save_session(&state.view_spec, &path) {
            Ok(()) => state.status_message = Some(format!("View saved to {}", path.display())),
            Err(e) => {
                log::error!("Saving view failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn load_view_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load view")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match session::load_session(&path) {
            Ok(spec) => {
                state.apply_view_spec(spec);
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Loading view failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
