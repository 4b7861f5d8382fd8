use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – the filtered table
// ---------------------------------------------------------------------------

const HEADER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 18.0;

/// Render the current view as a virtualized table.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let table = match &state.table {
        Some(t) => t,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a CSV file to browse it  (File → Open…)");
            });
            return;
        }
    };

    let view = &state.view;
    if view.n_cols() == 0 {
        ui.label("No columns to show.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(
            TableColumn::auto().at_least(80.0).clip(true),
            view.n_cols(),
        )
        .header(HEADER_HEIGHT, |mut header| {
            for &ci in &view.col_indices {
                header.col(|ui: &mut Ui| {
                    ui.strong(&table.columns[ci].name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, view.n_rows(), |mut row| {
                let ri = view.row_indices[row.index()];
                for &ci in &view.col_indices {
                    row.col(|ui: &mut Ui| {
                        ui.label(table.columns[ci].values[ri].to_string());
                    });
                }
            });
        });
}
