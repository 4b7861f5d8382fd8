use std::path::Path;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, table};

/// The CSV the dashboard was built around; loaded on start when present in
/// the working directory.
pub const DEFAULT_CSV: &str = "Collection Fabric Availability.csv";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FabuExplorerApp {
    pub state: AppState,
}

impl Default for FabuExplorerApp {
    fn default() -> Self {
        let mut state = AppState::default();
        let default_csv = Path::new(DEFAULT_CSV);
        if default_csv.exists() {
            state.load_path(default_csv);
        }
        Self { state }
    }
}

impl eframe::App for FabuExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the filtered table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::data_table(ui, &self.state);
        });
    }
}
