use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::View;
use super::model::Table;

// ---------------------------------------------------------------------------
// CSV export of the current view
// ---------------------------------------------------------------------------

/// Write the view as CSV: header row of the visible column names, then the
/// string form of every visible cell. UTF-8, no index column — what you see
/// in the table is what lands in the file.
pub fn write_view_csv<W: Write>(table: &Table, view: &View, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(view.col_indices.iter().map(|&ci| &table.columns[ci].name))
        .context("writing CSV header")?;

    for &ri in &view.row_indices {
        csv_writer
            .write_record(
                view.col_indices
                    .iter()
                    .map(|&ci| table.columns[ci].values[ri].to_string()),
            )
            .with_context(|| format!("writing CSV row {ri}"))?;
    }

    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Export the view to a file on disk.
pub fn export_view(table: &Table, view: &View, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_view_csv(table, view, file)?;
    log::info!(
        "Exported {} rows x {} columns to {}",
        view.n_rows(),
        view.n_cols(),
        path.display()
    );
    Ok(())
}
