use std::path::Path;

use anyhow::{Context, Result};

use super::filter::ViewSpec;

// ---------------------------------------------------------------------------
// Saved view configurations
// ---------------------------------------------------------------------------

/// Persist the current view spec as JSON so a filter setup survives
/// restarts.
pub fn save_session(spec: &ViewSpec, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, spec).context("serialising view spec")?;
    log::info!("Saved view to {}", path.display());
    Ok(())
}

/// Load a view spec saved by [`save_session`]. Specs for columns the
/// current table lacks are dropped later, when the state applies it.
pub fn load_session(path: &Path) -> Result<ViewSpec> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let spec = serde_json::from_reader(file).context("parsing view spec JSON")?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSpec, FilterState};
    use std::collections::BTreeSet;

    #[test]
    fn view_spec_round_trips_through_json() {
        let spec = ViewSpec {
            filters: FilterState::from([
                (
                    "collection".into(),
                    FilterSpec::Values {
                        selected: BTreeSet::from(["Spring".to_string()]),
                    },
                ),
                (
                    "available_from".into(),
                    FilterSpec::DateRange {
                        start: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        end: chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                        include_missing: false,
                    },
                ),
            ]),
            quick: "linen".into(),
            visible: BTreeSet::from(["fabric".to_string()]),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        save_session(&spec, &path).unwrap();
        assert_eq!(load_session(&path).unwrap(), spec);
    }

    #[test]
    fn malformed_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_session(&path).is_err());
    }
}
