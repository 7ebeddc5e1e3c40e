use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::schema::{EXPECTED_RAW_COLUMNS, Field, Metric};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ROSTER: &str = "tracked_players.json";
const DEFAULT_EXPORT: &str = "samu_tracker_export.xlsx";
const DEFAULT_RECENCY_STEP: usize = 5;

/// Where raw match history comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    /// Every `*.csv` export found in a directory.
    ExportDir(PathBuf),
    /// A single pre-merged parquet snapshot.
    Snapshot(PathBuf),
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: HistorySource,
    pub roster_path: PathBuf,
    pub expected_columns: usize,
    pub export_path: PathBuf,
    /// Initial scatter axes, given as field keys such as `core_score`.
    pub scatter_x: Metric,
    pub scatter_y: Metric,
    /// Matches added or removed per `+`/`-` press in the dashboard.
    pub recency_step: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: HistorySource::ExportDir(PathBuf::from(DEFAULT_DATA_DIR)),
            roster_path: PathBuf::from(DEFAULT_ROSTER),
            expected_columns: EXPECTED_RAW_COLUMNS,
            export_path: PathBuf::from(DEFAULT_EXPORT),
            scatter_x: Metric::Score,
            scatter_y: Metric::Goals,
            recency_step: DEFAULT_RECENCY_STEP,
        }
    }
}

impl DashboardConfig {
    /// Loads `.env.local` / `.env` when present, then reads `SAMU_*` variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let source = match non_empty("SAMU_SNAPSHOT") {
            Some(path) => HistorySource::Snapshot(PathBuf::from(path)),
            None => HistorySource::ExportDir(PathBuf::from(
                non_empty("SAMU_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            )),
        };

        let positive_var = |key: &str, default: usize| -> Result<usize> {
            match non_empty(key) {
                Some(raw) => raw.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
                    DashboardError::config(format!("{key} must be a positive integer, got {raw}"))
                }),
                None => Ok(default),
            }
        };
        let expected_columns = positive_var("SAMU_EXPECTED_COLUMNS", EXPECTED_RAW_COLUMNS)?;
        let recency_step = positive_var("SAMU_RECENCY_STEP", DEFAULT_RECENCY_STEP)?;

        let metric_var = |key: &str, default: Metric| -> Result<Metric> {
            let Some(raw) = non_empty(key) else {
                return Ok(default);
            };
            match Field::from_key(&raw) {
                Some(Field::Metric(metric)) => Ok(metric),
                _ => Err(DashboardError::config(format!(
                    "{key} must name a numeric field key, got {raw}"
                ))),
            }
        };
        let scatter_x = metric_var("SAMU_SCATTER_X", Metric::Score)?;
        let scatter_y = metric_var("SAMU_SCATTER_Y", Metric::Goals)?;

        Ok(Self {
            source,
            roster_path: PathBuf::from(
                non_empty("SAMU_ROSTER").unwrap_or_else(|| DEFAULT_ROSTER.to_string()),
            ),
            expected_columns,
            export_path: PathBuf::from(
                non_empty("SAMU_EXPORT_PATH").unwrap_or_else(|| DEFAULT_EXPORT.to_string()),
            ),
            scatter_x,
            scatter_y,
            recency_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset_or_blank() {
        let cfg = DashboardConfig::from_lookup(lookup(&[("SAMU_DATA_DIR", "  ")])).unwrap();
        assert_eq!(cfg.source, HistorySource::ExportDir(PathBuf::from("data")));
        assert_eq!(cfg.expected_columns, EXPECTED_RAW_COLUMNS);
        assert_eq!(cfg.roster_path, PathBuf::from("tracked_players.json"));
        assert_eq!(cfg.recency_step, 5);
    }

    #[test]
    fn snapshot_overrides_export_dir() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("SAMU_DATA_DIR", "exports"),
            ("SAMU_SNAPSHOT", "history.parquet"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.source,
            HistorySource::Snapshot(PathBuf::from("history.parquet"))
        );
    }

    #[test]
    fn bad_column_count_is_a_config_error() {
        let err = DashboardConfig::from_lookup(lookup(&[("SAMU_EXPECTED_COLUMNS", "zero")]))
            .unwrap_err();
        assert!(err.is_config());
        let err = DashboardConfig::from_lookup(lookup(&[("SAMU_EXPECTED_COLUMNS", "0")]))
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn scatter_axes_use_field_keys() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("SAMU_SCATTER_X", "positioning_avg_distance_to_ball"),
            ("SAMU_SCATTER_Y", "core_saves"),
        ]))
        .unwrap();
        assert_eq!(cfg.scatter_x, Metric::AvgDistanceToBall);
        assert_eq!(cfg.scatter_y, Metric::Saves);

        let err = DashboardConfig::from_lookup(lookup(&[("SAMU_SCATTER_X", "team")])).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn recency_step_must_be_positive() {
        let cfg = DashboardConfig::from_lookup(lookup(&[("SAMU_RECENCY_STEP", "10")])).unwrap();
        assert_eq!(cfg.recency_step, 10);

        for bad in ["fast", "0", "-3"] {
            let err = DashboardConfig::from_lookup(lookup(&[("SAMU_RECENCY_STEP", bad)]))
                .unwrap_err();
            assert!(err.is_config());
        }
    }
}
