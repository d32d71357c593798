//! Snapshot and analysis persistence under the data directory.

use crate::error::PipelineError;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use trendlens_config::EffectiveConfig;
use trendlens_domain::files::{fill_pattern, parse_raw_filename};
use trendlens_domain::{Platform, RawSnapshot, TopicAnalysis};

/// Analysis JSON names are part of the file contract and not configurable.
const ANALYSIS_JSON_PATTERN: &str = "{source}_analysis_{timestamp}.json";

/// The current instant in the two forms the contract needs: RFC 3339 for
/// payload metadata, compact (per the configured format) for file names.
pub(crate) fn now_timestamps(timestamp_format: &str) -> (String, String) {
    let now = Local::now();
    (now.to_rfc3339(), now.format(timestamp_format).to_string())
}

/// Display timestamp for report footers.
pub(crate) fn display_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Persist a raw snapshot, returning its path.
pub(crate) fn save_raw_snapshot(
    config: &EffectiveConfig,
    snapshot: &RawSnapshot,
) -> Result<PathBuf, PipelineError> {
    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir).map_err(|e| PipelineError::io(&data_dir, e))?;

    let name = fill_pattern(
        &config.paths.raw_filename_format,
        snapshot.source,
        &snapshot.timestamp,
    );
    let path = data_dir.join(name);
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| PipelineError::Payload(e.to_string()))?;
    fs::write(&path, json).map_err(|e| PipelineError::io(&path, e))?;

    info!("raw snapshot saved to {}", path.display());
    Ok(path)
}

/// Newest raw snapshot path for a platform, by embedded timestamp.
pub(crate) fn latest_raw_path(
    config: &EffectiveConfig,
    source: Platform,
) -> Result<PathBuf, PipelineError> {
    let data_dir = config.data_dir();
    let entries = match fs::read_dir(&data_dir) {
        Ok(entries) => entries,
        Err(_) => return Err(PipelineError::NoRawSnapshot(source)),
    };

    let mut newest: Option<(String, PathBuf)> = None;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        let Some((platform, timestamp)) = parse_raw_filename(name) else {
            continue;
        };
        if platform != source {
            continue;
        }
        if newest
            .as_ref()
            .map(|(newest_ts, _)| timestamp > newest_ts.as_str())
            .unwrap_or(true)
        {
            newest = Some((timestamp.to_string(), entry.path()));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or(PipelineError::NoRawSnapshot(source))
}

/// Load a previously persisted snapshot.
pub(crate) fn load_snapshot(path: &Path) -> Result<RawSnapshot, PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        PipelineError::Payload(format!("snapshot {} is not readable: {}", path.display(), e))
    })
}

/// Persist the analysis batch as JSON, returning its path.
pub(crate) fn save_analysis_json(
    config: &EffectiveConfig,
    source: Platform,
    timestamp: &str,
    analyses: &[TopicAnalysis],
) -> Result<PathBuf, PipelineError> {
    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir).map_err(|e| PipelineError::io(&data_dir, e))?;

    let name = fill_pattern(ANALYSIS_JSON_PATTERN, source, timestamp);
    let path = data_dir.join(name);
    let json = serde_json::to_string_pretty(analyses)
        .map_err(|e| PipelineError::Payload(e.to_string()))?;
    fs::write(&path, json).map_err(|e| PipelineError::io(&path, e))?;

    info!("analysis JSON saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_in(dir: &std::path::Path) -> EffectiveConfig {
        let mut config = EffectiveConfig::default();
        config.paths.data_dir = dir.to_string_lossy().into_owned();
        config
    }

    fn snapshot(timestamp: &str) -> RawSnapshot {
        RawSnapshot::new(
            Platform::Weibo,
            &json!({"code": 200, "msg": "success"}),
            vec![],
            "2026-01-02T03:04:05+08:00".to_string(),
            timestamp.to_string(),
        )
    }

    #[test]
    fn test_save_and_reload_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let path = save_raw_snapshot(&config, &snapshot("20260102_030405")).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "weibo_raw_20260102_030405.json"
        );

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.source, Platform::Weibo);
        assert_eq!(loaded.api_code, Some(200));
    }

    #[test]
    fn test_latest_raw_picks_newest_for_platform() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        save_raw_snapshot(&config, &snapshot("20260101_000000")).unwrap();
        save_raw_snapshot(&config, &snapshot("20260103_000000")).unwrap();
        save_raw_snapshot(&config, &snapshot("20260102_000000")).unwrap();

        let path = latest_raw_path(&config, Platform::Weibo).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("20260103_000000"));
    }

    #[test]
    fn test_latest_raw_missing_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        // Another platform's snapshot does not satisfy a weibo lookup.
        let err = latest_raw_path(&config, Platform::Douyin).unwrap_err();
        assert!(matches!(err, PipelineError::NoRawSnapshot(Platform::Douyin)));
    }

    #[test]
    fn test_now_timestamps_follow_configured_format() {
        let (rfc3339, compact) = now_timestamps("%Y%m%d_%H%M%S");
        assert!(rfc3339.contains('T'));
        assert_eq!(compact.len(), 15);
        assert!(compact.contains('_'));
    }
}
