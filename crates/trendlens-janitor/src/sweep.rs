//! The retention sweep itself.

use crate::config::JanitorConfig;
use crate::error::JanitorError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};
use trendlens_domain::files::{is_debug_artifact, parse_raw_filename};
use trendlens_domain::Platform;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Files matching a managed class.
    pub examined: usize,
    /// Files deleted (or that would be deleted, in dry-run mode counted as
    /// skipped instead).
    pub deleted: usize,
    /// Files retained or left alone by dry-run.
    pub skipped: usize,
}

impl SweepMetrics {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "examined {} files, deleted {}, kept {}",
            self.examined, self.deleted, self.skipped
        )
    }
}

/// Retention sweeper for the data directory.
pub struct Janitor {
    config: JanitorConfig,
}

/// A managed file with its sort key.
struct ManagedFile {
    path: PathBuf,
    name: String,
    modified: SystemTime,
}

impl Janitor {
    /// Create a janitor with the given retention settings.
    pub fn new(config: JanitorConfig) -> Self {
        Self { config }
    }

    /// Sweep the data directory once.
    ///
    /// Keeps the newest `keep_raw` raw snapshots per platform and the
    /// newest `keep_debug` debug artifacts; everything else in those two
    /// classes is deleted. Files that match neither class are never
    /// touched. Newness is modification time, with the file name (which
    /// embeds the timestamp) as tiebreak.
    pub fn sweep(&self, data_dir: &Path) -> Result<SweepMetrics, JanitorError> {
        let mut metrics = SweepMetrics::default();

        if !data_dir.exists() {
            info!("data directory {} does not exist; nothing to sweep", data_dir.display());
            return Ok(metrics);
        }

        let mut debug_artifacts = Vec::new();
        let mut raw_per_platform: Vec<(Platform, Vec<ManagedFile>)> =
            Platform::ALL.iter().map(|p| (*p, Vec::new())).collect();

        let entries = fs::read_dir(data_dir).map_err(|source| JanitorError::Scan {
            path: data_dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| JanitorError::Scan {
                path: data_dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let file = ManagedFile {
                path: entry.path(),
                name: name.to_string(),
                modified,
            };

            if is_debug_artifact(name) {
                debug_artifacts.push(file);
            } else if let Some((platform, _)) = parse_raw_filename(name) {
                if let Some((_, files)) =
                    raw_per_platform.iter_mut().find(|(p, _)| *p == platform)
                {
                    files.push(file);
                }
            }
        }

        self.prune(debug_artifacts, self.config.keep_debug, &mut metrics);
        for (_, files) in raw_per_platform {
            self.prune(files, self.config.keep_raw, &mut metrics);
        }

        info!("sweep complete: {}", metrics.summary());
        Ok(metrics)
    }

    fn prune(&self, mut files: Vec<ManagedFile>, keep: usize, metrics: &mut SweepMetrics) {
        metrics.examined += files.len();

        // Newest first; names embed timestamps, so they break mtime ties.
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.name.cmp(&a.name)));

        for (index, file) in files.iter().enumerate() {
            if index < keep {
                metrics.skipped += 1;
                continue;
            }

            if self.config.dry_run {
                info!("dry run: would delete {}", file.path.display());
                metrics.skipped += 1;
                continue;
            }

            match fs::remove_file(&file.path) {
                Ok(()) => {
                    info!("deleted {}", file.path.display());
                    metrics.deleted += 1;
                }
                Err(e) => {
                    warn!("failed to delete {}: {}", file.path.display(), e);
                    metrics.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn test_keeps_newest_raw_snapshots_per_platform() {
        let dir = tempfile::tempdir().unwrap();
        for ts in ["20260101_000001", "20260101_000002", "20260101_000003", "20260101_000004"] {
            touch(dir.path(), &format!("weibo_raw_{ts}.json"));
        }
        touch(dir.path(), "douyin_raw_20260101_000001.json");

        let janitor = Janitor::new(JanitorConfig {
            keep_raw: 2,
            keep_debug: 3,
            dry_run: false,
        });
        let metrics = janitor.sweep(dir.path()).unwrap();

        assert_eq!(metrics.deleted, 2);
        // The two newest weibo snapshots survive; douyin is under budget.
        assert!(dir.path().join("weibo_raw_20260101_000004.json").exists());
        assert!(dir.path().join("weibo_raw_20260101_000003.json").exists());
        assert!(!dir.path().join("weibo_raw_20260101_000001.json").exists());
        assert!(dir.path().join("douyin_raw_20260101_000001.json").exists());
    }

    #[test]
    fn test_debug_artifacts_pruned_to_budget() {
        let dir = tempfile::tempdir().unwrap();
        for ts in ["20260101_000001", "20260101_000002", "20260101_000003"] {
            touch(dir.path(), &format!("debug_json_{ts}.txt"));
        }

        let janitor = Janitor::new(JanitorConfig::keep_all(1));
        let metrics = janitor.sweep(dir.path()).unwrap();

        assert_eq!(metrics.deleted, 2);
        assert!(dir.path().join("debug_json_20260101_000003.txt").exists());
    }

    #[test]
    fn test_never_touches_reports_or_analysis_json() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "weibo_analysis_20260101_000001.html");
        touch(dir.path(), "weibo_analysis_20260101_000001.json");
        touch(dir.path(), "index.html");
        touch(dir.path(), "index_weibo.html");

        let janitor = Janitor::new(JanitorConfig::keep_all(0));
        let metrics = janitor.sweep(dir.path()).unwrap();

        assert_eq!(metrics.examined, 0);
        assert_eq!(metrics.deleted, 0);
        assert!(dir.path().join("weibo_analysis_20260101_000001.html").exists());
        assert!(dir.path().join("index.html").exists());
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for ts in ["20260101_000001", "20260101_000002"] {
            touch(dir.path(), &format!("debug_json_{ts}.txt"));
        }

        let janitor = Janitor::new(JanitorConfig::keep_all(0).dry_run());
        let metrics = janitor.sweep(dir.path()).unwrap();

        assert_eq!(metrics.deleted, 0);
        assert_eq!(metrics.skipped, 2);
        assert!(dir.path().join("debug_json_20260101_000001.txt").exists());
        assert!(dir.path().join("debug_json_20260101_000002.txt").exists());
    }

    #[test]
    fn test_under_budget_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "debug_json_20260101_000001.txt");

        let janitor = Janitor::new(JanitorConfig::default());
        let metrics = janitor.sweep(dir.path()).unwrap();
        assert_eq!(metrics.deleted, 0);
        assert_eq!(metrics.skipped, 1);
    }

    #[test]
    fn test_missing_data_dir_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let janitor = Janitor::new(JanitorConfig::default());
        let metrics = janitor.sweep(&missing).unwrap();
        assert_eq!(metrics.examined, 0);
    }
}
