//! The effective configuration and the four-tier resolver.

use crate::error::ConfigError;
use crate::overlay::ConfigOverlay;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the four configuration tiers into one effective configuration.
///
/// Precedence, highest wins: `cli` > `env` > `file` > `defaults`. The three
/// overlay tiers are deep-merged first (populated leaves of the higher tier
/// win, sections merge field-by-field), then anything still unset falls
/// through to `defaults`. Pure function of its inputs; no I/O.
pub fn resolve(
    defaults: EffectiveConfig,
    file: ConfigOverlay,
    env: ConfigOverlay,
    cli: ConfigOverlay,
) -> EffectiveConfig {
    let overlay = cli.merge_over(env).merge_over(file);
    defaults.with_overlay(overlay)
}

/// The single merged configuration used by a run.
///
/// Every leaf is concrete except the TianAPI credential, which has no
/// built-in default and is enforced by [`EffectiveConfig::tianapi_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// Upstream API settings.
    pub tianapi: TianApiConfig,
    /// Analysis settings.
    pub analysis: AnalysisConfig,
    /// LLM settings.
    pub llm: LlmConfig,
    /// Filesystem layout settings.
    pub paths: PathsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Grade band thresholds.
    pub grades: GradesConfig,
    /// Retention sweep settings.
    pub cleanup: CleanupConfig,
}

/// `api.tianapi` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TianApiConfig {
    /// API root used when a platform has no explicit endpoint in `sources`.
    pub base_url: String,
    /// Explicit endpoint per platform id; merged key-by-key across tiers.
    pub sources: BTreeMap<String, String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempt budget for a fetch.
    pub max_retries: u32,
    /// API credential; the one setting with no default.
    pub key: Option<String>,
}

/// `analysis` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// How many topics from the top of the ranking to analyze.
    pub topic_count: usize,
    /// Scoring rubric weights.
    pub scoring: ScoringConfig,
}

/// Scoring rubric weights surfaced to the LLM prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Total weight of the interest dimensions.
    pub interesting: f64,
    /// Total weight of the utility dimensions.
    pub useful: f64,
    /// Interest dimension weights: novelty, resonance, viral, entertainment.
    pub interesting_detail: BTreeMap<String, f64>,
    /// Utility dimension weights: practical, market.
    pub useful_detail: BTreeMap<String, f64>,
}

/// `llm` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Model identifier sent to the messages API.
    pub model_id: String,
    /// API base URL (Anthropic or a compatible gateway).
    pub base_url: String,
    /// Response token budget.
    pub max_tokens: u32,
}

/// `paths` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PathsConfig {
    /// Directory all generated files live under.
    pub data_dir: String,
    /// Pattern for raw snapshot file names.
    pub raw_filename_format: String,
    /// Pattern for HTML report file names.
    pub report_filename_format: String,
    /// chrono format string for the `{timestamp}` placeholder.
    pub timestamp_format: String,
}

/// `logging` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter.
    pub level: String,
    /// Log file path; `None` means console only.
    pub file: Option<String>,
    /// Whether to log to the console.
    pub console: bool,
}

/// `grades` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GradesConfig {
    /// Minimum total score for the excellent band.
    pub excellent: f64,
    /// Minimum total score for the good band.
    pub good: f64,
    /// Floor of the average band.
    pub average: f64,
}

/// `cleanup` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupConfig {
    /// Raw snapshots to retain per platform.
    pub keep_raw: usize,
    /// Debug artifacts to retain.
    pub keep_debug: usize,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            tianapi: TianApiConfig::default(),
            analysis: AnalysisConfig::default(),
            llm: LlmConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
            grades: GradesConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl Default for TianApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apis.tianapi.com".to_string(),
            sources: BTreeMap::new(),
            timeout_secs: 30,
            max_retries: 3,
            key: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            topic_count: 20,
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let interesting_detail = [
            ("novelty", 20.0),
            ("resonance", 20.0),
            ("viral", 20.0),
            ("entertainment", 20.0),
        ];
        let useful_detail = [("practical", 10.0), ("market", 10.0)];
        Self {
            interesting: 80.0,
            useful: 20.0,
            interesting_detail: interesting_detail
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            useful_detail: useful_detail
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_id: "glm-4.6".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 16000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            raw_filename_format: "{source}_raw_{timestamp}.json".to_string(),
            report_filename_format: "{source}_analysis_{timestamp}.html".to_string(),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            console: true,
        }
    }
}

impl Default for GradesConfig {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            good: 60.0,
            average: 0.0,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            keep_raw: 3,
            keep_debug: 3,
        }
    }
}

impl EffectiveConfig {
    /// The TianAPI credential, enforced at the point of use.
    ///
    /// Absent or empty after the full merge is a fatal
    /// [`ConfigError::MissingApiKey`], the one required setting with no
    /// built-in default.
    pub fn tianapi_key(&self) -> Result<&str, ConfigError> {
        match self.tianapi.key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Endpoint URL for a platform: the `sources` entry when one exists,
    /// otherwise the well-known path under `base_url`.
    pub fn source_url(&self, platform_id: &str) -> Result<String, ConfigError> {
        if let Some(url) = self.tianapi.sources.get(platform_id) {
            if url.is_empty() {
                return Err(ConfigError::UnknownSource(platform_id.to_string()));
            }
            return Ok(url.clone());
        }
        let path = match platform_id {
            "weibo" => "weibohot/index",
            "douyin" => "douyinhot/index",
            "wechat" => "wxhottopic/index",
            other => return Err(ConfigError::UnknownSource(other.to_string())),
        };
        Ok(format!(
            "{}/{}",
            self.tianapi.base_url.trim_end_matches('/'),
            path
        ))
    }

    /// Request timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.tianapi.timeout_secs)
    }

    /// Data directory as a [`PathBuf`].
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.data_dir)
    }

    fn with_overlay(mut self, overlay: ConfigOverlay) -> Self {
        if let Some(api) = overlay.api {
            if let Some(t) = api.tianapi {
                if let Some(v) = t.base_url {
                    self.tianapi.base_url = v;
                }
                if let Some(v) = t.sources {
                    self.tianapi.sources.extend(v);
                }
                if let Some(v) = t.timeout {
                    self.tianapi.timeout_secs = v;
                }
                if let Some(v) = t.max_retries {
                    self.tianapi.max_retries = v;
                }
                if let Some(v) = t.key {
                    self.tianapi.key = Some(v);
                }
            }
        }
        if let Some(analysis) = overlay.analysis {
            if let Some(v) = analysis.topic_count {
                self.analysis.topic_count = v;
            }
            if let Some(scoring) = analysis.scoring {
                if let Some(v) = scoring.interesting {
                    self.analysis.scoring.interesting = v;
                }
                if let Some(v) = scoring.useful {
                    self.analysis.scoring.useful = v;
                }
                if let Some(v) = scoring.interesting_detail {
                    self.analysis.scoring.interesting_detail.extend(v.0);
                }
                if let Some(v) = scoring.useful_detail {
                    self.analysis.scoring.useful_detail.extend(v.0);
                }
            }
        }
        if let Some(llm) = overlay.llm {
            if let Some(v) = llm.model_id {
                self.llm.model_id = v;
            }
            if let Some(v) = llm.base_url {
                self.llm.base_url = v;
            }
            if let Some(v) = llm.max_tokens {
                self.llm.max_tokens = v;
            }
        }
        if let Some(paths) = overlay.paths {
            if let Some(v) = paths.data_dir {
                self.paths.data_dir = v;
            }
            if let Some(v) = paths.raw_filename_format {
                self.paths.raw_filename_format = v;
            }
            if let Some(v) = paths.report_filename_format {
                self.paths.report_filename_format = v;
            }
            if let Some(v) = paths.timestamp_format {
                self.paths.timestamp_format = v;
            }
        }
        if let Some(logging) = overlay.logging {
            if let Some(v) = logging.level {
                self.logging.level = v;
            }
            if let Some(v) = logging.file {
                self.logging.file = Some(v);
            }
            if let Some(v) = logging.console {
                self.logging.console = v;
            }
        }
        if let Some(grades) = overlay.grades {
            if let Some(v) = grades.excellent {
                self.grades.excellent = v;
            }
            if let Some(v) = grades.good {
                self.grades.good = v;
            }
            if let Some(v) = grades.average {
                self.grades.average = v;
            }
        }
        if let Some(cleanup) = overlay.cleanup {
            if let Some(v) = cleanup.keep_raw {
                self.cleanup.keep_raw = v;
            }
            if let Some(v) = cleanup.keep_debug {
                self.cleanup.keep_debug = v;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{AnalysisOverlay, ApiOverlay, TianApiOverlay};

    fn overlay_with_key(key: &str) -> ConfigOverlay {
        ConfigOverlay {
            api: Some(ApiOverlay {
                tianapi: Some(TianApiOverlay {
                    key: Some(key.to_string()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }

    fn overlay_with_topic_count(count: usize) -> ConfigOverlay {
        ConfigOverlay {
            analysis: Some(AnalysisOverlay {
                topic_count: Some(count),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_all_tiers_empty() {
        let config = resolve(
            EffectiveConfig::default(),
            ConfigOverlay::default(),
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        assert_eq!(config.tianapi.timeout_secs, 30);
        assert_eq!(config.tianapi.max_retries, 3);
        assert_eq!(config.analysis.topic_count, 20);
        assert_eq!(config.grades.excellent, 80.0);
        assert_eq!(config.paths.data_dir, "data");
        assert!(config.tianapi.key.is_none());
    }

    #[test]
    fn test_precedence_is_total() {
        // Every tier sets topic_count; the highest present tier must win.
        let file = overlay_with_topic_count(10);
        let env = overlay_with_topic_count(15);
        let cli = overlay_with_topic_count(7);

        let config = resolve(
            EffectiveConfig::default(),
            file.clone(),
            env.clone(),
            cli,
        );
        assert_eq!(config.analysis.topic_count, 7);

        let config = resolve(
            EffectiveConfig::default(),
            file.clone(),
            env,
            ConfigOverlay::default(),
        );
        assert_eq!(config.analysis.topic_count, 15);

        let config = resolve(
            EffectiveConfig::default(),
            file,
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        assert_eq!(config.analysis.topic_count, 10);
    }

    #[test]
    fn test_deep_merge_across_tiers() {
        // File sets two leaves of a section, env overrides one; the other
        // survives from the file tier.
        let file: ConfigOverlay = serde_yaml::from_str(
            "api:\n  tianapi:\n    timeout: 60\n    max_retries: 5\n",
        )
        .unwrap();
        let env: ConfigOverlay =
            serde_yaml::from_str("api:\n  tianapi:\n    timeout: 10\n").unwrap();

        let config = resolve(
            EffectiveConfig::default(),
            file,
            env,
            ConfigOverlay::default(),
        );
        assert_eq!(config.tianapi.timeout_secs, 10);
        assert_eq!(config.tianapi.max_retries, 5);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = resolve(
            EffectiveConfig::default(),
            ConfigOverlay::default(),
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        assert!(matches!(
            config.tianapi_key(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let config = resolve(
            EffectiveConfig::default(),
            overlay_with_key(""),
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        assert!(matches!(
            config.tianapi_key(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_cli_key_beats_env_key() {
        let config = resolve(
            EffectiveConfig::default(),
            ConfigOverlay::default(),
            overlay_with_key("from-env"),
            overlay_with_key("from-cli"),
        );
        assert_eq!(config.tianapi_key().unwrap(), "from-cli");
    }

    #[test]
    fn test_source_url_prefers_explicit_entry() {
        let file: ConfigOverlay = serde_yaml::from_str(
            "api:\n  tianapi:\n    sources:\n      weibo: https://example.test/weibo\n",
        )
        .unwrap();
        let config = resolve(
            EffectiveConfig::default(),
            file,
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        assert_eq!(
            config.source_url("weibo").unwrap(),
            "https://example.test/weibo"
        );
        // Platforms without an explicit entry fall back to base_url.
        assert_eq!(
            config.source_url("douyin").unwrap(),
            "https://apis.tianapi.com/douyinhot/index"
        );
    }

    #[test]
    fn test_source_url_unknown_platform() {
        let config = EffectiveConfig::default();
        assert!(matches!(
            config.source_url("twitter"),
            Err(ConfigError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_scoring_detail_merges_per_dimension() {
        let file: ConfigOverlay = serde_yaml::from_str(
            "analysis:\n  scoring:\n    interesting_detail:\n      novelty: 25\n",
        )
        .unwrap();
        let config = resolve(
            EffectiveConfig::default(),
            file,
            ConfigOverlay::default(),
            ConfigOverlay::default(),
        );
        let detail = &config.analysis.scoring.interesting_detail;
        assert_eq!(detail.get("novelty"), Some(&25.0));
        // Untouched dimensions keep their defaults.
        assert_eq!(detail.get("viral"), Some(&20.0));
    }
}
