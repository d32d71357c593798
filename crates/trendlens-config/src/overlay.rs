//! Partial configuration tiers.
//!
//! A [`ConfigOverlay`] mirrors the effective configuration with every leaf
//! wrapped in `Option` and every section itself an overlay, so a tier only
//! states what it actually sets. Deep merge is field-by-field: a populated
//! higher-priority leaf wins, sections merge recursively, and the `sources`
//! map merges key-by-key.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One configuration tier (file, environment, or CLI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    /// Upstream API settings.
    pub api: Option<ApiOverlay>,
    /// Analysis settings.
    pub analysis: Option<AnalysisOverlay>,
    /// LLM settings.
    pub llm: Option<LlmOverlay>,
    /// Filesystem layout settings.
    pub paths: Option<PathsOverlay>,
    /// Logging settings.
    pub logging: Option<LoggingOverlay>,
    /// Grade band thresholds.
    pub grades: Option<GradesOverlay>,
    /// Retention sweep settings.
    pub cleanup: Option<CleanupOverlay>,
}

/// `api` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOverlay {
    /// TianAPI settings.
    pub tianapi: Option<TianApiOverlay>,
}

/// `api.tianapi` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TianApiOverlay {
    /// API root used when a platform has no explicit endpoint.
    pub base_url: Option<String>,
    /// Explicit endpoint per platform id.
    pub sources: Option<BTreeMap<String, String>>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    /// Total attempt budget for a fetch.
    pub max_retries: Option<u32>,
    /// API credential.
    pub key: Option<String>,
}

/// `analysis` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOverlay {
    /// How many topics from the top of the ranking to analyze.
    pub topic_count: Option<usize>,
    /// Scoring rubric weights.
    pub scoring: Option<ScoringOverlay>,
}

/// `analysis.scoring` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOverlay {
    /// Total weight of the interest dimensions.
    pub interesting: Option<f64>,
    /// Total weight of the utility dimensions.
    pub useful: Option<f64>,
    /// Per-dimension interest weights.
    pub interesting_detail: Option<ScoringDetailOverlay>,
    /// Per-dimension utility weights.
    pub useful_detail: Option<ScoringDetailOverlay>,
}

/// A map of dimension name to weight, merged key-by-key like `sources`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringDetailOverlay(pub BTreeMap<String, f64>);

/// `llm` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmOverlay {
    /// Model identifier sent to the messages API.
    pub model_id: Option<String>,
    /// API base URL (Anthropic or a compatible gateway).
    pub base_url: Option<String>,
    /// Response token budget.
    pub max_tokens: Option<u32>,
}

/// `paths` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsOverlay {
    /// Directory all generated files live under.
    pub data_dir: Option<String>,
    /// Pattern for raw snapshot file names.
    pub raw_filename_format: Option<String>,
    /// Pattern for HTML report file names.
    pub report_filename_format: Option<String>,
    /// chrono format string for the `{timestamp}` placeholder.
    pub timestamp_format: Option<String>,
}

/// `logging` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOverlay {
    /// Log level filter (`error` | `warn` | `info` | `debug` | `trace`).
    pub level: Option<String>,
    /// Log file path; unset means console only.
    pub file: Option<String>,
    /// Whether to log to the console.
    pub console: Option<bool>,
}

/// `grades` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradesOverlay {
    /// Minimum total score for the excellent band.
    pub excellent: Option<f64>,
    /// Minimum total score for the good band.
    pub good: Option<f64>,
    /// Floor of the average band.
    pub average: Option<f64>,
}

/// `cleanup` section overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupOverlay {
    /// Raw snapshots to retain per platform.
    pub keep_raw: Option<usize>,
    /// Debug artifacts to retain.
    pub keep_debug: Option<usize>,
}

fn merge_section<T>(high: Option<T>, low: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (high, low) {
        (Some(h), Some(l)) => Some(merge(h, l)),
        (high, low) => high.or(low),
    }
}

fn merge_map<V>(high: Option<BTreeMap<String, V>>, low: Option<BTreeMap<String, V>>) -> Option<BTreeMap<String, V>> {
    merge_section(high, low, |h, mut l| {
        l.extend(h);
        l
    })
}

impl ConfigOverlay {
    /// Merge `self` over a lower-priority tier: populated leaves of `self`
    /// win, everything `self` leaves unset falls through to `low`.
    pub fn merge_over(self, low: ConfigOverlay) -> ConfigOverlay {
        ConfigOverlay {
            api: merge_section(self.api, low.api, ApiOverlay::merge_over),
            analysis: merge_section(self.analysis, low.analysis, AnalysisOverlay::merge_over),
            llm: merge_section(self.llm, low.llm, LlmOverlay::merge_over),
            paths: merge_section(self.paths, low.paths, PathsOverlay::merge_over),
            logging: merge_section(self.logging, low.logging, LoggingOverlay::merge_over),
            grades: merge_section(self.grades, low.grades, GradesOverlay::merge_over),
            cleanup: merge_section(self.cleanup, low.cleanup, CleanupOverlay::merge_over),
        }
    }

    /// Load a tier from a YAML file.
    ///
    /// An empty file yields an empty overlay; a missing or malformed file is
    /// a fatal [`ConfigError`].
    pub fn from_yaml_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a tier from YAML text. Empty input yields an empty overlay.
    pub fn from_yaml_str(content: &str) -> Result<ConfigOverlay, String> {
        if content.trim().is_empty() {
            return Ok(ConfigOverlay::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Build the environment tier from the process environment.
    ///
    /// Only the fixed allow-list below is consulted; any other variable is
    /// ignored. `ANTHROPIC_API_KEY` is deliberately absent: it is a
    /// credential consumed directly by the LLM client, not configuration.
    ///
    /// | variable                  | key                    |
    /// |---------------------------|------------------------|
    /// | `TIANAPI_KEY`             | `api.tianapi.key`      |
    /// | `MODEL_ID`                | `llm.model_id`         |
    /// | `ANTHROPIC_BASE_URL`      | `llm.base_url`         |
    /// | `WEIBO_SKILL_TOPIC_COUNT` | `analysis.topic_count` |
    /// | `WEIBO_SKILL_DATA_DIR`    | `paths.data_dir`       |
    /// | `WEIBO_SKILL_LOG_LEVEL`   | `logging.level`        |
    pub fn from_env() -> ConfigOverlay {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`ConfigOverlay::from_env`] over an arbitrary lookup, so the mapping
    /// stays a pure function of its input.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigOverlay {
        let mut overlay = ConfigOverlay::default();

        if let Some(key) = lookup("TIANAPI_KEY").filter(|v| !v.is_empty()) {
            overlay.api = Some(ApiOverlay {
                tianapi: Some(TianApiOverlay {
                    key: Some(key),
                    ..Default::default()
                }),
            });
        }

        let model_id = lookup("MODEL_ID").filter(|v| !v.is_empty());
        let base_url = lookup("ANTHROPIC_BASE_URL").filter(|v| !v.is_empty());
        if model_id.is_some() || base_url.is_some() {
            overlay.llm = Some(LlmOverlay {
                model_id,
                base_url,
                ..Default::default()
            });
        }

        // Non-numeric counts are ignored rather than treated as errors.
        if let Some(count) = lookup("WEIBO_SKILL_TOPIC_COUNT").and_then(|v| v.parse().ok()) {
            overlay.analysis = Some(AnalysisOverlay {
                topic_count: Some(count),
                ..Default::default()
            });
        }

        if let Some(data_dir) = lookup("WEIBO_SKILL_DATA_DIR").filter(|v| !v.is_empty()) {
            overlay.paths = Some(PathsOverlay {
                data_dir: Some(data_dir),
                ..Default::default()
            });
        }

        if let Some(level) = lookup("WEIBO_SKILL_LOG_LEVEL").filter(|v| !v.is_empty()) {
            overlay.logging = Some(LoggingOverlay {
                level: Some(level.to_lowercase()),
                ..Default::default()
            });
        }

        overlay
    }
}

impl ApiOverlay {
    fn merge_over(self, low: ApiOverlay) -> ApiOverlay {
        ApiOverlay {
            tianapi: merge_section(self.tianapi, low.tianapi, TianApiOverlay::merge_over),
        }
    }
}

impl TianApiOverlay {
    fn merge_over(self, low: TianApiOverlay) -> TianApiOverlay {
        TianApiOverlay {
            base_url: self.base_url.or(low.base_url),
            sources: merge_map(self.sources, low.sources),
            timeout: self.timeout.or(low.timeout),
            max_retries: self.max_retries.or(low.max_retries),
            key: self.key.or(low.key),
        }
    }
}

impl AnalysisOverlay {
    fn merge_over(self, low: AnalysisOverlay) -> AnalysisOverlay {
        AnalysisOverlay {
            topic_count: self.topic_count.or(low.topic_count),
            scoring: merge_section(self.scoring, low.scoring, ScoringOverlay::merge_over),
        }
    }
}

impl ScoringOverlay {
    fn merge_over(self, low: ScoringOverlay) -> ScoringOverlay {
        ScoringOverlay {
            interesting: self.interesting.or(low.interesting),
            useful: self.useful.or(low.useful),
            interesting_detail: merge_section(
                self.interesting_detail,
                low.interesting_detail,
                ScoringDetailOverlay::merge_over,
            ),
            useful_detail: merge_section(
                self.useful_detail,
                low.useful_detail,
                ScoringDetailOverlay::merge_over,
            ),
        }
    }
}

impl ScoringDetailOverlay {
    fn merge_over(self, mut low: ScoringDetailOverlay) -> ScoringDetailOverlay {
        low.0.extend(self.0);
        low
    }
}

impl LlmOverlay {
    fn merge_over(self, low: LlmOverlay) -> LlmOverlay {
        LlmOverlay {
            model_id: self.model_id.or(low.model_id),
            base_url: self.base_url.or(low.base_url),
            max_tokens: self.max_tokens.or(low.max_tokens),
        }
    }
}

impl PathsOverlay {
    fn merge_over(self, low: PathsOverlay) -> PathsOverlay {
        PathsOverlay {
            data_dir: self.data_dir.or(low.data_dir),
            raw_filename_format: self.raw_filename_format.or(low.raw_filename_format),
            report_filename_format: self.report_filename_format.or(low.report_filename_format),
            timestamp_format: self.timestamp_format.or(low.timestamp_format),
        }
    }
}

impl LoggingOverlay {
    fn merge_over(self, low: LoggingOverlay) -> LoggingOverlay {
        LoggingOverlay {
            level: self.level.or(low.level),
            file: self.file.or(low.file),
            console: self.console.or(low.console),
        }
    }
}

impl GradesOverlay {
    fn merge_over(self, low: GradesOverlay) -> GradesOverlay {
        GradesOverlay {
            excellent: self.excellent.or(low.excellent),
            good: self.good.or(low.good),
            average: self.average.or(low.average),
        }
    }
}

impl CleanupOverlay {
    fn merge_over(self, low: CleanupOverlay) -> CleanupOverlay {
        CleanupOverlay {
            keep_raw: self.keep_raw.or(low.keep_raw),
            keep_debug: self.keep_debug.or(low.keep_debug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_deep_merge_preserves_sibling_leaves() {
        let file: ConfigOverlay = serde_yaml::from_str(
            "analysis:\n  topic_count: 10\n  scoring:\n    interesting: 70\n",
        )
        .unwrap();
        let env: ConfigOverlay =
            serde_yaml::from_str("analysis:\n  topic_count: 5\n").unwrap();

        let merged = env.merge_over(file);
        let analysis = merged.analysis.unwrap();
        assert_eq!(analysis.topic_count, Some(5));
        assert_eq!(analysis.scoring.unwrap().interesting, Some(70.0));
    }

    #[test]
    fn test_merge_unset_section_falls_through() {
        let high = ConfigOverlay::default();
        let low: ConfigOverlay = serde_yaml::from_str("logging:\n  level: debug\n").unwrap();
        let merged = high.merge_over(low);
        assert_eq!(merged.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_sources_map_merges_key_by_key() {
        let low: ConfigOverlay = serde_yaml::from_str(
            "api:\n  tianapi:\n    sources:\n      weibo: http://low/weibo\n      douyin: http://low/douyin\n",
        )
        .unwrap();
        let high: ConfigOverlay = serde_yaml::from_str(
            "api:\n  tianapi:\n    sources:\n      weibo: http://high/weibo\n",
        )
        .unwrap();

        let merged = high.merge_over(low);
        let sources = merged.api.unwrap().tianapi.unwrap().sources.unwrap();
        assert_eq!(sources.get("weibo").unwrap(), "http://high/weibo");
        assert_eq!(sources.get("douyin").unwrap(), "http://low/douyin");
    }

    #[test]
    fn test_env_allow_list() {
        let pairs = [
            ("TIANAPI_KEY", "secret"),
            ("MODEL_ID", "glm-4.6"),
            ("WEIBO_SKILL_TOPIC_COUNT", "7"),
            ("WEIBO_SKILL_DATA_DIR", "/tmp/data"),
            ("WEIBO_SKILL_LOG_LEVEL", "DEBUG"),
            ("SOME_UNRELATED_VAR", "ignored"),
        ];
        let overlay = ConfigOverlay::from_lookup(lookup_from(&pairs));

        assert_eq!(
            overlay.api.unwrap().tianapi.unwrap().key.as_deref(),
            Some("secret")
        );
        assert_eq!(overlay.llm.unwrap().model_id.as_deref(), Some("glm-4.6"));
        assert_eq!(overlay.analysis.unwrap().topic_count, Some(7));
        assert_eq!(
            overlay.paths.unwrap().data_dir.as_deref(),
            Some("/tmp/data")
        );
        // Level is normalized to lowercase for the EnvFilter.
        assert_eq!(overlay.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_env_non_numeric_topic_count_ignored() {
        let pairs = [("WEIBO_SKILL_TOPIC_COUNT", "many")];
        let overlay = ConfigOverlay::from_lookup(lookup_from(&pairs));
        assert!(overlay.analysis.is_none());
    }

    #[test]
    fn test_env_empty_values_ignored() {
        let pairs = [("TIANAPI_KEY", "")];
        let overlay = ConfigOverlay::from_lookup(lookup_from(&pairs));
        assert!(overlay.api.is_none());
    }

    #[test]
    fn test_empty_yaml_is_empty_overlay() {
        assert_eq!(
            ConfigOverlay::from_yaml_str("").unwrap(),
            ConfigOverlay::default()
        );
        assert_eq!(
            ConfigOverlay::from_yaml_str("  \n").unwrap(),
            ConfigOverlay::default()
        );
    }

    #[test]
    fn test_unknown_yaml_keys_are_ignored() {
        let overlay =
            ConfigOverlay::from_yaml_str("html:\n  theme: dark\nlogging:\n  level: warn\n")
                .unwrap();
        assert_eq!(overlay.logging.unwrap().level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_yaml_type_conflict_is_a_parse_error() {
        // A scalar where a mapping is expected cannot survive into the
        // typed overlay; it surfaces as a parse failure instead.
        assert!(ConfigOverlay::from_yaml_str("api: 5\n").is_err());
    }

    #[test]
    fn test_from_yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "analysis:\n  topic_count: 12\n").unwrap();

        let overlay = ConfigOverlay::from_yaml_file(&path).unwrap();
        assert_eq!(overlay.analysis.unwrap().topic_count, Some(12));
    }

    #[test]
    fn test_from_yaml_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigOverlay::from_yaml_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_yaml_file_malformed_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api: [unclosed\n").unwrap();

        let err = ConfigOverlay::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
