//! The fetch → analyze → report flow.

use crate::error::PipelineError;
use crate::prompt::build_analysis_prompt;
use crate::storage;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};
use trendlens_config::EffectiveConfig;
use trendlens_domain::files::fill_pattern;
use trendlens_domain::snapshot::topic_items;
use trendlens_domain::{HotTopic, Platform, RawSnapshot, TopicAnalysis};
use trendlens_fetch::{key_params, validate_response, RetryingFetcher, TrendTransport};
use trendlens_llm::LlmProvider;
use trendlens_repair::{parse as repair_parse, ArtifactWriter, DebugArtifact};
use trendlens_report::{render_report, write_report_files};

/// Outcome of the fetch stage.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Where the raw snapshot was persisted.
    pub raw_path: PathBuf,
    /// How many topics the snapshot holds.
    pub topic_count: usize,
    /// How many attempts the fetch took.
    pub attempts: u32,
}

/// Outcome of the analyze stage.
#[derive(Debug, Clone)]
pub enum AnalyzeOutcome {
    /// The batch was analyzed and persisted.
    Analyzed(AnalysisReport),
    /// The model's output was unrecoverable; the batch stays unanalyzed.
    ///
    /// Not an error: the debug artifact (when writable) records the
    /// evidence and the run completes normally.
    Unanalyzed {
        /// Path of the recorded debug artifact, if writing it succeeded.
        artifact: Option<PathBuf>,
    },
}

/// Files and counts produced by a successful analyze stage.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Persisted analysis JSON.
    pub json_path: PathBuf,
    /// Persisted HTML report.
    pub report_path: PathBuf,
    /// Topics that survived deserialization.
    pub analyzed: usize,
    /// Array entries dropped for not matching the analysis schema.
    pub dropped: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The fetch stage outcome.
    pub fetch: FetchReport,
    /// The analyze stage outcome.
    pub analysis: AnalyzeOutcome,
}

/// Fetch one platform's ranking and persist the raw snapshot.
///
/// Fails fast with a [`trendlens_config::ConfigError`] when the credential
/// is missing, and with the fetcher's terminal error once the retry budget
/// is exhausted.
pub async fn fetch_snapshot<T: TrendTransport>(
    config: &EffectiveConfig,
    source: Platform,
    fetcher: &RetryingFetcher<T>,
) -> Result<FetchReport, PipelineError> {
    let api_key = config.tianapi_key()?;
    let url = config.source_url(source.as_str())?;

    info!("fetching {} hot search from {}", source, url);
    let payload = fetcher
        .fetch(&url, &key_params(api_key), validate_response)
        .await?;

    let topics: Vec<HotTopic> = topic_items(&payload.body)
        .iter()
        .enumerate()
        .map(|(index, item)| HotTopic::from_api_item(index as u32 + 1, item))
        .collect();

    let (fetch_time, timestamp) = storage::now_timestamps(&config.paths.timestamp_format);
    let snapshot = RawSnapshot::new(source, &payload.body, topics, fetch_time, timestamp);
    let raw_path = storage::save_raw_snapshot(config, &snapshot)?;

    info!(
        "fetched {} topics from {} in {} attempt(s)",
        snapshot.total_count, source, payload.attempts
    );
    Ok(FetchReport {
        raw_path,
        topic_count: snapshot.total_count,
        attempts: payload.attempts,
    })
}

/// Analyze the newest persisted snapshot for a platform.
///
/// Calls the LLM over the top `analysis.topic_count` topics, recovers its
/// output through the repair cascade, and persists the analysis JSON and
/// HTML report. A terminal repair failure records a debug artifact and
/// yields [`AnalyzeOutcome::Unanalyzed`] instead of an error.
pub async fn analyze_latest<L: LlmProvider>(
    config: &EffectiveConfig,
    source: Platform,
    llm: &L,
) -> Result<AnalyzeOutcome, PipelineError> {
    let raw_path = storage::latest_raw_path(config, source)?;
    info!("analyzing {}", raw_path.display());
    let snapshot = storage::load_snapshot(&raw_path)?;

    let topics: Vec<HotTopic> = snapshot
        .topics
        .into_iter()
        .take(config.analysis.topic_count)
        .collect();
    info!("sending {} topics to the model", topics.len());

    let prompt = build_analysis_prompt(source, &topics, &config.analysis.scoring);
    let response = llm.generate(&prompt).await?;

    let repaired = match repair_parse(&response) {
        Ok(repaired) => repaired,
        Err(failure) => {
            warn!(
                "model output unrecoverable (parse error at line {}, column {}); \
                 reporting the batch as unanalyzed",
                failure.line, failure.column
            );
            let writer = ArtifactWriter::new(config.data_dir());
            let artifact = writer.write(&DebugArtifact::from_failure(&failure));
            return Ok(AnalyzeOutcome::Unanalyzed { artifact });
        }
    };
    info!(
        "model output recovered via the '{}' strategy",
        repaired.strategy.as_str()
    );

    let (mut analyses, dropped) = deserialize_analyses(repaired.value)?;
    for analysis in &mut analyses {
        analysis.regrade(config.grades.excellent, config.grades.good);
    }

    let (_, timestamp) = storage::now_timestamps(&config.paths.timestamp_format);
    let json_path = storage::save_analysis_json(config, source, &timestamp, &analyses)?;

    let html = render_report(source, &analyses, &storage::display_now());
    let report_name = fill_pattern(&config.paths.report_filename_format, source, &timestamp);
    let report_path = write_report_files(&config.data_dir(), &report_name, source, &html)?;

    info!(
        "analysis complete: {} topics analyzed, {} dropped",
        analyses.len(),
        dropped
    );
    Ok(AnalyzeOutcome::Analyzed(AnalysisReport {
        json_path,
        report_path,
        analyzed: analyses.len(),
        dropped,
    }))
}

/// Run the full fetch → analyze → report pipeline for one platform.
pub async fn run<T: TrendTransport, L: LlmProvider>(
    config: &EffectiveConfig,
    source: Platform,
    fetcher: &RetryingFetcher<T>,
    llm: &L,
) -> Result<RunSummary, PipelineError> {
    let fetch = fetch_snapshot(config, source, fetcher).await?;
    let analysis = analyze_latest(config, source, llm).await?;
    Ok(RunSummary { fetch, analysis })
}

/// Deserialize the recovered JSON into an analysis batch.
///
/// The value must be an array; entries that do not match the schema are
/// dropped with a warning rather than failing the batch.
fn deserialize_analyses(value: Value) -> Result<(Vec<TopicAnalysis>, usize), PipelineError> {
    let Value::Array(entries) = value else {
        return Err(PipelineError::Payload(
            "expected a JSON array of topic analyses".to_string(),
        ));
    };

    let mut analyses = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<TopicAnalysis>(entry) {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => {
                warn!("dropping analysis entry {}: {}", index, e);
                dropped += 1;
            }
        }
    }
    Ok((analyses, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_drops_malformed_entries() {
        let value = json!([
            {"rank": 1, "title": "ok", "total_score": 70},
            {"title": "missing rank"},
            {"rank": 2, "title": "also ok", "total_score": 50},
        ]);
        let (analyses, dropped) = deserialize_analyses(value).unwrap();
        assert_eq!(analyses.len(), 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_deserialize_rejects_non_array() {
        let err = deserialize_analyses(json!({"rank": 1})).unwrap_err();
        assert!(matches!(err, PipelineError::Payload(_)));
    }
}
