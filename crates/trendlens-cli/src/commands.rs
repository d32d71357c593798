//! Command execution: overlay assembly, wiring, and exit-code policy.

use crate::cli::{Cli, CleanupArgs, Command};
use crate::logging;
use anyhow::Context;
use std::path::Path;
use trendlens_config::{
    resolve, AnalysisOverlay, ApiOverlay, ConfigError, ConfigOverlay, EffectiveConfig,
    LoggingOverlay, PathsOverlay, TianApiOverlay,
};
use trendlens_domain::Platform;
use trendlens_fetch::{HttpTransport, RetryPolicy, RetryingFetcher};
use trendlens_janitor::{Janitor, JanitorConfig};
use trendlens_llm::AnthropicProvider;
use trendlens_pipeline::{analyze_latest, fetch_snapshot, run, AnalyzeOutcome};
use trendlens_report::generate_index;

/// Default config file location, consulted only when `--config` is absent.
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Execute the parsed CLI invocation.
///
/// Returns `Ok` for completed runs (including runs whose batch stayed
/// unanalyzed after a recorded debug artifact) and `Err` (exit code 1) for
/// configuration errors, exhausted fetches, and other fatal failures.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let source: Platform = cli.source.into();
    let config = resolve_config(&cli)?;
    logging::init(&config.logging)?;
    tracing::debug!(
        "configuration resolved: data dir {}, topic count {}",
        config.paths.data_dir,
        config.analysis.topic_count
    );

    match cli.command.as_ref().unwrap_or(&Command::Run) {
        Command::Run => {
            let fetcher = build_fetcher(&config)?;
            let llm = build_provider(&config)?;
            let summary = run(&config, source, &fetcher, &llm).await?;
            println!(
                "Fetched {} topics in {} attempt(s): {}",
                summary.fetch.topic_count,
                summary.fetch.attempts,
                summary.fetch.raw_path.display()
            );
            report_analysis_outcome(&summary.analysis, cli.output.as_deref())?;
        }
        Command::Fetch => {
            let fetcher = build_fetcher(&config)?;
            let report = fetch_snapshot(&config, source, &fetcher).await?;
            println!(
                "Fetched {} topics in {} attempt(s): {}",
                report.topic_count,
                report.attempts,
                report.raw_path.display()
            );
        }
        Command::Analyze => {
            let llm = build_provider(&config)?;
            let outcome = analyze_latest(&config, source, &llm).await?;
            report_analysis_outcome(&outcome, cli.output.as_deref())?;
        }
        Command::Index => {
            let path = generate_index(&config.data_dir())?;
            println!("Index page: {}", path.display());
        }
        Command::Cleanup(args) => {
            let metrics = run_cleanup(&config, args)?;
            println!("Cleanup: {}", metrics.summary());
        }
    }

    Ok(())
}

/// Gather the four tiers and resolve them.
///
/// An explicitly passed `--config` file must exist; the default location is
/// optional and silently skipped when absent.
fn resolve_config(cli: &Cli) -> Result<EffectiveConfig, ConfigError> {
    let file_overlay = match &cli.config {
        Some(path) => ConfigOverlay::from_yaml_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                ConfigOverlay::from_yaml_file(default)?
            } else {
                ConfigOverlay::default()
            }
        }
    };

    Ok(resolve(
        EffectiveConfig::default(),
        file_overlay,
        ConfigOverlay::from_env(),
        cli_overlay(cli),
    ))
}

/// The CLI-argument tier, built from the override flags.
fn cli_overlay(cli: &Cli) -> ConfigOverlay {
    let mut overlay = ConfigOverlay::default();

    if let Some(key) = &cli.api_key {
        overlay.api = Some(ApiOverlay {
            tianapi: Some(TianApiOverlay {
                key: Some(key.clone()),
                ..Default::default()
            }),
        });
    }
    if let Some(data_dir) = &cli.data_dir {
        overlay.paths = Some(PathsOverlay {
            data_dir: Some(data_dir.clone()),
            ..Default::default()
        });
    }
    if let Some(topic_count) = cli.topic_count {
        overlay.analysis = Some(AnalysisOverlay {
            topic_count: Some(topic_count),
            ..Default::default()
        });
    }
    if let Some(level) = &cli.log_level {
        overlay.logging = Some(LoggingOverlay {
            level: Some(level.to_lowercase()),
            ..Default::default()
        });
    }

    overlay
}

fn build_fetcher(config: &EffectiveConfig) -> anyhow::Result<RetryingFetcher<HttpTransport>> {
    let transport = HttpTransport::new(config.fetch_timeout())
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(RetryingFetcher::new(
        transport,
        RetryPolicy {
            timeout_secs: config.tianapi.timeout_secs,
            max_retries: config.tianapi.max_retries,
        },
    ))
}

fn build_provider(config: &EffectiveConfig) -> anyhow::Result<AnthropicProvider> {
    AnthropicProvider::from_env(
        config.llm.base_url.clone(),
        config.llm.model_id.clone(),
        config.llm.max_tokens,
    )
    .context("building LLM provider")
}

fn run_cleanup(
    config: &EffectiveConfig,
    args: &CleanupArgs,
) -> anyhow::Result<trendlens_janitor::SweepMetrics> {
    let mut janitor_config = match args.keep {
        Some(keep) => JanitorConfig::keep_all(keep),
        None => JanitorConfig {
            keep_raw: config.cleanup.keep_raw,
            keep_debug: config.cleanup.keep_debug,
            dry_run: false,
        },
    };
    if args.dry_run {
        janitor_config = janitor_config.dry_run();
    }

    Janitor::new(janitor_config)
        .sweep(&config.data_dir())
        .context("retention sweep failed")
}

fn report_analysis_outcome(
    outcome: &AnalyzeOutcome,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match outcome {
        AnalyzeOutcome::Analyzed(report) => {
            println!(
                "Analyzed {} topics ({} dropped)",
                report.analyzed, report.dropped
            );
            println!("JSON:   {}", report.json_path.display());
            println!("Report: {}", report.report_path.display());

            if let Some(output) = output {
                if let Some(parent) = output.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).with_context(|| {
                            format!("creating output directory {}", parent.display())
                        })?;
                    }
                }
                std::fs::copy(&report.report_path, output)
                    .with_context(|| format!("copying report to {}", output.display()))?;
                println!("Copy:   {}", output.display());
            }
        }
        AnalyzeOutcome::Unanalyzed { artifact } => {
            // Not a failure of the run: the evidence is on disk for triage.
            match artifact {
                Some(path) => println!(
                    "Model output was unrecoverable; batch left unanalyzed. Debug artifact: {}",
                    path.display()
                ),
                None => println!(
                    "Model output was unrecoverable; batch left unanalyzed (debug artifact could not be written)"
                ),
            }
        }
    }
    Ok(())
}
