//! Aggregate index page over all generated reports.

use crate::error::ReportError;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use trendlens_domain::files::{parse_report_filename, TIMESTAMP_FORMAT};
use trendlens_domain::Platform;

/// One report file discovered in the data directory.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    /// File name, relative to the data directory.
    pub filename: String,
    /// Compact timestamp parsed from the name.
    pub timestamp: String,
    /// Timestamp formatted for display, falling back to the raw form when
    /// it does not parse.
    pub display_time: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Scan the data directory for `*_analysis_*.html` reports, grouped by
/// platform and sorted newest first.
///
/// Every platform appears in the result, with an empty list when it has no
/// reports yet.
pub fn collect_reports(
    data_dir: &Path,
) -> Result<BTreeMap<Platform, Vec<ReportEntry>>, ReportError> {
    let mut reports: BTreeMap<Platform, Vec<ReportEntry>> =
        Platform::ALL.iter().map(|p| (*p, Vec::new())).collect();

    let entries = fs::read_dir(data_dir).map_err(|e| ReportError::io(data_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ReportError::io(data_dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some((platform, timestamp)) = parse_report_filename(name) else {
            continue;
        };

        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        reports.entry(platform).or_default().push(ReportEntry {
            filename: name.to_string(),
            timestamp: timestamp.to_string(),
            display_time: display_time(timestamp),
            size_bytes,
        });
    }

    for entries in reports.values_mut() {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
    Ok(reports)
}

fn display_time(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Render the index page: one section per platform, newest report linked.
pub fn render_index(reports: &BTreeMap<Platform, Vec<ReportEntry>>) -> String {
    let platforms_with_reports = reports.values().filter(|r| !r.is_empty()).count();

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hot Search Analysis Reports</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            padding: 20px;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        h1 {{
            text-align: center;
            color: white;
            margin-bottom: 10px;
            font-size: 2.5em;
            text-shadow: 2px 2px 4px rgba(0,0,0,0.3);
        }}
        .subtitle {{ text-align: center; color: rgba(255,255,255,0.9); margin-bottom: 30px; font-size: 1.1em; }}
        .stats {{ display: flex; gap: 20px; margin-bottom: 30px; justify-content: center; flex-wrap: wrap; }}
        .stat-card {{
            background: rgba(255,255,255,0.95);
            padding: 20px 30px;
            border-radius: 15px;
            text-align: center;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }}
        .stat-card h3 {{ font-size: 2em; color: #667eea; margin-top: 5px; }}
        .stat-card p {{ color: #666; font-size: 0.9em; }}
        .platform-section {{
            background: rgba(255,255,255,0.95);
            border-radius: 15px;
            padding: 25px;
            margin-bottom: 20px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }}
        .platform-header {{
            display: flex;
            align-items: center;
            margin-bottom: 20px;
            padding-bottom: 15px;
            border-bottom: 2px solid #f0f0f0;
        }}
        .platform-title {{ font-size: 1.5em; color: #333; flex: 1; }}
        .platform-count {{
            background: #667eea;
            color: white;
            padding: 5px 15px;
            border-radius: 20px;
            font-size: 0.9em;
        }}
        .report-card {{
            display: block;
            background: white;
            border: 1px solid #e0e0e0;
            border-radius: 10px;
            padding: 15px;
            color: inherit;
            text-decoration: none;
        }}
        .report-card:hover {{ border-color: #667eea; box-shadow: 0 4px 12px rgba(0,0,0,0.15); }}
        .report-time {{ font-size: 1.1em; color: #333; margin-bottom: 8px; font-weight: 500; }}
        .report-meta {{ display: flex; justify-content: space-between; color: #999; font-size: 0.85em; }}
        .no-reports {{ text-align: center; color: #999; padding: 30px; font-style: italic; }}
        .footer {{
            text-align: center;
            color: rgba(255,255,255,0.8);
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid rgba(255,255,255,0.2);
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Hot Search Analysis Reports</h1>
        <p class="subtitle">AI-scored trending topics and product ideas across platforms</p>

        <div class="stats">
            <div class="stat-card">
                <p>Platforms with reports</p>
                <h3>{platforms_with_reports}</h3>
            </div>
            <div class="stat-card">
                <p>Supported platforms</p>
                <h3>{supported}</h3>
            </div>
        </div>
"#,
        platforms_with_reports = platforms_with_reports,
        supported = Platform::ALL.len(),
    );

    for platform in Platform::ALL {
        let entries = reports.get(&platform).map(Vec::as_slice).unwrap_or(&[]);
        let badge = if entries.is_empty() {
            "no reports"
        } else {
            "latest report"
        };

        let _ = write!(
            html,
            r#"
        <div class="platform-section">
            <div class="platform-header">
                <h2 class="platform-title">{name} hot search</h2>
                <span class="platform-count">{badge}</span>
            </div>
"#,
            name = platform.display_name(),
            badge = badge,
        );

        match entries.first() {
            Some(report) => {
                let size_kb = report.size_bytes as f64 / 1024.0;
                let _ = write!(
                    html,
                    r#"            <a class="report-card" href="{filename}">
                <div class="report-time">{display_time}</div>
                <div class="report-meta">
                    <span>{size_kb:.1} KB</span>
                    <span>view report</span>
                </div>
            </a>
"#,
                    filename = report.filename,
                    display_time = report.display_time,
                    size_kb = size_kb,
                );
            }
            None => {
                html.push_str("            <div class=\"no-reports\">No reports yet</div>\n");
            }
        }

        html.push_str("        </div>\n");
    }

    html.push_str(
        r#"
        <div class="footer">
            <p>Generated by Trendlens | Data source: TianAPI</p>
        </div>
    </div>
</body>
</html>
"#,
    );

    html
}

/// Regenerate `data/index.html` from the reports currently on disk.
pub fn generate_index(data_dir: &Path) -> Result<PathBuf, ReportError> {
    let reports = collect_reports(data_dir)?;
    let html = render_index(&reports);

    let index_path = data_dir.join("index.html");
    fs::write(&index_path, html).map_err(|e| ReportError::io(&index_path, e))?;
    info!("index page saved to {}", index_path.display());
    Ok(index_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_collect_groups_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "weibo_analysis_20260101_000000.html", "old");
        touch(dir.path(), "weibo_analysis_20260102_000000.html", "new");
        touch(dir.path(), "douyin_analysis_20260101_120000.html", "d");
        touch(dir.path(), "weibo_raw_20260101_000000.json", "not a report");
        touch(dir.path(), "notes.txt", "ignored");

        let reports = collect_reports(dir.path()).unwrap();
        let weibo = &reports[&Platform::Weibo];
        assert_eq!(weibo.len(), 2);
        assert_eq!(weibo[0].timestamp, "20260102_000000");
        assert_eq!(reports[&Platform::Douyin].len(), 1);
        assert!(reports[&Platform::Wechat].is_empty());
    }

    #[test]
    fn test_display_time_formats_contract_timestamps() {
        assert_eq!(display_time("20260102_030405"), "2026-01-02 03:04:05");
        // Unparseable timestamps fall back to the raw text.
        assert_eq!(display_time("garbage"), "garbage");
    }

    #[test]
    fn test_render_index_links_newest_report_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "weibo_analysis_20260101_000000.html", "old");
        touch(dir.path(), "weibo_analysis_20260102_000000.html", "new");

        let reports = collect_reports(dir.path()).unwrap();
        let html = render_index(&reports);

        assert!(html.contains("weibo_analysis_20260102_000000.html"));
        assert!(!html.contains("weibo_analysis_20260101_000000.html"));
        assert!(html.contains("No reports yet"));
    }

    #[test]
    fn test_generate_index_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "wechat_analysis_20260102_030405.html", "r");

        let path = generate_index(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("index.html"));
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("WeChat hot search"));
        assert!(html.contains("2026-01-02 03:04:05"));
    }
}
