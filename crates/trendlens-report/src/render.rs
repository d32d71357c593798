//! Per-run HTML report rendering.

use crate::error::ReportError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use trendlens_domain::{Grade, Platform, TopicAnalysis};

/// Render the full report page for one run.
///
/// Pure string building; `generated_at` is a preformatted display timestamp
/// so rendering stays clock-free and testable.
pub fn render_report(source: Platform, analyses: &[TopicAnalysis], generated_at: &str) -> String {
    let excellent = analyses.iter().filter(|a| a.grade == Grade::Excellent).count();
    let good = analyses.iter().filter(|a| a.grade == Grade::Good).count();
    let average = analyses.len() - excellent - good;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} Hot Search Product Ideas - {generated_at}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'PingFang SC', 'Microsoft YaHei', sans-serif;
            background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);
            color: #eee;
            min-height: 100vh;
            padding: 20px;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        h1 {{ text-align: center; margin-bottom: 30px; color: #00d4ff; font-size: 2em; }}
        .stats {{ display: flex; gap: 20px; margin-bottom: 30px; flex-wrap: wrap; justify-content: center; }}
        .stat-card {{
            background: rgba(255,255,255,0.1);
            padding: 20px 30px;
            border-radius: 10px;
            text-align: center;
            min-width: 120px;
        }}
        .stat-card h3 {{ font-size: 2em; margin-top: 5px; }}
        .stat-card.excellent h3 {{ color: #00ff88; }}
        .stat-card.good h3 {{ color: #00d4ff; }}
        .stat-card.average h3 {{ color: #888; }}
        .topic-card {{
            background: rgba(255,255,255,0.05);
            margin: 20px 0;
            border-radius: 15px;
            padding: 25px;
            border-left: 4px solid #666;
        }}
        .topic-card.excellent {{ border-left-color: #00ff88; }}
        .topic-card.good {{ border-left-color: #00d4ff; }}
        .topic-header {{ display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 10px; }}
        .topic-title {{ font-size: 1.3em; font-weight: bold; flex: 1; }}
        .topic-score {{
            font-size: 1.5em;
            font-weight: bold;
            padding: 5px 15px;
            border-radius: 20px;
            background: rgba(0,0,0,0.3);
        }}
        .topic-card.excellent .topic-score {{ color: #00ff88; }}
        .topic-card.good .topic-score {{ color: #00d4ff; }}
        .topic-grade {{ font-size: 0.9em; padding: 3px 10px; border-radius: 10px; background: rgba(255,255,255,0.1); }}
        .scores-detail {{ display: flex; flex-wrap: wrap; gap: 10px; margin: 15px 0; font-size: 0.85em; color: #aaa; }}
        .scores-detail span {{ background: rgba(255,255,255,0.05); padding: 3px 8px; border-radius: 5px; }}
        .product-idea {{ margin-top: 15px; padding: 15px; background: rgba(0,0,0,0.2); border-radius: 10px; }}
        .product-idea h4 {{ color: #ffd700; margin-bottom: 10px; font-size: 1.1em; }}
        .product-idea p {{ margin: 8px 0; line-height: 1.6; color: #ccc; }}
        .product-idea strong {{ color: #fff; }}
        .timestamp {{
            text-align: center;
            color: #666;
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid rgba(255,255,255,0.1);
        }}
        @media (max-width: 600px) {{
            .topic-header {{ flex-direction: column; align-items: flex-start; }}
            .stat-card {{ min-width: 100px; padding: 15px 20px; }}
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{name} Hot Search Product Ideas</h1>
        <div class="stats">
            <div class="stat-card">
                <p>Topics</p>
                <h3>{total}</h3>
            </div>
            <div class="stat-card excellent">
                <p>Excellent (80+)</p>
                <h3>{excellent}</h3>
            </div>
            <div class="stat-card good">
                <p>Good (60-80)</p>
                <h3>{good}</h3>
            </div>
            <div class="stat-card average">
                <p>Average (&lt;60)</p>
                <h3>{average}</h3>
            </div>
        </div>
"#,
        name = source.display_name(),
        generated_at = generated_at,
        total = analyses.len(),
        excellent = excellent,
        good = good,
        average = average,
    );

    for analysis in analyses {
        html.push_str(&topic_card(analysis));
    }

    let _ = write!(
        html,
        r#"
        <p class="timestamp">
            Generated {generated_at}<br>
            Source: {name} hot search
        </p>
    </div>
</body>
</html>"#,
        generated_at = generated_at,
        name = source.display_name(),
    );

    html
}

fn topic_card(analysis: &TopicAnalysis) -> String {
    let grade_class = match analysis.grade {
        Grade::Excellent | Grade::Good => analysis.grade.as_str(),
        Grade::Average => "",
    };
    let scores = &analysis.scores;
    let score_spans = [
        ("Novelty", scores.novelty),
        ("Resonance", scores.resonance),
        ("Viral", scores.viral),
        ("Entertainment", scores.entertainment),
        ("Practical", scores.practical),
        ("Market", scores.market),
    ]
    .into_iter()
    .map(|(label, value)| format!("<span>{label}: {value:.0}</span>"))
    .collect::<Vec<_>>()
    .join("");

    let idea = &analysis.product_idea;
    let idea_name = if idea.name.is_empty() {
        "Product idea"
    } else {
        idea.name.as_str()
    };

    format!(
        r#"
        <div class="topic-card {grade_class}">
            <div class="topic-header">
                <span class="topic-title">#{rank} {title}</span>
                <span class="topic-grade">{grade}</span>
                <span class="topic-score">{score:.0}</span>
            </div>
            <div class="scores-detail">{score_spans}</div>
            <div class="product-idea">
                <h4>{idea_name}</h4>
                <p><strong>Core features:</strong> {features}</p>
                <p><strong>Target users:</strong> {target_users}</p>
                <p><strong>Value proposition:</strong> {value_proposition}</p>
            </div>
        </div>
"#,
        grade_class = grade_class,
        rank = analysis.rank,
        title = escape(&analysis.title),
        grade = analysis.grade.label(),
        score = analysis.total_score,
        score_spans = score_spans,
        idea_name = escape(idea_name),
        features = escape(or_na(&idea.features)),
        target_users = escape(or_na(&idea.target_users)),
        value_proposition = escape(or_na(&idea.value_proposition)),
    )
}

fn or_na(text: &str) -> &str {
    if text.is_empty() {
        "N/A"
    } else {
        text
    }
}

/// Minimal HTML escaping for model-supplied text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write the report under `data_dir` as `report_name` plus a per-platform
/// `index_{source}.html` copy for quick viewing.
pub fn write_report_files(
    data_dir: &Path,
    report_name: &str,
    source: Platform,
    html: &str,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(data_dir).map_err(|e| ReportError::io(data_dir, e))?;

    let report_path = data_dir.join(report_name);
    fs::write(&report_path, html).map_err(|e| ReportError::io(&report_path, e))?;

    let index_path = data_dir.join(format!("index_{}.html", source.as_str()));
    fs::write(&index_path, html).map_err(|e| ReportError::io(&index_path, e))?;

    info!("report saved to {}", report_path.display());
    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_domain::{ProductIdea, ScoreBreakdown};

    fn sample(rank: u32, title: &str, total: f64, grade: Grade) -> TopicAnalysis {
        TopicAnalysis {
            rank,
            title: title.to_string(),
            scores: ScoreBreakdown {
                novelty: 15.0,
                resonance: 14.0,
                viral: 13.0,
                entertainment: 12.0,
                practical: 6.0,
                market: 5.0,
            },
            total_score: total,
            grade,
            product_idea: ProductIdea {
                name: "Idea".to_string(),
                features: "Does things".to_string(),
                target_users: "People".to_string(),
                value_proposition: "Value".to_string(),
            },
        }
    }

    #[test]
    fn test_report_counts_grades() {
        let analyses = vec![
            sample(1, "first", 85.0, Grade::Excellent),
            sample(2, "second", 70.0, Grade::Good),
            sample(3, "third", 40.0, Grade::Average),
        ];
        let html = render_report(Platform::Weibo, &analyses, "2026-01-02 03:04:05");

        assert!(html.contains("Weibo Hot Search Product Ideas"));
        assert!(html.contains("#1 first"));
        assert!(html.contains("#3 third"));
        // One topic per grade band.
        assert!(html.contains(r#"class="topic-card excellent""#));
        assert!(html.contains(r#"class="topic-card good""#));
    }

    #[test]
    fn test_model_text_is_escaped() {
        let mut analysis = sample(1, "<script>alert(1)</script>", 50.0, Grade::Average);
        analysis.product_idea.features = "a < b & c".to_string();
        let html = render_report(Platform::Douyin, &[analysis], "now");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_empty_idea_fields_render_na() {
        let mut analysis = sample(1, "t", 50.0, Grade::Average);
        analysis.product_idea = ProductIdea::default();
        let html = render_report(Platform::Weibo, &[analysis], "now");
        assert!(html.contains("Product idea"));
        assert!(html.contains("N/A"));
    }

    #[test]
    fn test_write_report_files_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<html></html>";
        let path = write_report_files(
            dir.path(),
            "weibo_analysis_20260102_030405.html",
            Platform::Weibo,
            html,
        )
        .unwrap();

        assert!(path.exists());
        assert!(dir.path().join("index_weibo.html").exists());
        assert_eq!(fs::read_to_string(path).unwrap(), html);
    }
}
