//! Prompt construction for the scoring call.

use trendlens_config::ScoringConfig;
use trendlens_domain::{HotTopic, Platform};

fn weight(map: &std::collections::BTreeMap<String, f64>, key: &str, fallback: f64) -> f64 {
    map.get(key).copied().unwrap_or(fallback)
}

/// Build the product-analyst prompt for one batch of topics.
///
/// The rubric weights come from configuration so the prompt and the report
/// always agree on the scale. The closing instruction asks for a bare JSON
/// array; the repair cascade exists for the times the model ignores it.
pub fn build_analysis_prompt(
    source: Platform,
    topics: &[HotTopic],
    scoring: &ScoringConfig,
) -> String {
    let topics_json =
        serde_json::to_string_pretty(topics).unwrap_or_else(|_| "[]".to_string());

    let novelty = weight(&scoring.interesting_detail, "novelty", 20.0);
    let resonance = weight(&scoring.interesting_detail, "resonance", 20.0);
    let viral = weight(&scoring.interesting_detail, "viral", 20.0);
    let entertainment = weight(&scoring.interesting_detail, "entertainment", 20.0);
    let practical = weight(&scoring.useful_detail, "practical", 10.0);
    let market = weight(&scoring.useful_detail, "market", 10.0);

    format!(
        r#"You are a professional product-idea analyst. Analyze the following {name} hot-search topics.

## Scoring rubric ({total:.0} points total)

**Interest ({interesting:.0} points)**:
- novelty ({novelty:.0} points): uniqueness and unexpectedness of the topic
- resonance ({resonance:.0} points): public engagement and emotional investment
- viral ({viral:.0} points): shareability of the topic
- entertainment ({entertainment:.0} points): fun factor and attractiveness

**Utility ({useful:.0} points)**:
- practical ({practical:.0} points): whether a product here solves a real problem
- market ({market:.0} points): commercialization and monetization potential

## Topic data
{topics_json}

## Output requirements
For every topic produce a JSON object with:
- rank: the topic's rank (number)
- title: the topic title (string)
- scores: an object with novelty, resonance, viral, entertainment, practical, market
- total_score: the sum of all dimensions (number)
- grade: "excellent" (>= 80), "good" (>= 60) or "average" (< 60)
- product_idea: an object with:
  - name: product name
  - features: core feature description
  - target_users: target user description
  - value_proposition: value proposition

Return ONLY the JSON array. Do not add any explanation, prose, or markdown fences."#,
        name = source.display_name(),
        total = scoring.interesting + scoring.useful,
        interesting = scoring.interesting,
        useful = scoring.useful,
        novelty = novelty,
        resonance = resonance,
        viral = viral,
        entertainment = entertainment,
        practical = practical,
        market = market,
        topics_json = topics_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn topics() -> Vec<HotTopic> {
        vec![HotTopic::from_api_item(
            1,
            &json!({"word": "sample topic", "hotnum": 42}),
        )]
    }

    #[test]
    fn test_prompt_carries_topics_and_platform() {
        let prompt = build_analysis_prompt(Platform::Weibo, &topics(), &ScoringConfig::default());
        assert!(prompt.contains("Weibo hot-search topics"));
        assert!(prompt.contains("sample topic"));
        assert!(prompt.contains("Return ONLY the JSON array"));
    }

    #[test]
    fn test_prompt_reflects_configured_weights() {
        let mut scoring = ScoringConfig::default();
        scoring.interesting = 70.0;
        scoring
            .interesting_detail
            .insert("novelty".to_string(), 25.0);
        let prompt = build_analysis_prompt(Platform::Douyin, &topics(), &scoring);
        assert!(prompt.contains("Interest (70 points)"));
        assert!(prompt.contains("novelty (25 points)"));
    }
}
