//! Analysis results produced from LLM output.
//!
//! The LLM is asked for a JSON array of per-topic analyses. These types are
//! the deserialization target for that array, deliberately lenient: every
//! sub-object has defaults so a topic is only dropped when its essential
//! fields (rank, title, total score) are missing or mistyped.

use serde::{Deserialize, Serialize};

/// Per-dimension scores for one topic.
///
/// The interest dimensions (novelty, resonance, viral, entertainment) are
/// scored 0-20 each; the utility dimensions (practical, market) 0-10 each.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    /// Uniqueness and unexpectedness of the topic.
    pub novelty: f64,
    /// Public engagement and emotional investment.
    pub resonance: f64,
    /// Shareability of the topic.
    pub viral: f64,
    /// Fun factor and attractiveness.
    pub entertainment: f64,
    /// Whether a product here would solve a real problem.
    pub practical: f64,
    /// Commercialization and monetization potential.
    pub market: f64,
}

impl ScoreBreakdown {
    /// Sum of all six dimensions.
    pub fn total(&self) -> f64 {
        self.novelty + self.resonance + self.viral + self.entertainment + self.practical
            + self.market
    }
}

/// A product idea derived from one topic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductIdea {
    /// Product name.
    pub name: String,
    /// Core feature description.
    pub features: String,
    /// Target user description.
    pub target_users: String,
    /// Value proposition.
    pub value_proposition: String,
}

/// Grade band derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Total score at or above the excellent threshold.
    Excellent,
    /// Total score at or above the good threshold.
    Good,
    /// Everything below the good threshold.
    #[default]
    Average,
}

impl Grade {
    /// Classify a total score against the configured band thresholds.
    pub fn classify(total_score: f64, excellent_min: f64, good_min: f64) -> Self {
        if total_score >= excellent_min {
            Grade::Excellent
        } else if total_score >= good_min {
            Grade::Good
        } else {
            Grade::Average
        }
    }

    /// Lowercase id, also used as a CSS class in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Average => "average",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::Average => "Average",
        }
    }
}

/// Full analysis of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    /// Rank of the topic in the source ranking.
    pub rank: u32,
    /// Topic title as echoed by the model.
    pub title: String,
    /// Per-dimension scores.
    #[serde(default)]
    pub scores: ScoreBreakdown,
    /// Total score out of 100.
    pub total_score: f64,
    /// Grade band; recomputed from configured thresholds after parsing, so
    /// the model's own claim never leaks into reports.
    #[serde(default)]
    pub grade: Grade,
    /// Product idea for the topic.
    #[serde(default)]
    pub product_idea: ProductIdea,
}

impl TopicAnalysis {
    /// Re-derive the grade from the configured thresholds.
    pub fn regrade(&mut self, excellent_min: f64, good_min: f64) {
        self.grade = Grade::classify(self.total_score, excellent_min, good_min);
    }
}
