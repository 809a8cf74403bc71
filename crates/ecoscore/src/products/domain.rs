use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the record store when a product is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative importance of the three normalized metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub gwp: f64,
    pub circularity: f64,
    pub cost: f64,
}

impl ScoreWeights {
    pub const EQUAL: ScoreWeights = ScoreWeights {
        gwp: 1.0,
        circularity: 1.0,
        cost: 1.0,
    };

    pub fn total(&self) -> f64 {
        self.gwp + self.circularity + self.cost
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            gwp: 0.5,
            circularity: 0.3,
            cost: 0.2,
        }
    }
}

/// Product payload after validation; the only shape the scorer and advisor accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSubmission {
    pub product_name: String,
    pub materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    pub gwp: f64,
    pub cost: f64,
    pub circularity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScoreWeights>,
}

/// Letter bucket for a sustainability score.
///
/// `Unrecognized` only appears when reading records written by something other
/// than this crate; the scorer never produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rating {
    A,
    B,
    C,
    D,
    Unrecognized(String),
}

impl Rating {
    pub const ORDERED: [Rating; 4] = [Rating::A, Rating::B, Rating::C, Rating::D];

    pub fn label(&self) -> &str {
        match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Rating {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A" => Rating::A,
            "B" => Rating::B,
            "C" => Rating::C,
            "D" => Rating::D,
            _ => Rating::Unrecognized(value),
        }
    }
}

impl From<Rating> for String {
    fn from(value: Rating) -> Self {
        match value {
            Rating::Unrecognized(raw) => raw,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scored product waiting for the store to assign an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_name: String,
    pub materials: Vec<String>,
    pub weight_grams: Option<i64>,
    pub transport: Option<String>,
    pub packaging: Option<String>,
    pub gwp: f64,
    pub cost: f64,
    pub circularity: f64,
    pub score: f64,
    pub rating: Rating,
    pub suggestions: Vec<String>,
}

impl NewProduct {
    /// Drops the weight overrides; they only influence the score.
    pub fn new(
        submission: ProductSubmission,
        score: f64,
        rating: Rating,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            product_name: submission.product_name,
            materials: submission.materials,
            weight_grams: submission.weight_grams,
            transport: submission.transport,
            packaging: submission.packaging,
            gwp: submission.gwp,
            cost: submission.cost,
            circularity: submission.circularity,
            score,
            rating,
            suggestions,
        }
    }

    pub fn into_record(self, id: ProductId, created_at: DateTime<Utc>) -> ScoredProduct {
        ScoredProduct {
            id,
            product_name: self.product_name,
            materials: self.materials,
            weight_grams: self.weight_grams,
            transport: self.transport,
            packaging: self.packaging,
            gwp: self.gwp,
            cost: self.cost,
            circularity: self.circularity,
            score: self.score,
            rating: self.rating,
            suggestions: self.suggestions,
            created_at,
        }
    }
}

/// Persisted scoring record. Never mutated after the store creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub id: ProductId,
    pub product_name: String,
    pub materials: Vec<String>,
    pub weight_grams: Option<i64>,
    pub transport: Option<String>,
    pub packaging: Option<String>,
    pub gwp: f64,
    pub cost: f64,
    pub circularity: f64,
    pub score: f64,
    pub rating: Rating,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ScoredProduct {
    pub fn score_view(&self) -> ScoreView {
        ScoreView {
            product_name: self.product_name.clone(),
            sustainability_score: self.score,
            rating: self.rating.clone(),
            suggestions: self.suggestions.clone(),
        }
    }
}

/// Response body returned after a successful scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub product_name: String,
    pub sustainability_score: f64,
    pub rating: Rating,
    pub suggestions: Vec<String>,
}
