use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::advisor::{is_recyclable_packaging, normalized};
use super::domain::{Rating, ScoredProduct};
use super::scoring::rules::round_to;

pub const PLASTIC_USED: &str = "Plastic used";
pub const AIR_TRANSPORT: &str = "Air transport";
pub const NON_RECYCLABLE_PACKAGING: &str = "Non-recyclable packaging";

const TOP_MATERIALS: usize = 3;

/// Aggregate view over every stored scoring record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total_products: usize,
    pub average_score: f64,
    pub ratings: BTreeMap<String, usize>,
    pub top_issues: Vec<String>,
}

impl ScoreSummary {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            average_score: 0.0,
            ratings: rating_buckets(),
            top_issues: Vec::new(),
        }
    }
}

/// Summarize records given in creation order.
///
/// Creation order matters only for ties in the material and packaging
/// rankings, where the value seen first wins.
pub fn summarize(records: &[ScoredProduct]) -> ScoreSummary {
    if records.is_empty() {
        return ScoreSummary::empty();
    }

    let total = records.len();
    let average = records.iter().map(|record| record.score).sum::<f64>() / total as f64;

    let mut ratings = rating_buckets();
    for record in records {
        *ratings.entry(record.rating.label().to_string()).or_insert(0) += 1;
    }

    let mut top_issues = Vec::new();

    let materials = ranked_counts(
        records
            .iter()
            .flat_map(|record| record.materials.iter())
            .map(|material| material.trim().to_lowercase()),
    );
    if materials
        .iter()
        .take(TOP_MATERIALS)
        .any(|(material, _)| material.contains("plastic"))
    {
        top_issues.push(PLASTIC_USED.to_string());
    }

    if records
        .iter()
        .any(|record| normalized(record.transport.as_deref()) == "air")
    {
        top_issues.push(AIR_TRANSPORT.to_string());
    }

    let packaging = ranked_counts(
        records
            .iter()
            .map(|record| normalized(record.packaging.as_deref()))
            .filter(|packaging| !packaging.is_empty()),
    );
    if let Some((most_common, _)) = packaging.first() {
        if !is_recyclable_packaging(most_common) {
            top_issues.push(NON_RECYCLABLE_PACKAGING.to_string());
        }
    }

    ScoreSummary {
        total_products: total,
        average_score: round_to(average, 2),
        ratings,
        top_issues,
    }
}

fn rating_buckets() -> BTreeMap<String, usize> {
    Rating::ORDERED
        .iter()
        .map(|rating| (rating.label().to_string(), 0))
        .collect()
}

/// Distinct values ordered by descending count, ties kept in first-seen order.
fn ranked_counts(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (left_count, left_seen)), (_, (right_count, right_seen))| {
        right_count
            .cmp(left_count)
            .then(left_seen.cmp(right_seen))
    });
    ranked
        .into_iter()
        .map(|(value, (count, _))| (value, count))
        .collect()
}
