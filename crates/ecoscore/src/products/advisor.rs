use super::domain::ProductSubmission;

pub const MAX_SUGGESTIONS: usize = 5;

pub const AVOID_AIR_TRANSPORT: &str = "Avoid air transport; prefer sea/rail/optimized road";
pub const REDUCE_PLASTIC: &str = "Reduce plastic; increase recycled or bio-based content";
pub const SWITCH_PACKAGING: &str = "Switch to recyclable or biodegradable packaging";
pub const REDUCE_EMBODIED_CARBON: &str = "Reduce embodied carbon via material or process changes";
pub const IMPROVE_CIRCULARITY: &str = "Improve circularity via design for repair/reuse/recycling";

const GWP_THRESHOLD: f64 = 10.0;
const CIRCULARITY_THRESHOLD: f64 = 60.0;

/// Improvement tips for a submission, in rule order.
///
/// Works from the raw metrics rather than the normalized sub-scores, so the
/// result does not depend on weights or scoring ceilings.
pub fn suggestions_for_product(submission: &ProductSubmission) -> Vec<String> {
    let transport = normalized(submission.transport.as_deref());
    let packaging = normalized(submission.packaging.as_deref());

    let mut tips = Vec::new();
    if transport == "air" {
        tips.push(AVOID_AIR_TRANSPORT);
    }
    if submission
        .materials
        .iter()
        .any(|material| material.trim().to_lowercase() == "plastic")
    {
        tips.push(REDUCE_PLASTIC);
    }
    if !packaging.is_empty() && !is_recyclable_packaging(&packaging) {
        tips.push(SWITCH_PACKAGING);
    }
    if submission.gwp > GWP_THRESHOLD {
        tips.push(REDUCE_EMBODIED_CARBON);
    }
    if submission.circularity < CIRCULARITY_THRESHOLD {
        tips.push(IMPROVE_CIRCULARITY);
    }

    let mut unique: Vec<String> = Vec::with_capacity(tips.len());
    for tip in tips {
        if !unique.iter().any(|existing| existing == tip) {
            unique.push(tip.to_string());
        }
    }
    unique.truncate(MAX_SUGGESTIONS);
    unique
}

pub(crate) fn normalized(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Expects text already lowercased.
pub(crate) fn is_recyclable_packaging(packaging: &str) -> bool {
    packaging.contains("recycl") || packaging.contains("biodegrad")
}
