use super::super::domain::Rating;

const SCORE_FLOOR: f64 = 0.0;
const SCORE_CEILING: f64 = 100.0;

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// Lower GWP maps to a higher sub-score; anything at or above `gwp_max` scores 0.
pub fn normalize_gwp(gwp: f64, gwp_max: f64) -> f64 {
    lower_is_better(gwp, gwp_max)
}

/// Same shape as [`normalize_gwp`], against the cost ceiling.
pub fn normalize_cost(cost: f64, cost_max: f64) -> f64 {
    lower_is_better(cost, cost_max)
}

pub fn normalize_circularity(circularity: f64) -> f64 {
    clamp_score(circularity)
}

fn lower_is_better(value: f64, ceiling: f64) -> f64 {
    if ceiling <= 0.0 {
        return 0.0;
    }
    clamp_score(100.0 * (1.0 - value / ceiling).max(0.0))
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn rating_from_score(score: f64) -> Rating {
    if score >= 85.0 {
        Rating::A
    } else if score >= 70.0 {
        Rating::B
    } else if score >= 55.0 {
        Rating::C
    } else {
        Rating::D
    }
}
