//! Synthetic creditworthiness score on a FICO-like 300–850 scale.

use super::buckets::RATIO_POINTS;
use crate::decode::DecodedRecord;

pub const BASE_SCORE: f64 = 500.0;
pub const MIN_SCORE: i64 = 300;
pub const MAX_SCORE: i64 = 850;
pub const NOISE_STD_DEV: f64 = 30.0;

/// Points per decoded label; labels not listed contribute 0.
pub type Weights = &'static [(&'static str, f64)];

pub const CREDIT_HISTORY_POINTS: Weights = &[
    ("Sin créditos / todos pagados", 80.0),
    ("Todos créditos pagados en este banco", 60.0),
    ("Créditos existentes pagados puntualmente", 40.0),
    ("Retraso en pagos pasados", -50.0),
    ("Cuenta crítica / créditos en otros bancos", -80.0),
];

pub const ACCOUNT_STATUS_POINTS: Weights = &[
    (">= 200 DM (Buen balance)", 70.0),
    ("0 - 200 DM (Bajo balance)", 20.0),
    ("< 0 DM (Sobregiro)", -40.0),
    ("Sin cuenta corriente", -20.0),
];

pub const EMPLOYMENT_POINTS: Weights = &[
    (">= 7 años", 60.0),
    ("4 - 7 años", 40.0),
    ("1 - 4 años", 20.0),
    ("< 1 año", -10.0),
    ("Desempleado", -50.0),
];

pub const HOUSING_POINTS: Weights = &[("Propia", 50.0), ("Alquiler", 10.0), ("Gratuita", -10.0)];

fn points(weights: Weights, label: &str) -> f64 {
    weights
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, p)| *p)
        .unwrap_or(0.0)
}

/// Ratio term: `amount / (duration + 1)` mapped through [`RATIO_POINTS`].
/// Callers must have rejected non-positive durations.
pub fn ratio_points(amount: i64, duration_months: i64) -> f64 {
    let ratio = amount as f64 / (duration_months as f64 + 1.0);
    RATIO_POINTS.classify(ratio).unwrap_or(0.0)
}

/// Everything except the noise term.
pub fn deterministic_score(r: &DecodedRecord) -> f64 {
    BASE_SCORE
        + points(CREDIT_HISTORY_POINTS, &r.credit_history)
        + points(ACCOUNT_STATUS_POINTS, &r.account_status)
        + points(EMPLOYMENT_POINTS, &r.employment_since)
        + points(HOUSING_POINTS, &r.housing)
        + ratio_points(r.amount, r.duration_months)
}

/// Clamp to `[MIN_SCORE, MAX_SCORE]` and truncate.
pub fn finalize(raw: f64) -> i64 {
    raw.clamp(MIN_SCORE as f64, MAX_SCORE as f64) as i64
}
