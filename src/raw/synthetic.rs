//! Synthetic stand-in for the German Credit file, used when the dataset
//! cannot be fetched. Per-field distributions follow the published data.

use anyhow::{anyhow, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_distr::{LogNormal, Normal};
use tracing::info;

use super::RawRecord;

/// Weighted pick over a fixed set of values.
struct Choice<T: 'static> {
    values: &'static [T],
    dist: WeightedIndex<f64>,
}

impl<T: Clone> Choice<T> {
    fn new(values: &'static [T], weights: &[f64]) -> Result<Self> {
        let dist = WeightedIndex::new(weights).map_err(|e| anyhow!("invalid weights: {}", e))?;
        Ok(Self { values, dist })
    }

    fn uniform(values: &'static [T]) -> Result<Self> {
        Self::new(values, &vec![1.0; values.len()])
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.values[self.dist.sample(rng)].clone()
    }
}

const MEAN_AGE: f64 = 35.0;
const AGE_STD_DEV: f64 = 11.0;
const MIN_AGE: f64 = 19.0;
const MAX_AGE: f64 = 75.0;
const AMOUNT_LOG_MEAN: f64 = 7.8;
const AMOUNT_LOG_SIGMA: f64 = 0.7;

struct Generator {
    account_status: Choice<&'static str>,
    duration: Choice<i64>,
    credit_history: Choice<&'static str>,
    purpose: Choice<&'static str>,
    amount: LogNormal<f64>,
    savings: Choice<&'static str>,
    employment: Choice<&'static str>,
    installment_rate: Choice<i64>,
    personal_status: Choice<&'static str>,
    other_debtors: Choice<&'static str>,
    residence: Choice<i64>,
    property: Choice<&'static str>,
    age: Normal<f64>,
    other_plans: Choice<&'static str>,
    housing: Choice<&'static str>,
    existing_credits: Choice<i64>,
    job: Choice<&'static str>,
    dependents: Choice<i64>,
    telephone: Choice<&'static str>,
    foreign_worker: Choice<&'static str>,
    target: Choice<i64>,
}

impl Generator {
    fn new() -> Result<Self> {
        Ok(Self {
            account_status: Choice::new(&["A11", "A12", "A13", "A14"], &[0.27, 0.27, 0.06, 0.40])?,
            duration: Choice::uniform(&[6, 12, 18, 24, 36, 48, 60])?,
            credit_history: Choice::new(
                &["A30", "A31", "A32", "A33", "A34"],
                &[0.04, 0.05, 0.53, 0.09, 0.29],
            )?,
            purpose: Choice::new(
                &["A40", "A41", "A42", "A43", "A46", "A49"],
                &[0.23, 0.10, 0.18, 0.28, 0.05, 0.16],
            )?,
            amount: LogNormal::new(AMOUNT_LOG_MEAN, AMOUNT_LOG_SIGMA)
                .map_err(|e| anyhow!("amount distribution: {}", e))?,
            savings: Choice::new(
                &["A61", "A62", "A63", "A64", "A65"],
                &[0.60, 0.10, 0.06, 0.05, 0.19],
            )?,
            employment: Choice::new(
                &["A71", "A72", "A73", "A74", "A75"],
                &[0.06, 0.17, 0.34, 0.17, 0.26],
            )?,
            installment_rate: Choice::new(&[1, 2, 3, 4], &[0.20, 0.23, 0.25, 0.32])?,
            personal_status: Choice::new(&["A91", "A92", "A93", "A94"], &[0.05, 0.31, 0.55, 0.09])?,
            other_debtors: Choice::new(&["A101", "A102", "A103"], &[0.91, 0.04, 0.05])?,
            residence: Choice::new(&[1, 2, 3, 4], &[0.13, 0.31, 0.15, 0.41])?,
            property: Choice::new(
                &["A121", "A122", "A123", "A124"],
                &[0.28, 0.23, 0.33, 0.16],
            )?,
            age: Normal::new(MEAN_AGE, AGE_STD_DEV).map_err(|e| anyhow!("age distribution: {}", e))?,
            other_plans: Choice::new(&["A141", "A142", "A143"], &[0.14, 0.05, 0.81])?,
            housing: Choice::new(&["A151", "A152", "A153"], &[0.18, 0.71, 0.11])?,
            existing_credits: Choice::new(&[1, 2, 3, 4], &[0.63, 0.33, 0.03, 0.01])?,
            job: Choice::new(&["A171", "A172", "A173", "A174"], &[0.02, 0.20, 0.63, 0.15])?,
            dependents: Choice::new(&[1, 2], &[0.85, 0.15])?,
            telephone: Choice::new(&["A191", "A192"], &[0.60, 0.40])?,
            foreign_worker: Choice::new(&["A201", "A202"], &[0.04, 0.96])?,
            target: Choice::new(&[1, 2], &[0.70, 0.30])?,
        })
    }

    fn record<R: Rng + ?Sized>(&self, rng: &mut R) -> RawRecord {
        RawRecord {
            account_status: self.account_status.pick(rng).to_string(),
            duration_months: self.duration.pick(rng),
            credit_history: self.credit_history.pick(rng).to_string(),
            purpose: self.purpose.pick(rng).to_string(),
            amount: self.amount.sample(rng) as i64,
            savings: self.savings.pick(rng).to_string(),
            employment_since: self.employment.pick(rng).to_string(),
            installment_rate: self.installment_rate.pick(rng),
            personal_status_sex: self.personal_status.pick(rng).to_string(),
            other_debtors: self.other_debtors.pick(rng).to_string(),
            residence_since: self.residence.pick(rng),
            property: self.property.pick(rng).to_string(),
            age: self.age.sample(rng).clamp(MIN_AGE, MAX_AGE) as i64,
            other_installment_plans: self.other_plans.pick(rng).to_string(),
            housing: self.housing.pick(rng).to_string(),
            existing_credits: self.existing_credits.pick(rng),
            job: self.job.pick(rng).to_string(),
            dependents: self.dependents.pick(rng),
            telephone: self.telephone.pick(rng).to_string(),
            foreign_worker: self.foreign_worker.pick(rng).to_string(),
            target: self.target.pick(rng),
        }
    }
}

/// Draw `n` raw records from `rng`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Result<Vec<RawRecord>> {
    let generator = Generator::new()?;
    let records: Vec<RawRecord> = (0..n).map(|_| generator.record(rng)).collect();
    info!(records = records.len(), "generated synthetic dataset");
    Ok(records)
}
