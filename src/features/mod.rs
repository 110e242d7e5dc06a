// src/features/mod.rs
use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use rand::prelude::*;
use rand_distr::Normal;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::decode::DecodedRecord;

pub mod buckets;
pub mod calendar;
pub mod score;

pub use calendar::CalendarFields;

/// A decoded record plus every derived analytical field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub base: DecodedRecord,
    pub age_bucket: Option<&'static str>,
    pub score: i64,
    pub score_category: Option<&'static str>,
    pub monthly_installment: f64,
    pub amount_bucket: Option<&'static str>,
    pub request_date: NaiveDate,
    pub calendar: CalendarFields,
}

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `amount / duration` rounded to cents.
pub fn monthly_installment(amount: i64, duration_months: i64) -> Result<f64> {
    if duration_months <= 0 {
        bail!("Duracion_Meses must be at least 1, got {}", duration_months);
    }
    Ok(round2(amount as f64 / duration_months as f64))
}

/// Derive features for every record.
///
/// Randomness is drawn from `rng` in a fixed order: one score-noise sample
/// per record, then one request date per record. Any record with a
/// non-positive duration aborts the stage before anything is drawn.
#[instrument(level = "info", skip_all, fields(records = records.len()))]
pub fn enrich<R: Rng + ?Sized>(
    records: Vec<DecodedRecord>,
    rng: &mut R,
) -> Result<Vec<EnrichedRecord>> {
    if let Some((idx, r)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.duration_months <= 0)
    {
        bail!(
            "record {}: Duracion_Meses must be at least 1, got {}",
            idx + 1,
            r.duration_months
        );
    }

    let noise = Normal::new(0.0, score::NOISE_STD_DEV)
        .map_err(|e| anyhow!("score noise distribution: {}", e))?;
    let noises: Vec<f64> = (0..records.len()).map(|_| noise.sample(rng)).collect();
    let dates: Vec<NaiveDate> = (0..records.len())
        .map(|_| calendar::draw_date(rng))
        .collect();

    let enriched = records
        .into_iter()
        .zip(noises)
        .zip(dates)
        .map(|((base, noise), date)| {
            let score = score::finalize(score::deterministic_score(&base) + noise);
            Ok(EnrichedRecord {
                age_bucket: buckets::AGE_BUCKETS.classify(base.age as f64),
                score,
                score_category: buckets::SCORE_CATEGORIES.classify(score as f64),
                monthly_installment: monthly_installment(base.amount, base.duration_months)?,
                amount_bucket: buckets::AMOUNT_BUCKETS.classify(base.amount as f64),
                request_date: date,
                calendar: CalendarFields::of(date),
                base,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log_summary(&enriched);
    Ok(enriched)
}

fn log_summary(records: &[EnrichedRecord]) {
    if records.is_empty() {
        return;
    }
    let min = records.iter().map(|r| r.score).min().unwrap_or_default();
    let max = records.iter().map(|r| r.score).max().unwrap_or_default();
    let mean = records.iter().map(|r| r.score as f64).sum::<f64>() / records.len() as f64;
    info!(min, max, mean = %format!("{:.0}", mean), "Score_Cliente computed");

    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for r in records {
        *by_year.entry(r.calendar.year).or_default() += 1;
    }
    info!(?by_year, "synthetic request dates assigned");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_records;
    use crate::raw::{synthetic, RawRecord, FIRST_LINE};
    use rand::rngs::StdRng;

    fn decoded_sample(n: usize, seed: u64) -> Result<Vec<DecodedRecord>> {
        let raw = synthetic::generate(&mut StdRng::seed_from_u64(seed), n)?;
        Ok(decode_records(raw).records)
    }

    #[test]
    fn installment_of_reference_record() -> Result<()> {
        assert_eq!(monthly_installment(1169, 6)?, 194.83);
        assert_eq!(monthly_installment(5951, 48)?, 123.98);
        assert_eq!(monthly_installment(100, 3)?, 33.33);
        Ok(())
    }

    #[test]
    fn reference_record_features() -> Result<()> {
        let decoded = decode_records(vec![RawRecord::parse_line(FIRST_LINE)?]).records;
        let enriched = enrich(decoded, &mut StdRng::seed_from_u64(42))?;
        let r = &enriched[0];

        assert_eq!(r.age_bucket, Some("50+ (Senior)"));
        assert_eq!(r.amount_bucket, Some("Pequeño (1K-3K)"));
        assert_eq!(r.monthly_installment, 194.83);
        // 500 - 80 - 40 + 60 + 50 + 20 = 510, noise within a few sigma
        assert!((300..=850).contains(&r.score));
        assert!((r.score - 510).abs() <= 6 * 30, "score {}", r.score);
        assert_eq!(
            r.score_category,
            buckets::SCORE_CATEGORIES.classify(r.score as f64)
        );
        Ok(())
    }

    #[test]
    fn scores_always_in_range() -> Result<()> {
        let enriched = enrich(decoded_sample(2_000, 3)?, &mut StdRng::seed_from_u64(3))?;
        for r in &enriched {
            assert!((300..=850).contains(&r.score), "{}", r.score);
            assert!(r.score_category.is_some());
            assert!(r.age_bucket.is_some());
            assert_eq!(r.calendar, CalendarFields::of(r.request_date));
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_output() -> Result<()> {
        let a = enrich(decoded_sample(200, 9)?, &mut StdRng::seed_from_u64(1))?;
        let b = enrich(decoded_sample(200, 9)?, &mut StdRng::seed_from_u64(1))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn zero_duration_is_rejected() -> Result<()> {
        let mut decoded = decode_records(vec![
            RawRecord::parse_line(FIRST_LINE)?,
            RawRecord::parse_line(FIRST_LINE)?,
        ])
        .records;
        decoded[1].duration_months = 0;

        let err = enrich(decoded, &mut StdRng::seed_from_u64(42)).unwrap_err();
        assert!(err.to_string().contains("record 2"), "{}", err);
        assert!(monthly_installment(10, 0).is_err());
        Ok(())
    }

    #[test]
    fn extreme_duration_is_scored_without_overflow() -> Result<()> {
        let line = FIRST_LINE.replacen(" 6 ", &format!(" {} ", i64::MAX), 1);
        let decoded = decode_records(vec![RawRecord::parse_line(&line)?]).records;
        assert_eq!(decoded[0].duration_months, i64::MAX);

        let enriched = enrich(decoded, &mut StdRng::seed_from_u64(42))?;
        let r = &enriched[0];
        assert!((300..=850).contains(&r.score), "{}", r.score);
        assert_eq!(r.monthly_installment, 0.0);
        assert_eq!(score::ratio_points(1169, i64::MAX), 50.0);
        Ok(())
    }
}
