// src/quality/mod.rs
use anyhow::Result;
use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::fmt;
use tracing::instrument;

use crate::decode::{DecodeReport, RiskOutcome};
use crate::export::record_batch;
use crate::features::round2;
use crate::star::{StarSchema, Table};

/// Default rate of one group of loans.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRate {
    pub label: String,
    pub total: usize,
    pub bad: usize,
    /// Percentage, rounded to one decimal.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub total_loans: usize,
    pub good: usize,
    pub bad: usize,
    pub good_pct: f64,
    pub bad_pct: f64,
    pub default_rate: f64,
    /// Widened so that sums of `i64` amounts cannot overflow.
    pub total_amount: i128,
    pub mean_amount: f64,
    pub amount_at_risk: i128,
    pub mean_score: f64,
    /// Null or empty cells per table.
    pub missing_values: Vec<(Table, usize)>,
    pub by_purpose: Vec<SegmentRate>,
    pub by_age_bucket: Vec<SegmentRate>,
    pub defects: DecodeReport,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Nulls plus empty strings over every column.
pub fn missing_cells(batch: &RecordBatch) -> usize {
    batch
        .columns()
        .iter()
        .map(|col| {
            let empty = col
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|s| s.iter().filter(|v| v == &Some("")).count())
                .unwrap_or(0);
            col.null_count() + empty
        })
        .sum()
}

fn segment_rates<'a>(rows: impl Iterator<Item = (&'a str, RiskOutcome)>) -> Vec<SegmentRate> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (label, risk) in rows {
        let g = groups.entry(label).or_default();
        g.0 += 1;
        if risk == RiskOutcome::Bad {
            g.1 += 1;
        }
    }
    let mut rates: Vec<SegmentRate> = groups
        .into_iter()
        .map(|(label, (total, bad))| SegmentRate {
            label: label.to_string(),
            total,
            bad,
            rate: round1(pct(bad, total)),
        })
        .collect();
    // BTreeMap order already sorts labels; a stable sort keeps it for ties
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rates
}

/// Summarise the finished tables and the decoding defects.
#[instrument(level = "info", skip_all)]
pub fn build_report(schema: &StarSchema, defects: &DecodeReport) -> Result<QualityReport> {
    let facts = &schema.facts;
    let total_loans = facts.len();
    let bad = facts.iter().filter(|f| f.risk == RiskOutcome::Bad).count();
    let good = facts.iter().filter(|f| f.risk == RiskOutcome::Good).count();
    let total_amount: i128 = facts.iter().map(|f| f.amount as i128).sum();
    let amount_at_risk: i128 = facts
        .iter()
        .filter(|f| f.risk == RiskOutcome::Bad)
        .map(|f| f.amount as i128)
        .sum();
    let (mean_amount, mean_score) = if total_loans == 0 {
        (0.0, 0.0)
    } else {
        let n = total_loans as f64;
        (
            total_amount as f64 / n,
            facts.iter().map(|f| f.score as f64).sum::<f64>() / n,
        )
    };

    let missing_values = Table::ALL
        .iter()
        .map(|&t| record_batch(schema, t).map(|batch| (t, missing_cells(&batch))))
        .collect::<Result<Vec<_>>>()?;

    let flat = || schema.flat.iter().map(|r| &r.record);
    let by_purpose = segment_rates(flat().map(|r| (r.base.purpose.as_str(), r.base.risk)));
    // records outside every age bucket have no group
    let by_age_bucket = segment_rates(flat().filter_map(|r| r.age_bucket.map(|b| (b, r.base.risk))));

    Ok(QualityReport {
        total_loans,
        good,
        bad,
        good_pct: round2(pct(good, total_loans)),
        bad_pct: round2(pct(bad, total_loans)),
        default_rate: round2(pct(bad, total_loans)),
        total_amount,
        mean_amount,
        amount_at_risk,
        mean_score,
        missing_values,
        by_purpose,
        by_age_bucket,
        defects: defects.clone(),
    })
}

fn write_segments(f: &mut fmt::Formatter<'_>, title: &str, rows: &[SegmentRate]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "   {}:", title)?;
    for s in rows {
        let bar = "█".repeat((s.rate / 2.0) as usize);
        writeln!(f, "      {:30} {:5.1}% {}", s.label, s.rate, bar)?;
    }
    Ok(())
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(70);
        writeln!(f, "{}", rule)?;
        writeln!(f, "REPORTE DE CALIDAD DE DATOS")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "   Total Préstamos:         {}", self.total_loans)?;
        writeln!(f, "   Buenos (Good):           {} ({:.1}%)", self.good, self.good_pct)?;
        writeln!(f, "   Malos  (Bad):            {} ({:.1}%)", self.bad, self.bad_pct)?;
        writeln!(f, "   Tasa de Morosidad:       {:.1}%", self.default_rate)?;
        writeln!(f, "   Monto Total Prestado:    {} DM", self.total_amount)?;
        writeln!(f, "   Monto en Riesgo:         {} DM", self.amount_at_risk)?;
        writeln!(f, "   Monto Promedio:          {:.0} DM", self.mean_amount)?;
        writeln!(f, "   Score Promedio:          {:.0}", self.mean_score)?;

        writeln!(f)?;
        for (table, n) in &self.missing_values {
            writeln!(f, "   Valores nulos en {:16} {}", format!("{}:", table.name()), n)?;
        }

        write_segments(f, "Tasa de Morosidad por Propósito", &self.by_purpose)?;
        write_segments(f, "Tasa de Morosidad por Rango de Edad", &self.by_age_bucket)?;

        writeln!(f)?;
        if self.defects.has_defects() {
            writeln!(f, "   Defectos de decodificación:")?;
            for (field, codes) in &self.defects.unmapped {
                let listed: Vec<String> =
                    codes.iter().map(|(code, n)| format!("{}×{}", code, n)).collect();
                writeln!(f, "      {:24} sin mapear: {}", field.column(), listed.join(", "))?;
            }
            for q in &self.defects.quarantined {
                writeln!(
                    f,
                    "      registro {:5} Riesgo={} en cuarentena",
                    q.position, q.raw_target
                )?;
            }
        } else {
            writeln!(f, "   Sin defectos de decodificación")?;
        }
        write!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_records, CategoricalField};
    use crate::features::enrich;
    use crate::raw::{RawRecord, FIRST_LINE};
    use crate::star::build_star_schema;
    use rand::{rngs::StdRng, SeedableRng};

    fn line(purpose: &str, amount: i64, age: i64, target: i64) -> String {
        FIRST_LINE
            .replace(" A43 ", &format!(" {} ", purpose))
            .replace(" 1169 ", &format!(" {} ", amount))
            .replace(" 67 ", &format!(" {} ", age))
            .trim_end_matches('1')
            .to_string()
            + &target.to_string()
    }

    fn report_for(lines: &[String]) -> Result<QualityReport> {
        let raw = lines
            .iter()
            .map(|l| RawRecord::parse_line(l))
            .collect::<Result<Vec<_>>>()?;
        let decoded = decode_records(raw);
        let enriched = enrich(decoded.records, &mut StdRng::seed_from_u64(42))?;
        build_report(&build_star_schema(enriched)?, &decoded.report)
    }

    #[test]
    fn headline_figures() -> Result<()> {
        let report = report_for(&[
            line("A43", 1000, 30, 1),
            line("A43", 2000, 30, 2),
            line("A49", 3000, 60, 1),
            line("A49", 4000, 60, 2),
            line("A49", 5000, 60, 2),
        ])?;
        assert_eq!((report.total_loans, report.good, report.bad), (5, 2, 3));
        assert_eq!(report.default_rate, 60.0);
        assert_eq!(report.good_pct, 40.0);
        assert_eq!(report.total_amount, 15_000);
        assert_eq!(report.amount_at_risk, 11_000);
        assert_eq!(report.mean_amount, 3_000.0);
        assert!(report.missing_values.iter().all(|(_, n)| *n == 0));
        assert_eq!(report.missing_values.len(), 6);
        Ok(())
    }

    #[test]
    fn segments_sorted_by_rate_then_label() -> Result<()> {
        let report = report_for(&[
            line("A43", 1000, 30, 1),
            line("A43", 1000, 30, 2),
            line("A49", 1000, 60, 2),
            line("A40", 1000, 60, 2),
            line("A46", 1000, 20, 1),
        ])?;
        let labels: Vec<&str> = report.by_purpose.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Auto (Nuevo)", "Negocio", "Radio/Televisión", "Educación"]
        );
        assert_eq!(report.by_purpose[2].rate, 50.0);
        assert_eq!(report.by_purpose[3].rate, 0.0);

        let ages: Vec<(&str, f64)> = report
            .by_age_bucket
            .iter()
            .map(|s| (s.label.as_str(), s.rate))
            .collect();
        assert_eq!(
            ages,
            vec![
                ("50+ (Senior)", 100.0),
                ("26-35 (Adulto Joven)", 50.0),
                ("18-25 (Joven)", 0.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn rates_round_to_one_decimal() -> Result<()> {
        let report = report_for(&[
            line("A43", 1000, 30, 2),
            line("A43", 1000, 30, 1),
            line("A43", 1000, 30, 1),
        ])?;
        assert_eq!(report.by_purpose[0].rate, 33.3);
        assert_eq!(report.default_rate, 33.33);
        Ok(())
    }

    #[test]
    fn empty_input_gives_zero_rates() -> Result<()> {
        let report = build_report(&build_star_schema(Vec::new())?, &DecodeReport::default())?;
        assert_eq!(report.total_loans, 0);
        assert_eq!(report.default_rate, 0.0);
        assert_eq!(report.mean_amount, 0.0);
        assert_eq!(report.mean_score, 0.0);
        assert!(report.by_purpose.is_empty());
        assert!(report.to_string().contains("Total Préstamos:         0"));
        Ok(())
    }

    #[test]
    fn defects_are_listed() -> Result<()> {
        let report = report_for(&[
            line("A43", 1000, 30, 1),
            line("A43", 1000, 30, 7),
            FIRST_LINE.replace("A11", "A19"),
        ])?;
        assert_eq!(report.total_loans, 2);
        assert_eq!(report.defects.quarantined.len(), 1);
        assert_eq!(report.defects.unmapped_count(CategoricalField::AccountStatus), 1);

        let text = report.to_string();
        assert!(text.contains("A19×1"), "{}", text);
        assert!(text.contains("Riesgo=7 en cuarentena"), "{}", text);
        // pass-through code stays in the tables, not as a null
        assert!(report.missing_values.iter().all(|(_, n)| *n == 0));
        Ok(())
    }

    #[test]
    fn totals_of_extreme_amounts_do_not_overflow() -> Result<()> {
        let max = i64::MAX;
        let report = report_for(&[line("A43", max, 30, 2), line("A43", max, 30, 2)])?;
        assert_eq!(report.total_amount, 2 * max as i128);
        assert_eq!(report.amount_at_risk, 2 * max as i128);
        assert_eq!(report.mean_amount, max as f64);
        assert!(report.to_string().contains(&format!("{} DM", 2 * max as i128)));
        Ok(())
    }

    #[test]
    fn bars_are_half_the_rate() -> Result<()> {
        let report = report_for(&[line("A49", 1000, 30, 2)])?;
        let text = report.to_string();
        assert!(text.contains(&format!("100.0% {}", "█".repeat(50))), "{}", text);
        Ok(())
    }
}
