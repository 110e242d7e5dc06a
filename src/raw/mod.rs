// src/raw/mod.rs
use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};
use tracing::{debug, instrument};

pub mod synthetic;

/// Tokens per input line: 20 attributes followed by the target.
pub const FIELD_COUNT: usize = 21;

/// Column names of the input file, in positional order.
pub const COLUMN_NAMES: [&str; FIELD_COUNT] = [
    "Status_Cuenta",
    "Duracion_Meses",
    "Historial_Crediticio",
    "Proposito",
    "Monto_Credito",
    "Cuenta_Ahorro",
    "Empleo_Desde",
    "Tasa_Cuota",
    "Estado_Personal_Sexo",
    "Otros_Deudores",
    "Residencia_Desde",
    "Propiedad",
    "Edad",
    "Otros_Planes_Cuota",
    "Vivienda",
    "Creditos_Existentes",
    "Trabajo",
    "Personas_Dependientes",
    "Telefono",
    "Extranjero",
    "Riesgo",
];

/// One loan application exactly as it appears in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub account_status: String,
    pub duration_months: i64,
    pub credit_history: String,
    pub purpose: String,
    pub amount: i64,
    pub savings: String,
    pub employment_since: String,
    pub installment_rate: i64,
    pub personal_status_sex: String,
    pub other_debtors: String,
    pub residence_since: i64,
    pub property: String,
    pub age: i64,
    pub other_installment_plans: String,
    pub housing: String,
    pub existing_credits: i64,
    pub job: String,
    pub dependents: i64,
    pub telephone: String,
    pub foreign_worker: String,
    /// 1 = Good, 2 = Bad; anything else is a data-quality defect.
    pub target: i64,
}

fn int_field(tokens: &[&str], idx: usize) -> Result<i64> {
    tokens[idx]
        .parse()
        .map_err(|_| anyhow!("{} is not an integer: {:?}", COLUMN_NAMES[idx], tokens[idx]))
}

impl RawRecord {
    /// Parse one whitespace-delimited line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let t: Vec<&str> = line.split_whitespace().collect();
        if t.len() != FIELD_COUNT {
            bail!("expected {} fields, found {}", FIELD_COUNT, t.len());
        }
        Ok(Self {
            account_status: t[0].to_string(),
            duration_months: int_field(&t, 1)?,
            credit_history: t[2].to_string(),
            purpose: t[3].to_string(),
            amount: int_field(&t, 4)?,
            savings: t[5].to_string(),
            employment_since: t[6].to_string(),
            installment_rate: int_field(&t, 7)?,
            personal_status_sex: t[8].to_string(),
            other_debtors: t[9].to_string(),
            residence_since: int_field(&t, 10)?,
            property: t[11].to_string(),
            age: int_field(&t, 12)?,
            other_installment_plans: t[13].to_string(),
            housing: t[14].to_string(),
            existing_credits: int_field(&t, 15)?,
            job: t[16].to_string(),
            dependents: int_field(&t, 17)?,
            telephone: t[18].to_string(),
            foreign_worker: t[19].to_string(),
            target: int_field(&t, 20)?,
        })
    }
}

/// Parse every non-blank line of `text`. A malformed line aborts the parse
/// with its 1-based line number.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            RawRecord::parse_line(line).with_context(|| format!("line {}", idx + 1))
        })
        .collect()
}

#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_file(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading raw dataset {}", path.display()))?;
    let records =
        parse_records(&text).with_context(|| format!("parsing raw dataset {}", path.display()))?;
    debug!(records = records.len(), "parsed raw dataset");
    Ok(records)
}

/// First line of the published dataset; shared by the unit tests.
#[cfg(test)]
pub(crate) const FIRST_LINE: &str =
    "A11 6 A34 A43 1169 A65 A75 4 A93 A101 4 A121 67 A143 A152 2 A173 1 A192 A201 1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_line() -> Result<()> {
        let r = RawRecord::parse_line(FIRST_LINE)?;
        assert_eq!(r.account_status, "A11");
        assert_eq!(r.duration_months, 6);
        assert_eq!(r.purpose, "A43");
        assert_eq!(r.amount, 1169);
        assert_eq!(r.personal_status_sex, "A93");
        assert_eq!(r.age, 67);
        assert_eq!(r.dependents, 1);
        assert_eq!(r.foreign_worker, "A201");
        assert_eq!(r.target, 1);
        Ok(())
    }

    #[test]
    fn skips_blank_lines_and_tolerates_extra_spaces() -> Result<()> {
        let text = format!("\n{}\n   \n{}  \n", FIRST_LINE, FIRST_LINE.replace(' ', "   "));
        let records = parse_records(&text)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
        Ok(())
    }

    #[test]
    fn short_line_reports_line_number() {
        let text = format!("{}\nA11 6 A34\n", FIRST_LINE);
        let err = parse_records(&text).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 2"), "{}", msg);
        assert!(msg.contains("expected 21 fields"), "{}", msg);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let line = FIRST_LINE.replace("1169", "lots");
        let err = RawRecord::parse_line(&line).unwrap_err();
        assert!(err.to_string().contains("Monto_Credito"));
    }
}
