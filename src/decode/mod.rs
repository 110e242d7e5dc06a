// src/decode/mod.rs
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

use crate::raw::RawRecord;

pub mod tables;

pub use tables::CategoricalField;

/// Binary loan outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskOutcome {
    Good,
    Bad,
}

impl RiskOutcome {
    pub const ALL: [RiskOutcome; 2] = [RiskOutcome::Good, RiskOutcome::Bad];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(RiskOutcome::Good),
            2 => Some(RiskOutcome::Bad),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskOutcome::Good => "Good",
            RiskOutcome::Bad => "Bad",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Two-way split on the decoded personal-status label.
    pub fn from_personal_status(label: &str) -> Self {
        if label.contains("Hombre") {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Masculino",
            Gender::Female => "Femenino",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    Unknown,
}

impl MaritalStatus {
    /// First match wins, so "Divorciada/Separada/Casada" is Married and
    /// "Casado/Viudo" is Married, never Widowed.
    pub fn from_personal_status(label: &str) -> Self {
        let has = |needles: &[&str]| needles.iter().any(|n| label.contains(n));
        if has(&["Soltero", "Soltera"]) {
            MaritalStatus::Single
        } else if has(&["Casado", "Casada"]) {
            MaritalStatus::Married
        } else if has(&["Divorciado", "Divorciada", "Separado"]) {
            MaritalStatus::Divorced
        } else if has(&["Viudo"]) {
            MaritalStatus::Widowed
        } else {
            MaritalStatus::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "Soltero/a",
            MaritalStatus::Married => "Casado/a",
            MaritalStatus::Divorced => "Divorciado/a",
            MaritalStatus::Widowed => "Viudo/a",
            MaritalStatus::Unknown => "Desconocido",
        }
    }
}

/// A raw record with every code replaced by its label (or kept as-is when
/// the code is unknown) and gender / marital status split out.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
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
    pub risk: RiskOutcome,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
}

/// A record dropped because its target was neither 1 nor 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedRecord {
    /// 1-based position in the input.
    pub position: usize,
    pub raw_target: i64,
}

/// Data-quality findings collected while decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    pub total: usize,
    /// Per field: how many values were found in its table.
    pub decoded: BTreeMap<CategoricalField, usize>,
    /// Per field: unknown code → occurrences (kept verbatim in the output).
    pub unmapped: BTreeMap<CategoricalField, BTreeMap<String, usize>>,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl DecodeReport {
    pub fn unmapped_count(&self, field: CategoricalField) -> usize {
        self.unmapped
            .get(&field)
            .map(|codes| codes.values().sum())
            .unwrap_or(0)
    }

    pub fn has_defects(&self) -> bool {
        !self.unmapped.is_empty() || !self.quarantined.is_empty()
    }
}

/// Output of the decoding stage.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub records: Vec<DecodedRecord>,
    pub report: DecodeReport,
}

struct FieldDecoder<'a> {
    report: &'a mut DecodeReport,
}

impl FieldDecoder<'_> {
    fn decode(&mut self, field: CategoricalField, code: String) -> String {
        match tables::lookup(field.table(), &code) {
            Some(label) => {
                *self.report.decoded.entry(field).or_default() += 1;
                label.to_string()
            }
            None => {
                *self
                    .report
                    .unmapped
                    .entry(field)
                    .or_default()
                    .entry(code.clone())
                    .or_default() += 1;
                code
            }
        }
    }
}

/// Decode every record. Unknown codes pass through unchanged; records with
/// an unknown target are quarantined. Neither aborts the run.
#[instrument(level = "info", skip_all, fields(records = raw.len()))]
pub fn decode_records(raw: Vec<RawRecord>) -> Decoded {
    let mut report = DecodeReport {
        total: raw.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for (idx, r) in raw.into_iter().enumerate() {
        let Some(risk) = RiskOutcome::from_code(r.target) else {
            warn!(position = idx + 1, target = r.target, "unknown target value; record quarantined");
            report.quarantined.push(QuarantinedRecord {
                position: idx + 1,
                raw_target: r.target,
            });
            continue;
        };

        let mut fd = FieldDecoder {
            report: &mut report,
        };
        let personal_status_sex = fd.decode(CategoricalField::PersonalStatusSex, r.personal_status_sex);
        records.push(DecodedRecord {
            account_status: fd.decode(CategoricalField::AccountStatus, r.account_status),
            duration_months: r.duration_months,
            credit_history: fd.decode(CategoricalField::CreditHistory, r.credit_history),
            purpose: fd.decode(CategoricalField::Purpose, r.purpose),
            amount: r.amount,
            savings: fd.decode(CategoricalField::Savings, r.savings),
            employment_since: fd.decode(CategoricalField::EmploymentSince, r.employment_since),
            installment_rate: r.installment_rate,
            other_debtors: fd.decode(CategoricalField::OtherDebtors, r.other_debtors),
            residence_since: r.residence_since,
            property: fd.decode(CategoricalField::Property, r.property),
            age: r.age,
            other_installment_plans: fd
                .decode(CategoricalField::OtherInstallmentPlans, r.other_installment_plans),
            housing: fd.decode(CategoricalField::Housing, r.housing),
            existing_credits: r.existing_credits,
            job: fd.decode(CategoricalField::Job, r.job),
            dependents: r.dependents,
            telephone: fd.decode(CategoricalField::Telephone, r.telephone),
            foreign_worker: fd.decode(CategoricalField::ForeignWorker, r.foreign_worker),
            risk,
            gender: Gender::from_personal_status(&personal_status_sex),
            marital_status: MaritalStatus::from_personal_status(&personal_status_sex),
            personal_status_sex,
        });
    }

    let kept = records.len();
    for field in CategoricalField::ALL {
        let n = report.decoded.get(&field).copied().unwrap_or(0);
        info!("{}: {}/{} values decoded", field.column(), n, kept);
    }
    if report.has_defects() {
        warn!(
            quarantined = report.quarantined.len(),
            unmapped_fields = report.unmapped.len(),
            "decoding finished with data-quality defects"
        );
    }

    Decoded { records, report }
}
