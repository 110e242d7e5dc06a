// src/star/mod.rs
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::decode::{Gender, MaritalStatus, RiskOutcome};
use crate::features::{CalendarFields, EnrichedRecord};

pub mod integrity;
pub mod keys;

pub use integrity::check_integrity;
use keys::{DateKeys, FirstAppearanceKeys};

/// First customer surrogate key; loan `n` (1-based) gets `n + 1000`.
pub const FIRST_CUSTOMER_ID: i64 = 1001;

/// The six output tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Fact,
    Customer,
    Purpose,
    Time,
    Risk,
    Flat,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Fact,
        Table::Customer,
        Table::Purpose,
        Table::Time,
        Table::Risk,
        Table::Flat,
    ];

    /// Export name, also the file stem.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Fact => "Fact_Prestamos",
            Table::Customer => "Dim_Cliente",
            Table::Purpose => "Dim_Proposito",
            Table::Time => "Dim_Tiempo",
            Table::Risk => "Dim_Riesgo",
            Table::Flat => "Tabla_Completa",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub loan_id: i64,
    pub customer_id: i64,
    pub purpose_id: i64,
    pub time_id: i64,
    pub amount: i64,
    pub duration: i64,
    pub rate: i64,
    pub monthly_installment: f64,
    pub existing_credits: i64,
    pub score: i64,
    pub risk: RiskOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub customer_id: i64,
    pub age: i64,
    pub age_bucket: Option<&'static str>,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub job: String,
    pub employment_since: String,
    pub housing: String,
    pub property: String,
    pub account_status: String,
    pub savings: String,
    pub credit_history: String,
    pub telephone: String,
    pub foreign_worker: String,
    pub dependents: i64,
    pub other_debtors: String,
    pub other_installment_plans: String,
    pub score_category: Option<&'static str>,
    pub amount_bucket: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurposeRow {
    pub purpose_id: i64,
    pub purpose: String,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub time_id: i64,
    pub date: NaiveDate,
    pub calendar: CalendarFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskRow {
    pub risk_id: i64,
    pub outcome: RiskOutcome,
    pub description: &'static str,
    pub label_es: &'static str,
    pub color_hex: &'static str,
}

/// One row of the denormalised convenience table.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub loan_id: i64,
    pub record: EnrichedRecord,
}

/// Fact table, dimensions and flat table of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub facts: Vec<FactRow>,
    pub customers: Vec<CustomerRow>,
    pub purposes: Vec<PurposeRow>,
    pub times: Vec<TimeRow>,
    pub risks: Vec<RiskRow>,
    pub flat: Vec<FlatRow>,
}

impl StarSchema {
    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::Fact => self.facts.len(),
            Table::Customer => self.customers.len(),
            Table::Purpose => self.purposes.len(),
            Table::Time => self.times.len(),
            Table::Risk => self.risks.len(),
            Table::Flat => self.flat.len(),
        }
    }
}

/// Broader grouping of a decoded purpose label.
pub fn purpose_category(purpose: &str) -> &'static str {
    match purpose {
        "Auto (Nuevo)" | "Auto (Usado)" => "Vehículos",
        "Muebles/Equipamiento" | "Radio/Televisión" | "Electrodomésticos" | "Reparaciones" => {
            "Hogar"
        }
        "Educación" | "Vacaciones" | "Recapacitación" => "Personal",
        "Negocio" => "Negocio",
        _ => "Otros",
    }
}

/// The fixed two-row risk lookup.
pub fn risk_dimension() -> Vec<RiskRow> {
    RiskOutcome::ALL
        .iter()
        .enumerate()
        .map(|(i, &outcome)| {
            let (description, label_es, color_hex) = match outcome {
                RiskOutcome::Good => ("Crédito pagado correctamente", "Bueno", "#2ECC71"),
                RiskOutcome::Bad => ("Crédito en mora / impago", "Malo", "#E74C3C"),
            };
            RiskRow {
                risk_id: i as i64 + 1,
                outcome,
                description,
                label_es,
                color_hex,
            }
        })
        .collect()
}

fn customer_row(customer_id: i64, r: &EnrichedRecord) -> CustomerRow {
    let b = &r.base;
    CustomerRow {
        customer_id,
        age: b.age,
        age_bucket: r.age_bucket,
        gender: b.gender,
        marital_status: b.marital_status,
        job: b.job.clone(),
        employment_since: b.employment_since.clone(),
        housing: b.housing.clone(),
        property: b.property.clone(),
        account_status: b.account_status.clone(),
        savings: b.savings.clone(),
        credit_history: b.credit_history.clone(),
        telephone: b.telephone.clone(),
        foreign_worker: b.foreign_worker.clone(),
        dependents: b.dependents,
        other_debtors: b.other_debtors.clone(),
        other_installment_plans: b.other_installment_plans.clone(),
        score_category: r.score_category,
        amount_bucket: r.amount_bucket,
    }
}

/// Reshape the enriched records into the star schema.
#[instrument(level = "info", skip_all, fields(records = records.len()))]
pub fn build_star_schema(records: Vec<EnrichedRecord>) -> Result<StarSchema> {
    let purpose_keys = FirstAppearanceKeys::build(records.iter().map(|r| r.base.purpose.as_str()));
    let date_keys = DateKeys::build(records.iter().map(|r| r.request_date));

    let mut facts = Vec::with_capacity(records.len());
    let mut customers = Vec::with_capacity(records.len());
    for (idx, r) in records.iter().enumerate() {
        let loan_id = idx as i64 + 1;
        let customer_id = FIRST_CUSTOMER_ID + idx as i64;
        let purpose_id = purpose_keys
            .id(&r.base.purpose)
            .ok_or_else(|| anyhow!("no purpose key for {:?}", r.base.purpose))?;
        let time_id = date_keys
            .id(r.request_date)
            .ok_or_else(|| anyhow!("no time key for {}", r.request_date))?;

        facts.push(FactRow {
            loan_id,
            customer_id,
            purpose_id,
            time_id,
            amount: r.base.amount,
            duration: r.base.duration_months,
            rate: r.base.installment_rate,
            monthly_installment: r.monthly_installment,
            existing_credits: r.base.existing_credits,
            score: r.score,
            risk: r.base.risk,
        });
        customers.push(customer_row(customer_id, r));
    }

    let purposes: Vec<PurposeRow> = purpose_keys
        .entries()
        .map(|(purpose_id, purpose)| PurposeRow {
            purpose_id,
            purpose: purpose.to_string(),
            category: purpose_category(purpose),
        })
        .collect();

    let times: Vec<TimeRow> = date_keys
        .entries()
        .map(|(time_id, date)| TimeRow {
            time_id,
            date,
            calendar: CalendarFields::of(date),
        })
        .collect();

    let flat: Vec<FlatRow> = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| FlatRow {
            loan_id: idx as i64 + 1,
            record,
        })
        .collect();

    let schema = StarSchema {
        facts,
        customers,
        purposes,
        times,
        risks: risk_dimension(),
        flat,
    };
    for table in Table::ALL {
        info!("{}: {} rows", table.name(), schema.row_count(table));
    }
    Ok(schema)
}
