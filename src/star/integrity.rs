use anyhow::{bail, Result};
use std::collections::HashSet;
use std::hash::Hash;

use super::StarSchema;

fn distinct_keys<K: Eq + Hash + Copy>(
    table: &str,
    keys: impl Iterator<Item = K>,
) -> Result<HashSet<K>>
where
    K: std::fmt::Debug,
{
    let mut seen = HashSet::new();
    for k in keys {
        if !seen.insert(k) {
            bail!("{}: duplicate key {:?}", table, k);
        }
    }
    Ok(seen)
}

/// Verify that every dimension key is unique and that every fact foreign
/// key resolves to exactly one dimension row.
pub fn check_integrity(schema: &StarSchema) -> Result<()> {
    distinct_keys("Fact_Prestamos", schema.facts.iter().map(|f| f.loan_id))?;
    let customers = distinct_keys("Dim_Cliente", schema.customers.iter().map(|c| c.customer_id))?;
    let purposes = distinct_keys("Dim_Proposito", schema.purposes.iter().map(|p| p.purpose_id))?;
    let times = distinct_keys("Dim_Tiempo", schema.times.iter().map(|t| t.time_id))?;
    let risks = distinct_keys("Dim_Riesgo", schema.risks.iter().map(|r| r.outcome))?;
    distinct_keys("Dim_Riesgo", schema.risks.iter().map(|r| r.risk_id))?;

    for f in &schema.facts {
        if !customers.contains(&f.customer_id) {
            bail!("loan {}: ID_Cliente {} not in Dim_Cliente", f.loan_id, f.customer_id);
        }
        if !purposes.contains(&f.purpose_id) {
            bail!("loan {}: ID_Proposito {} not in Dim_Proposito", f.loan_id, f.purpose_id);
        }
        if !times.contains(&f.time_id) {
            bail!("loan {}: ID_Tiempo {} not in Dim_Tiempo", f.loan_id, f.time_id);
        }
        if !risks.contains(&f.risk) {
            bail!("loan {}: Estado_Riesgo {} not in Dim_Riesgo", f.loan_id, f.risk.as_str());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_records;
    use crate::features::enrich;
    use crate::raw::synthetic;
    use crate::star::build_star_schema;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> Result<StarSchema> {
        let mut rng = StdRng::seed_from_u64(11);
        let raw = synthetic::generate(&mut rng, 300)?;
        build_star_schema(enrich(decode_records(raw).records, &mut rng)?)
    }

    #[test]
    fn built_schema_is_consistent() -> Result<()> {
        check_integrity(&sample()?)
    }

    #[test]
    fn dangling_purpose_is_detected() -> Result<()> {
        let mut schema = sample()?;
        schema.facts[10].purpose_id = 999;
        let err = check_integrity(&schema).unwrap_err();
        assert!(err.to_string().contains("ID_Proposito 999"), "{}", err);
        Ok(())
    }

    #[test]
    fn duplicate_time_key_is_detected() -> Result<()> {
        let mut schema = sample()?;
        let first = schema.times[0].clone();
        schema.times.push(first);
        let err = check_integrity(&schema).unwrap_err();
        assert!(err.to_string().contains("Dim_Tiempo: duplicate key"), "{}", err);
        Ok(())
    }

    #[test]
    fn missing_risk_row_is_detected() -> Result<()> {
        let mut schema = sample()?;
        schema.risks.retain(|r| r.risk_id == 1);
        assert!(schema.facts.iter().any(|f| f.risk.as_str() == "Bad"));
        assert!(check_integrity(&schema).is_err());
        Ok(())
    }
}
