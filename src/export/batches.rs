// src/export/batches.rs
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::star::{StarSchema, Table};

/// Column-by-column builder for one output table.
#[derive(Default)]
struct Columns {
    fields: Vec<Field>,
    arrays: Vec<ArrayRef>,
}

impl Columns {
    fn push(mut self, field: Field, array: ArrayRef) -> Self {
        self.fields.push(field);
        self.arrays.push(array);
        self
    }

    fn int(self, name: &str, values: impl IntoIterator<Item = i64>) -> Self {
        let array = Int64Array::from_iter_values(values);
        self.push(Field::new(name, DataType::Int64, false), Arc::new(array))
    }

    fn float(self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        let array = Float64Array::from_iter_values(values);
        self.push(Field::new(name, DataType::Float64, false), Arc::new(array))
    }

    fn text<'a>(self, name: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let array = StringArray::from_iter_values(values);
        self.push(Field::new(name, DataType::Utf8, false), Arc::new(array))
    }

    /// Labels from bucket tables; out-of-range values stay null.
    fn opt_text<'a>(self, name: &str, values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let array: StringArray = values.into_iter().collect();
        self.push(Field::new(name, DataType::Utf8, true), Arc::new(array))
    }

    fn date(self, name: &str, values: impl IntoIterator<Item = NaiveDate>) -> Self {
        let array = Date32Array::from_iter_values(values.into_iter().map(Date32Type::from_naive_date));
        self.push(Field::new(name, DataType::Date32, false), Arc::new(array))
    }

    fn finish(self, table: Table) -> Result<RecordBatch> {
        RecordBatch::try_new(Arc::new(Schema::new(self.fields)), self.arrays)
            .with_context(|| format!("building record batch for {}", table.name()))
    }
}

/// Columnar form of one table, columns in export order.
pub fn record_batch(schema: &StarSchema, table: Table) -> Result<RecordBatch> {
    let cols = Columns::default();
    let cols = match table {
        Table::Fact => {
            let f = &schema.facts;
            cols.int("ID_Prestamo", f.iter().map(|r| r.loan_id))
                .int("ID_Cliente", f.iter().map(|r| r.customer_id))
                .int("ID_Proposito", f.iter().map(|r| r.purpose_id))
                .int("ID_Tiempo", f.iter().map(|r| r.time_id))
                .int("Monto", f.iter().map(|r| r.amount))
                .int("Duracion", f.iter().map(|r| r.duration))
                .int("Tasa", f.iter().map(|r| r.rate))
                .float("Cuota_Mensual", f.iter().map(|r| r.monthly_installment))
                .int("Creditos_Existentes", f.iter().map(|r| r.existing_credits))
                .int("Score_Cliente", f.iter().map(|r| r.score))
                .text("Estado_Riesgo", f.iter().map(|r| r.risk.as_str()))
        }
        Table::Customer => {
            let c = &schema.customers;
            cols.int("ID_Cliente", c.iter().map(|r| r.customer_id))
                .int("Edad", c.iter().map(|r| r.age))
                .opt_text("Rango_Edad", c.iter().map(|r| r.age_bucket))
                .text("Genero", c.iter().map(|r| r.gender.as_str()))
                .text("Estado_Civil", c.iter().map(|r| r.marital_status.as_str()))
                .text("Trabajo", c.iter().map(|r| r.job.as_str()))
                .text("Empleo_Desde", c.iter().map(|r| r.employment_since.as_str()))
                .text("Vivienda", c.iter().map(|r| r.housing.as_str()))
                .text("Propiedad", c.iter().map(|r| r.property.as_str()))
                .text("Status_Cuenta", c.iter().map(|r| r.account_status.as_str()))
                .text("Cuenta_Ahorro", c.iter().map(|r| r.savings.as_str()))
                .text("Historial_Crediticio", c.iter().map(|r| r.credit_history.as_str()))
                .text("Telefono", c.iter().map(|r| r.telephone.as_str()))
                .text("Extranjero", c.iter().map(|r| r.foreign_worker.as_str()))
                .int("Personas_Dependientes", c.iter().map(|r| r.dependents))
                .text("Otros_Deudores", c.iter().map(|r| r.other_debtors.as_str()))
                .text("Otros_Planes_Cuota", c.iter().map(|r| r.other_installment_plans.as_str()))
                .opt_text("Categoria_Score", c.iter().map(|r| r.score_category))
                .opt_text("Rango_Monto", c.iter().map(|r| r.amount_bucket))
        }
        Table::Purpose => {
            let p = &schema.purposes;
            cols.int("ID_Proposito", p.iter().map(|r| r.purpose_id))
                .text("Proposito", p.iter().map(|r| r.purpose.as_str()))
                .text("Categoria_Proposito", p.iter().map(|r| r.category))
        }
        Table::Time => {
            let t = &schema.times;
            let quarters: Vec<String> = t.iter().map(|r| format!("Q{}", r.calendar.quarter)).collect();
            cols.int("ID_Tiempo", t.iter().map(|r| r.time_id))
                .date("Fecha", t.iter().map(|r| r.date))
                .int("Anio", t.iter().map(|r| r.calendar.year as i64))
                .int("Mes", t.iter().map(|r| r.calendar.month as i64))
                .text("Nombre_Mes", t.iter().map(|r| r.calendar.month_name))
                .text("Trimestre", quarters.iter().map(String::as_str))
                .text("Dia_Semana", t.iter().map(|r| r.calendar.weekday))
                .int("Es_FinDeSemana", t.iter().map(|r| r.calendar.is_weekend as i64))
        }
        Table::Risk => {
            let k = &schema.risks;
            cols.int("ID_Riesgo", k.iter().map(|r| r.risk_id))
                .text("Estado_Riesgo", k.iter().map(|r| r.outcome.as_str()))
                .text("Descripcion", k.iter().map(|r| r.description))
                .text("Etiqueta_ES", k.iter().map(|r| r.label_es))
                .text("Color_HEX", k.iter().map(|r| r.color_hex))
        }
        Table::Flat => {
            let rows = &schema.flat;
            let e = || rows.iter().map(|r| &r.record);
            cols.int("ID_Prestamo", rows.iter().map(|r| r.loan_id))
                .int("Edad", e().map(|r| r.base.age))
                .opt_text("Rango_Edad", e().map(|r| r.age_bucket))
                .text("Genero", e().map(|r| r.base.gender.as_str()))
                .text("Estado_Civil", e().map(|r| r.base.marital_status.as_str()))
                .text("Trabajo", e().map(|r| r.base.job.as_str()))
                .text("Empleo_Desde", e().map(|r| r.base.employment_since.as_str()))
                .text("Vivienda", e().map(|r| r.base.housing.as_str()))
                .text("Propiedad", e().map(|r| r.base.property.as_str()))
                .text("Status_Cuenta", e().map(|r| r.base.account_status.as_str()))
                .text("Cuenta_Ahorro", e().map(|r| r.base.savings.as_str()))
                .text("Historial_Crediticio", e().map(|r| r.base.credit_history.as_str()))
                .text("Proposito", e().map(|r| r.base.purpose.as_str()))
                .int("Monto_Credito", e().map(|r| r.base.amount))
                .int("Duracion_Meses", e().map(|r| r.base.duration_months))
                .int("Tasa_Cuota", e().map(|r| r.base.installment_rate))
                .float("Cuota_Mensual", e().map(|r| r.monthly_installment))
                .int("Score_Cliente", e().map(|r| r.score))
                .opt_text("Categoria_Score", e().map(|r| r.score_category))
                .opt_text("Rango_Monto", e().map(|r| r.amount_bucket))
                .int("Creditos_Existentes", e().map(|r| r.base.existing_credits))
                .int("Personas_Dependientes", e().map(|r| r.base.dependents))
                .text("Otros_Deudores", e().map(|r| r.base.other_debtors.as_str()))
                .text("Otros_Planes_Cuota", e().map(|r| r.base.other_installment_plans.as_str()))
                .text("Telefono", e().map(|r| r.base.telephone.as_str()))
                .text("Extranjero", e().map(|r| r.base.foreign_worker.as_str()))
                .text("Riesgo", e().map(|r| r.base.risk.as_str()))
                .date("Fecha_Solicitud", e().map(|r| r.request_date))
                .int("Anio", e().map(|r| r.calendar.year as i64))
                .int("Mes", e().map(|r| r.calendar.month as i64))
                .text("Nombre_Mes", e().map(|r| r.calendar.month_name))
                .int("Trimestre", e().map(|r| r.calendar.quarter as i64))
                .text("Dia_Semana", e().map(|r| r.calendar.weekday))
        }
    };
    cols.finish(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_records;
    use crate::features::enrich;
    use crate::raw::synthetic;
    use crate::star::build_star_schema;
    use arrow::array::Array;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> Result<StarSchema> {
        let mut rng = StdRng::seed_from_u64(42);
        let raw = synthetic::generate(&mut rng, 150)?;
        build_star_schema(enrich(decode_records(raw).records, &mut rng)?)
    }

    fn column_names(batch: &RecordBatch) -> Vec<String> {
        batch.schema().fields().iter().map(|f| f.name().clone()).collect()
    }

    #[test]
    fn fact_columns_are_renamed() -> Result<()> {
        let batch = record_batch(&sample()?, Table::Fact)?;
        assert_eq!(
            column_names(&batch),
            vec![
                "ID_Prestamo",
                "ID_Cliente",
                "ID_Proposito",
                "ID_Tiempo",
                "Monto",
                "Duracion",
                "Tasa",
                "Cuota_Mensual",
                "Creditos_Existentes",
                "Score_Cliente",
                "Estado_Riesgo",
            ]
        );
        assert_eq!(batch.num_rows(), 150);
        Ok(())
    }

    #[test]
    fn every_table_has_expected_shape() -> Result<()> {
        let schema = sample()?;
        let widths = [11, 19, 3, 8, 5, 33];
        for (table, width) in Table::ALL.into_iter().zip(widths) {
            let batch = record_batch(&schema, table)?;
            assert_eq!(batch.num_columns(), width, "{}", table.name());
            assert_eq!(batch.num_rows(), schema.row_count(table), "{}", table.name());
        }
        Ok(())
    }

    #[test]
    fn time_dimension_encoding() -> Result<()> {
        let schema = sample()?;
        let batch = record_batch(&schema, Table::Time)?;
        let quarters = batch
            .column_by_name("Trimestre")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .expect("Trimestre is Utf8");
        let weekend = batch
            .column_by_name("Es_FinDeSemana")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .expect("Es_FinDeSemana is Int64");
        for (i, t) in schema.times.iter().enumerate() {
            assert_eq!(quarters.value(i), format!("Q{}", t.calendar.quarter));
            assert_eq!(weekend.value(i), t.calendar.is_weekend as i64);
        }
        assert_eq!(weekend.null_count(), 0);
        Ok(())
    }
}
