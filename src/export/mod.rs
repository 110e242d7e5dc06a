// src/export/mod.rs
use anyhow::{Context, Result};
use arrow::csv::{reader::Format, ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::star::{StarSchema, Table};

pub mod batches;

pub use batches::record_batch;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What was written for one table.
#[derive(Debug, Clone)]
pub struct ExportedTable {
    pub table: Table,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub bytes: u64,
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write to `.{name}.tmp` next to `path`, then rename into place.
fn write_atomically<F>(path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let tmp = tmp_path(path);
    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
    Ok(fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len())
}

pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<u64> {
    write_atomically(path, |out| {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_date_format(DATE_FORMAT.to_string())
            .build(out);
        writer.write(batch).context("writing csv batch")?;
        writer.into_inner().flush().context("flushing csv")?;
        Ok(())
    })
}

pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<u64> {
    write_atomically(path, |out| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(out, batch.schema(), Some(props))
            .context("creating parquet writer")?;
        writer.write(batch).context("writing parquet batch")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    })
}

fn export_table(
    schema: &StarSchema,
    table: Table,
    out_dir: &Path,
    parquet: bool,
) -> Result<ExportedTable> {
    let batch = record_batch(schema, table)?;
    let path = out_dir.join(format!("{}.csv", table.name()));
    let bytes = write_csv(&batch, &path)?;
    debug!(table = table.name(), bytes, "csv written");

    if parquet {
        let pq = out_dir.join(format!("{}.parquet", table.name()));
        let pq_bytes = write_parquet(&batch, &pq)?;
        debug!(table = table.name(), bytes = pq_bytes, "parquet written");
    }

    Ok(ExportedTable {
        table,
        path,
        rows: batch.num_rows(),
        columns: batch.num_columns(),
        bytes,
    })
}

/// Write all six tables into `out_dir`, one file each, in parallel.
#[instrument(level = "info", skip(schema))]
pub fn export_tables(
    schema: &StarSchema,
    out_dir: &Path,
    parquet: bool,
) -> Result<Vec<ExportedTable>> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let exported: Vec<ExportedTable> = Table::ALL
        .par_iter()
        .map(|&table| export_table(schema, table, out_dir, parquet))
        .collect::<Result<_>>()?;

    for e in &exported {
        info!(
            "{} → {} ({} rows × {} cols, {} bytes)",
            e.table.name(),
            e.path.display(),
            e.rows,
            e.columns,
            e.bytes
        );
    }
    Ok(exported)
}

/// Read a CSV written by [`write_csv`] back into record batches.
pub fn read_csv_table(path: &Path) -> Result<Vec<RecordBatch>> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let (schema, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, None)
        .with_context(|| format!("inferring schema of {}", path.display()))?;
    file.seek(SeekFrom::Start(0))?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .build(file)
        .with_context(|| format!("reading {}", path.display()))?;
    reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("decoding {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_records;
    use crate::features::enrich;
    use crate::raw::synthetic;
    use crate::star::build_star_schema;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    fn sample(seed: u64) -> Result<StarSchema> {
        let mut rng = StdRng::seed_from_u64(seed);
        let raw = synthetic::generate(&mut rng, 200)?;
        build_star_schema(enrich(decode_records(raw).records, &mut rng)?)
    }

    #[test]
    fn csv_round_trip_keeps_rows_and_columns() -> Result<()> {
        let dir = tempdir()?;
        let schema = sample(42)?;
        let exported = export_tables(&schema, dir.path(), false)?;
        assert_eq!(exported.len(), 6);

        for e in &exported {
            let written = record_batch(&schema, e.table)?;
            let read = read_csv_table(&e.path)?;
            let rows: usize = read.iter().map(|b| b.num_rows()).sum();
            assert_eq!(rows, e.rows, "{}", e.table.name());

            let names = |b: &RecordBatch| -> Vec<String> {
                b.schema().fields().iter().map(|f| f.name().clone()).collect()
            };
            assert_eq!(names(&read[0]), names(&written), "{}", e.table.name());
        }
        // no temp files left behind
        let leftovers = glob::glob(&format!("{}/.*.tmp", dir.path().display()))?.count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn dates_are_iso_formatted() -> Result<()> {
        let dir = tempdir()?;
        let schema = sample(7)?;
        export_tables(&schema, dir.path(), false)?;

        let text = fs::read_to_string(dir.path().join("Dim_Tiempo.csv"))?;
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID_Tiempo,Fecha,Anio,Mes,Nombre_Mes,Trimestre,Dia_Semana,Es_FinDeSemana")
        );
        let first = &schema.times[0];
        let expected = format!("1,{},", first.date.format(DATE_FORMAT));
        assert!(lines.next().unwrap_or_default().starts_with(&expected));

        let risk = fs::read_to_string(dir.path().join("Dim_Riesgo.csv"))?;
        assert!(risk.contains("1,Good,Crédito pagado correctamente,Bueno,#2ECC71"));
        Ok(())
    }

    #[test]
    fn same_input_gives_identical_bytes() -> Result<()> {
        let a = tempdir()?;
        let b = tempdir()?;
        export_tables(&sample(3)?, a.path(), false)?;
        export_tables(&sample(3)?, b.path(), false)?;
        for table in Table::ALL {
            let file = format!("{}.csv", table.name());
            assert_eq!(
                fs::read(a.path().join(&file))?,
                fs::read(b.path().join(&file))?,
                "{}",
                file
            );
        }
        Ok(())
    }

    #[test]
    fn parquet_mirror_is_optional() -> Result<()> {
        let dir = tempdir()?;
        export_tables(&sample(1)?, dir.path(), true)?;
        for table in Table::ALL {
            assert!(dir.path().join(format!("{}.parquet", table.name())).exists());
        }
        let csv_only = tempdir()?;
        export_tables(&sample(1)?, csv_only.path(), false)?;
        assert!(!csv_only.path().join("Fact_Prestamos.parquet").exists());
        Ok(())
    }
}
