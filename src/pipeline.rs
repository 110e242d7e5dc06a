// src/pipeline.rs
use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::decode::{decode_records, DecodeReport};
use crate::export::{export_tables, ExportedTable};
use crate::features::enrich;
use crate::fetch::{self, Source};
use crate::quality::{build_report, QualityReport};
use crate::raw::{load_raw_file, synthetic, RawRecord};
use crate::star::{build_star_schema, check_integrity, StarSchema};

/// Everything one run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub source: Source,
    pub records_loaded: usize,
    pub exported: Vec<ExportedTable>,
    pub report: QualityReport,
}

/// Star schema plus the decoding findings that go into the report.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub schema: StarSchema,
    pub defects: DecodeReport,
}

/// Raw records from the acquired file, or synthetic ones when there is no
/// usable file.
pub fn load_input<R: Rng + ?Sized>(
    source: &Source,
    synthetic_records: usize,
    rng: &mut R,
) -> Result<Vec<RawRecord>> {
    if let Some(path) = source.path() {
        let records = load_raw_file(path)?;
        if !records.is_empty() {
            info!(records = records.len(), source = source.as_str(), "raw dataset loaded");
            return Ok(records);
        }
        warn!("{} holds no records; generating synthetic data", path.display());
    }
    info!(records = synthetic_records, "generating synthetic dataset");
    synthetic::generate(rng, synthetic_records)
}

/// Decode, enrich and reshape. Fails if the result is not referentially
/// consistent.
pub fn transform<R: Rng + ?Sized>(raw: Vec<RawRecord>, rng: &mut R) -> Result<Transformed> {
    let decoded = decode_records(raw);
    let enriched = enrich(decoded.records, rng).context("feature engineering")?;
    let schema = build_star_schema(enriched)?;
    check_integrity(&schema).context("star schema integrity")?;
    Ok(Transformed {
        schema,
        defects: decoded.report,
    })
}

/// Run the whole ETL once: acquire, decode, enrich, reshape, export, report.
#[instrument(level = "info", skip_all, fields(base = %config.base_dir.display(), seed = config.seed))]
pub async fn run(config: &Config) -> Result<PipelineOutput> {
    config.ensure_dirs()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let client = fetch::build_client(config.fetch_timeout())?;
    let source = fetch::acquire(&client, &config.dataset_url, &config.raw_file()).await;

    let raw = load_input(&source, config.synthetic_records, &mut rng)?;
    let records_loaded = raw.len();

    let Transformed { schema, defects } = transform(raw, &mut rng)?;
    let exported = export_tables(&schema, &config.processed_dir(), config.write_parquet)?;
    let report = build_report(&schema, &defects)?;

    info!(
        source = source.as_str(),
        records = records_loaded,
        files = exported.len(),
        "pipeline finished"
    );
    Ok(PipelineOutput {
        source,
        records_loaded,
        exported,
        report,
    })
}
