use anyhow::Result;
use creditstar::{config::Config, pipeline};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;
    info!(
        base = %config.base_dir.display(),
        seed = config.seed,
        url = %config.dataset_url,
        parquet = config.write_parquet,
        "configuration loaded"
    );

    // ─── 3) run ETL ──────────────────────────────────────────────────
    let start = Instant::now();
    let output = pipeline::run(&config).await?;
    info!(
        "{} records ({}) → {} tables in {:?}",
        output.records_loaded,
        output.source.as_str(),
        output.exported.len(),
        start.elapsed()
    );

    // ─── 4) report ───────────────────────────────────────────────────
    println!("{}", output.report);
    println!();
    println!("Archivos generados en: {}", config.processed_dir().display());
    for e in &output.exported {
        println!("   {:28} {:>5} filas", e.path.display(), e.rows);
    }
    Ok(())
}
