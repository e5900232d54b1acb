use std::path::PathBuf;

use clap::Parser;

use cardiosense::etl::merge_datasets;

/// Merge the legacy and clinic heart-disease CSVs into one training set.
#[derive(Parser, Debug)]
#[command(name = "merge-datasets")]
struct Args {
    /// Legacy dataset (canonical columns, inverted target polarity).
    #[arg(long, default_value = "heart-disease.csv")]
    legacy: PathBuf,

    /// Clinic dataset (renamed columns, Presence/Absence labels).
    #[arg(long, default_value = "new-heart-data.csv")]
    clinic: PathBuf,

    /// Output path for the combined dataset.
    #[arg(long, default_value = "combined-heart-data.csv")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let summary = merge_datasets(&args.legacy, &args.clinic, &args.out)?;

    tracing::info!(
        legacy_rows = summary.legacy_rows,
        clinic_rows = summary.clinic_rows,
        total = summary.total,
        out = %args.out.display(),
        "Combined dataset written"
    );

    Ok(())
}
