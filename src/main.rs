use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

mod common;
mod domain;
mod infra;
mod logging;
mod observability;
mod pipeline;
mod registry;

use crate::common::constants::{DASHBOARD_SOURCE, DEFAULT_REGISTRY_DIR};
use crate::common::error::VitalsError;
use crate::infra::canonical_store::{read_canonical, write_canonical};
use crate::infra::observation_reader::read_observations;
use crate::pipeline::processing::validate::validate_records;
use crate::pipeline::{ReconcileOptions, Reconciler};
use crate::registry::ModeRegistry;

#[derive(Parser)]
#[command(name = "vitals-reconciler")]
#[command(about = "Reconciles per-county vitals feeds into one canonical time series")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a batch of raw observations into a canonical table
    Reconcile {
        /// NDJSON file of raw observations
        #[arg(long)]
        input: PathBuf,
        /// Directory of per-county mode configuration files
        #[arg(long, default_value = DEFAULT_REGISTRY_DIR)]
        registry: PathBuf,
        /// Output NDJSON file for the canonical table
        #[arg(long)]
        output: PathBuf,
        /// Source label stamped on every canonical row
        #[arg(long, default_value = DASHBOARD_SOURCE)]
        source_label: String,
    },
    /// Re-validate a previously published canonical table
    Validate {
        /// NDJSON file of canonical records
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging and the metrics catalog; the guard keeps the
    // background log writer alive until exit
    let _log_guard = logging::init_logging();
    observability::metrics::init_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile {
            input,
            registry,
            output,
            source_label,
        } => {
            println!("🔄 Reconciling observations from {}", input.display());

            let observations = read_observations(&input)?;
            let mode_registry = ModeRegistry::load_from_directory(&registry)?;
            info!(
                "Registry holds {} counties ({} enabled)",
                mode_registry.len(),
                mode_registry.enabled_counties().len()
            );

            let reconciler = Reconciler::with_options(ReconcileOptions { source_label });
            match reconciler.reconcile(&observations, &mode_registry) {
                Ok(outcome) => {
                    write_canonical(&output, &outcome.records)?;

                    let summary = &outcome.summary;
                    println!("\n📊 Reconciliation summary:");
                    println!("   Input rows: {}", summary.input_rows);
                    println!(
                        "   Classified: {} cumulative, {} daily",
                        summary.cumulative_rows, summary.daily_rows
                    );
                    for (reason, count) in summary.drop_counts() {
                        println!("   Dropped ({}): {}", reason, count);
                    }
                    println!(
                        "   Daily repairs: {} clipped, {} filled",
                        summary.daily_values_clipped, summary.daily_nulls_filled
                    );
                    println!(
                        "   Backward revisions frozen: {} cases, {} deaths",
                        summary.cases_corrections, summary.deaths_corrections
                    );
                    println!(
                        "   Cumulative gaps filled: {} forward, {} zero",
                        summary.cumulative_forward_filled, summary.cumulative_zero_filled
                    );
                    println!("   Output rows: {}", summary.output_rows);
                    println!("✅ Canonical table written to {}", output.display());
                    Ok(())
                }
                Err(VitalsError::Validation { report }) => {
                    error!("Validation rejected the run; nothing was published");
                    println!("\n❌ Validation failures:");
                    print!("{}", report);
                    Err(VitalsError::Validation { report }.into())
                }
                Err(e) => {
                    error!("Reconciliation failed: {}", e);
                    Err(e.into())
                }
            }
        }
        Commands::Validate { input } => {
            println!("🔎 Validating canonical table {}", input.display());

            let records = read_canonical(&input)?;
            let report = validate_records(&records);
            if report.is_clean() {
                println!("✅ {} rows satisfy every invariant", records.len());
                Ok(())
            } else {
                println!("\n❌ Validation failures:");
                print!("{}", report);
                Err(VitalsError::Validation { report }.into())
            }
        }
    }
}
