use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use salesflow_core::config::{DEFAULT_DATA_DIR, DEFAULT_KPI_DIR};
use salesflow_core::report::{self, KpiSummary};
use salesflow_core::{clean, merge, run_pipeline, PipelinePaths, StageError};
use tracing::{error, info};

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sales report ETL and KPI generator", long_about = None)]
struct Cli {
    /// Directory holding the source reports and the master/cleaned tables
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory receiving KPI tables and charts
    #[arg(long, default_value = DEFAULT_KPI_DIR)]
    kpi_dir: PathBuf,

    /// Directory for the rolling log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Merge, clean and report (default)
    Run,
    /// Merge the two source reports into the master table
    Merge,
    /// Clean the master table
    Clean,
    /// Build KPI tables and charts from the cleaned table
    Report,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir)?;

    let paths = PipelinePaths::from_dirs(&cli.data_dir, &cli.kpi_dir);
    let command = cli.command.unwrap_or(Command::Run);

    match execute(command, &paths) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(error = %err, stage = %err.stage, "pipeline failed");
            eprintln!("Pipeline failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn execute(command: Command, paths: &PipelinePaths) -> Result<(), StageError> {
    match command {
        Command::Run => {
            let outcome = run_pipeline(paths)?;
            println!(
                "Master table: {} rows x {} columns ({} duplicates removed)",
                outcome.merge.rows, outcome.merge.columns, outcome.merge.duplicates_removed
            );
            println!(
                "Cleaned table: {} of {} rows kept",
                outcome.clean.rows_out, outcome.clean.rows_in
            );
            if let Some(report) = outcome.report {
                print_kpis(&report.kpis);
                println!("{} report files written", report.files.len());
            }
        }
        Command::Merge => {
            let summary = merge::run(paths)?;
            println!("Master table: {} rows x {} columns", summary.rows, summary.columns);
        }
        Command::Clean => {
            let summary = clean::run(paths)?;
            println!("Cleaned table: {} of {} rows kept", summary.rows_out, summary.rows_in);
        }
        Command::Report => {
            if let Some(report) = report::generate(paths) {
                print_kpis(&report.kpis);
            }
        }
    }
    info!(?command, "done");
    Ok(())
}

fn print_kpis(kpis: &KpiSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Total revenue".to_string(), kpis.total_revenue.to_string()]);
    table.add_row(vec!["Total orders".to_string(), kpis.total_order.to_string()]);
    table.add_row(vec![
        "Total quantity sold".to_string(),
        kpis.total_quantity_sold.to_string(),
    ]);
    table.add_row(vec![
        "Average order value".to_string(),
        kpis.average_order_value.to_string(),
    ]);
    table.add_row(vec![
        "Revenue (domestic)".to_string(),
        format!("{:.2}", kpis.revenue_by_amazon),
    ]);
    table.add_row(vec![
        "Revenue (international)".to_string(),
        format!("{:.2}", kpis.revenue_by_international),
    ]);
    println!("{table}");
}
