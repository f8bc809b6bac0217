mod chart;
mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{ChartArgs, LoanArgs, ScheduleArgs};

/// Fixed-rate mortgage amortization schedules and charts
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Fixed-rate mortgage amortization schedules and charts",
    long_about = "Computes the month-by-month amortization schedule of a fixed-rate \
                  mortgage with decimal precision, prints a repayment summary and \
                  renders balance, payment split, cumulative and total cost charts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the amortization schedule
    Schedule(ScheduleArgs),
    /// Print the repayment summary
    Summary(LoanArgs),
    /// Render the four-panel repayment figure
    Chart(ChartArgs),
    /// Print the summary and render the figure
    Visualise(ChartArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args.loan)
            .map(|value| output::format_output(&args.output, &value)),
        Commands::Summary(args) => commands::amortization::run_summary(args),
        Commands::Chart(args) => commands::amortization::run_chart(args),
        Commands::Visualise(args) => commands::amortization::run_visualise(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
