use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::{Path, PathBuf};

use mortgage_core::amortization::schedule::{self, LoanParameters};
use mortgage_core::amortization::summary;
use mortgage_core::Currency;

use crate::chart;
use crate::input;
use crate::OutputFormat;

/// Loan terms. Defaults describe a €196,687 loan at 2.85% over 23 years.
#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Amount borrowed
    #[arg(long, default_value = "196687")]
    pub principal: Decimal,

    /// Annual interest rate as a fraction (0.0285 = 2.85%)
    #[arg(long, default_value = "0.0285")]
    pub annual_rate: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 23)]
    pub term_years: u32,

    /// Monthly payments already made
    #[arg(long, default_value_t = 0)]
    pub payments_made: u32,

    /// Calendar year of the first payment
    #[arg(long, default_value_t = 2025)]
    pub start_year: i32,

    /// Currency used to label amounts (GBP, USD, EUR, CHF, JPY, CAD, AUD)
    #[arg(long, default_value = "EUR")]
    pub currency: Currency,
}

/// Arguments for emitting the schedule
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Output format
    #[arg(long, default_value = "json")]
    pub output: OutputFormat,
}

/// Arguments for rendering the amortization figure
#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Where to write the SVG figure
    #[arg(long, default_value = "mortgage_visualisation.svg")]
    pub out: PathBuf,

    /// Open the figure in the default viewer once written
    #[arg(long)]
    pub open: bool,
}

fn resolve_params(args: &LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    let params: LoanParameters = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(params) = input::stdin::read_stdin()? {
        params
    } else {
        LoanParameters::new(
            args.principal,
            args.annual_rate,
            args.term_years,
            args.payments_made,
            args.start_year,
        )?
    };
    Ok(params)
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args)?;
    let result = schedule::build_schedule(&params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: LoanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(&args)?;
    let result = schedule::amortize(&params)?;
    println!("{}", summary::render_summary(&params, &result, args.currency));
    Ok(())
}

pub fn run_chart(args: ChartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let result = schedule::amortize(&params)?;
    draw(&params, &result, &args)
}

/// Summary, figure and confirmation in one pass.
pub fn run_visualise(args: ChartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let result = schedule::amortize(&params)?;

    println!(
        "{}",
        summary::render_summary(&params, &result, args.loan.currency)
    );
    draw(&params, &result, &args)?;
    println!("\nVisualisation saved to '{}'", args.out.display());
    Ok(())
}

fn draw(
    params: &LoanParameters,
    result: &schedule::AmortizationResult,
    args: &ChartArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    chart::render_figure(params, result, args.loan.currency, &args.out)?;
    if args.open {
        open_or_warn(&args.out);
    }
    Ok(())
}

/// A missing viewer is not fatal; the figure is already on disk.
fn open_or_warn(path: &Path) {
    if let Err(e) = chart::open_figure(path) {
        log::warn!("{}", e);
    }
}
