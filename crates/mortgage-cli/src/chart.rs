//! Four-panel amortization figure rendered to SVG with plotters.
//!
//! Panels: remaining balance, monthly interest/principal split, cumulative
//! payments, and a principal-versus-interest pie. Every series is read from
//! [`AmortizationResult`]; nothing here recomputes the schedule.

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use mortgage_core::amortization::schedule::{
    calendar_year, AmortizationResult, LoanParameters, ScheduleEntry,
};
use mortgage_core::amortization::summary::{format_currency, format_percent};
use mortgage_core::Currency;

pub const FIGURE_SIZE: (u32, u32) = (1400, 1000);

const BALANCE_BLUE: RGBColor = RGBColor(70, 130, 180);
const INTEREST_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const PRINCIPAL_GREEN: RGBColor = RGBColor(0x27, 0xae, 0x60);
const FONT: &str = "sans-serif";

/// Years between x-axis labels.
const YEAR_TICK: u32 = 5;

type ChartResult = Result<(), Box<dyn Error>>;
type YearChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Schedule series as `(calendar year, value)` points.
struct Series {
    x_range: Range<f64>,
    balance: Vec<(f64, f64)>,
    interest: Vec<(f64, f64)>,
    payment: Vec<(f64, f64)>,
    cumulative_interest: Vec<(f64, f64)>,
    cumulative_paid: Vec<(f64, f64)>,
}

impl Series {
    fn new(params: &LoanParameters, result: &AmortizationResult) -> Self {
        let start = params.start_year();
        let first = result.first_month();
        let year_at = |i: usize| calendar_year(first + i as u32, start);

        Self {
            x_range: calendar_year(0, start)..calendar_year(result.total_payments, start),
            balance: result
                .balances()
                .into_iter()
                .enumerate()
                .map(|(i, b)| (year_at(i), to_f64(b)))
                .collect(),
            interest: monthly_points(result, start, |e| e.interest),
            payment: monthly_points(result, start, |e| e.payment),
            cumulative_interest: result
                .cumulative_interest
                .iter()
                .enumerate()
                .map(|(i, c)| (year_at(i), to_f64(*c)))
                .collect(),
            cumulative_paid: result
                .cumulative_interest
                .iter()
                .zip(&result.cumulative_principal)
                .enumerate()
                .map(|(i, (ci, cp))| (year_at(i), to_f64(ci + cp)))
                .collect(),
        }
    }
}

/// Render the full figure to `path` as SVG.
pub fn render_figure(
    params: &LoanParameters,
    result: &AmortizationResult,
    currency: Currency,
    path: &Path,
) -> ChartResult {
    let symbol = currency.symbol();
    let series = Series::new(params, result);

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!(
        "Mortgage Repayment Analysis: {} at {} over {} years",
        format_currency(params.principal(), symbol, 0),
        format_percent(params.annual_rate()),
        params.term_years()
    );
    let body = root.titled(&title, (FONT, 26).into_font())?;
    let panels = body.split_evenly((2, 2));

    draw_balance_panel(&panels[0], params, result, &series, symbol)?;
    draw_monthly_panel(&panels[1], params, result, &series, symbol)?;
    draw_cumulative_panel(&panels[2], params, &series, symbol)?;
    draw_cost_pie(&panels[3], params, result, symbol)?;

    root.present()?;
    log::info!("wrote amortization figure to {}", path.display());
    Ok(())
}

/// Show a rendered figure in the system's default viewer.
pub fn open_figure(path: &Path) -> ChartResult {
    let target = path
        .to_str()
        .ok_or_else(|| format!("Figure path is not valid UTF-8: {}", path.display()))?;
    webbrowser::open(target).map_err(|e| format!("Failed to open '{}': {}", target, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn draw_balance_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    params: &LoanParameters,
    result: &AmortizationResult,
    series: &Series,
    symbol: &str,
) -> ChartResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let principal = to_f64(params.principal());
    let mut chart = ChartBuilder::on(area)
        .caption("Remaining Balance Over Time", (FONT, 18))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(series.x_range.clone(), 0.0..principal * 1.05)?;
    configure_axes(&mut chart, params, "Remaining Balance", symbol)?;

    chart.draw_series(
        AreaSeries::new(series.balance.iter().copied(), 0.0, BALANCE_BLUE.mix(0.3).filled())
            .border_style(BALANCE_BLUE.stroke_width(2)),
    )?;

    let label_lift = principal * 0.08;
    let label_style = (FONT, 12)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for m in &result.balance_milestones {
        let x = f64::from(m.calendar_year);
        let y = to_f64(m.balance);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, y + label_lift * 0.9), (x, y)],
            BLACK.mix(0.4),
        )))?;
        chart.draw_series(std::iter::once(Circle::new((x, y), 3, BALANCE_BLUE.filled())))?;
        chart.draw_series(std::iter::once(Text::new(
            format_currency(m.balance, symbol, 0),
            (x, y + label_lift),
            label_style.clone(),
        )))?;
    }

    Ok(())
}

fn draw_monthly_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    params: &LoanParameters,
    result: &AmortizationResult,
    series: &Series,
    symbol: &str,
) -> ChartResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let payment = to_f64(result.monthly_payment);
    let mut chart = ChartBuilder::on(area)
        .caption("Monthly Payment Breakdown", (FONT, 18))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(series.x_range.clone(), 0.0..payment * 1.25)?;
    configure_axes(&mut chart, params, "Payment Amount", symbol)?;

    // Stacked: interest on the bottom, principal filling up to the payment
    chart
        .draw_series(AreaSeries::new(
            series.payment.iter().copied(),
            0.0,
            PRINCIPAL_GREEN.mix(0.8).filled(),
        ))?
        .label("Principal")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], PRINCIPAL_GREEN.filled()));
    chart
        .draw_series(AreaSeries::new(
            series.interest.iter().copied(),
            0.0,
            INTEREST_RED.mix(0.8).filled(),
        ))?
        .label("Interest")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], INTEREST_RED.filled()));

    let x = &series.x_range;
    chart
        .draw_series(LineSeries::new(
            vec![(x.start, payment), (x.end, payment)],
            BLACK.stroke_width(1),
        ))?
        .label(format!(
            "Monthly Payment: {}",
            format_currency(result.monthly_payment, symbol, 2)
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLACK));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::MiddleRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()?;

    Ok(())
}

fn draw_cumulative_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    params: &LoanParameters,
    series: &Series,
    symbol: &str,
) -> ChartResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let paid = series.cumulative_paid.last().map(|p| p.1).unwrap_or(0.0);
    let y_max = if paid > 0.0 { paid * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption("Cumulative Payments Over Time", (FONT, 18))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(series.x_range.clone(), 0.0..y_max)?;
    configure_axes(&mut chart, params, "Cumulative Amount Paid", symbol)?;

    chart
        .draw_series(AreaSeries::new(
            series.cumulative_paid.iter().copied(),
            0.0,
            PRINCIPAL_GREEN.mix(0.8).filled(),
        ))?
        .label("Cumulative Principal")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], PRINCIPAL_GREEN.filled()));
    chart
        .draw_series(AreaSeries::new(
            series.cumulative_interest.iter().copied(),
            0.0,
            INTEREST_RED.mix(0.8).filled(),
        ))?
        .label("Cumulative Interest")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], INTEREST_RED.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()?;

    Ok(())
}

/// Pie of principal against lifetime interest, interest wedge pulled out.
fn draw_cost_pie<DB>(
    area: &DrawingArea<DB, Shift>,
    params: &LoanParameters,
    result: &AmortizationResult,
    symbol: &str,
) -> ChartResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let caption = format!(
        "Total Cost Breakdown (Total: {})",
        format_currency(result.total_cost, symbol, 0)
    );
    let area = area.titled(&caption, (FONT, 18))?;

    let (w, h) = area.dim_in_pixel();
    let center = (f64::from(w) / 2.0, f64::from(h) / 2.0);
    let radius = f64::from(w.min(h)) * 0.33;

    let principal = to_f64(params.principal());
    let interest = to_f64(result.total_interest);
    let total = principal + interest;

    let centered = |size: i32| {
        (FONT, size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };

    let slices = [
        ("Principal", params.principal(), principal, PRINCIPAL_GREEN, 0.0),
        ("Interest", result.total_interest, interest, INTEREST_RED, 0.05),
    ];

    // Degrees, counter-clockwise from three o'clock; first wedge starts at the top
    let mut angle = 90.0_f64;
    for (label, amount, value, color, explode) in slices {
        if value <= 0.0 {
            continue;
        }
        let sweep = 360.0 * value / total;
        let mid = (angle + sweep / 2.0).to_radians();
        let origin = point_at(center, explode * radius, mid);

        let steps = (sweep.ceil() as usize).max(2);
        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(pixel(origin));
        for i in 0..=steps {
            let a = (angle + sweep * i as f64 / steps as f64).to_radians();
            outline.push(pixel(point_at(origin, radius, a)));
        }
        area.draw(&Polygon::new(outline, color.filled()))?;

        let share = format!("{:.1}%", 100.0 * value / total);
        area.draw(&Text::new(share, pixel(point_at(origin, radius * 0.6, mid)), centered(14)))?;

        let (lx, ly) = pixel(point_at(origin, radius * 1.25, mid));
        area.draw(&Text::new(label.to_string(), (lx, ly - 8), centered(14)))?;
        area.draw(&Text::new(
            format_currency(amount, symbol, 0),
            (lx, ly + 8),
            centered(14),
        ))?;

        angle += sweep;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn configure_axes<DB>(
    chart: &mut YearChart<'_, DB>,
    params: &LoanParameters,
    y_desc: &str,
    symbol: &str,
) -> ChartResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let y_label = |v: &f64| {
        Decimal::from_f64(*v)
            .map(|d| format_currency(d, symbol, 0))
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(format!("{} ({})", y_desc, symbol.trim()))
        .x_labels((params.term_years() / YEAR_TICK + 2) as usize)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&y_label)
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.1))
        .draw()?;
    Ok(())
}

fn monthly_points(
    result: &AmortizationResult,
    start_year: i32,
    value: impl Fn(&ScheduleEntry) -> Decimal,
) -> Vec<(f64, f64)> {
    result
        .schedule
        .iter()
        .map(|e| (calendar_year(e.month, start_year), to_f64(value(e))))
        .collect()
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn point_at(origin: (f64, f64), distance: f64, radians: f64) -> (f64, f64) {
    // Screen y grows downward
    (
        origin.0 + distance * radians.cos(),
        origin.1 - distance * radians.sin(),
    )
}

fn pixel(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    /// A path under the temp dir that concurrent test runs cannot share.
    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mortgage_{}_{name}", std::process::id()))
    }

    fn sample() -> (LoanParameters, AmortizationResult) {
        let params = LoanParameters::new(dec!(196_687), dec!(0.0285), 23, 0, 2025).unwrap();
        let result = mortgage_core::amortization::schedule::amortize(&params).unwrap();
        (params, result)
    }

    #[test]
    fn test_series_span_loan_years() {
        let (params, result) = sample();
        let series = Series::new(&params, &result);

        assert_eq!(series.x_range, 2025.0..2048.0);
        assert_eq!(series.balance.len(), 277);
        assert_eq!(series.balance[0], (2025.0, 196_687.0));
        assert_eq!(series.interest.len(), 276);
        assert_eq!(series.interest[0].0, calendar_year(1, 2025));
        assert_eq!(series.cumulative_paid.len(), 277);
        assert_eq!(series.cumulative_paid[0].1, 0.0);
    }

    #[test]
    fn test_series_start_after_payments_made() {
        let params = LoanParameters::new(dec!(100_000), dec!(0.04), 10, 24, 2020).unwrap();
        let result = mortgage_core::amortization::schedule::amortize(&params).unwrap();
        let series = Series::new(&params, &result);

        assert_eq!(series.balance[0].0, 2022.0);
        assert_eq!(series.x_range, 2020.0..2030.0);
        assert_eq!(series.payment.len(), 96);
    }

    #[test]
    fn test_render_figure_writes_svg() {
        let (params, result) = sample();
        let path = temp_path("chart_test_sample.svg");

        render_figure(&params, &result, Currency::EUR, &path).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Mortgage Repayment Analysis"));
        assert!(svg.contains("Remaining Balance Over Time"));
        assert!(svg.contains("Total Cost Breakdown"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_render_figure_zero_rate() {
        let params = LoanParameters::new(dec!(100_000), Decimal::ZERO, 10, 0, 2025).unwrap();
        let result = mortgage_core::amortization::schedule::amortize(&params).unwrap();
        let path = temp_path("chart_test_zero_rate.svg");

        render_figure(&params, &result, Currency::USD, &path).unwrap();

        assert!(fs::metadata(&path).unwrap().len() > 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_point_at_uses_screen_orientation() {
        let top = pixel(point_at((100.0, 100.0), 10.0, 90f64.to_radians()));
        assert_eq!(top, (100, 90));
        let right = pixel(point_at((100.0, 100.0), 10.0, 0.0));
        assert_eq!(right, (110, 100));
    }
}
