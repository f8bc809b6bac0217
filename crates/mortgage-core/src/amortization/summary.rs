//! Fixed-format console summary of an amortized loan.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::schedule::{AmortizationResult, LoanParameters};
use crate::types::{Currency, Money, Rate};

const RULE_WIDTH: usize = 50;
const LABEL_WIDTH: usize = 20;

/// Format an amount with thousands separators, e.g. `€196,687.00`.
pub fn format_currency(value: Money, symbol: &str, decimals: u32) -> String {
    let digits = fixed_point(value.abs(), decimals);
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + whole.len() / 3 + symbol.len() + 1);
    if value.is_sign_negative() && !value.round_dp(decimals).is_zero() {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_thousands(whole));
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Format a fractional rate as a percentage with two decimals, e.g. `2.85%`.
pub fn format_percent(rate: Rate) -> String {
    format!("{}%", fixed_point(rate * dec!(100), 2))
}

/// Render the summary block printed before the charts.
pub fn render_summary(
    params: &LoanParameters,
    result: &AmortizationResult,
    currency: Currency,
) -> String {
    let symbol = currency.symbol();
    let rule = "=".repeat(RULE_WIDTH);

    let mut lines = vec![
        rule.clone(),
        "MORTGAGE SUMMARY".to_string(),
        rule.clone(),
        line("Loan Amount:", format_currency(params.principal(), symbol, 2)),
        line("Interest Rate:", format_percent(params.annual_rate())),
        line(
            "Term:",
            format!(
                "{} years ({} payments)",
                params.term_years(),
                result.total_payments
            ),
        ),
    ];
    if params.payments_already_made() > 0 {
        lines.push(line(
            "Payments Made:",
            format!(
                "{} ({} remaining, balance {})",
                params.payments_already_made(),
                result.remaining_payments,
                format_currency(result.opening_balance, symbol, 2)
            ),
        ));
    }
    lines.push(line(
        "Monthly Payment:",
        format_currency(result.monthly_payment, symbol, 2),
    ));
    lines.push(line(
        "Total Interest:",
        format_currency(result.total_interest, symbol, 2),
    ));
    lines.push(line(
        "Total Cost:",
        format_currency(result.total_cost, symbol, 2),
    ));
    lines.push(rule);

    lines.join("\n")
}

fn line(label: &str, value: String) -> String {
    format!("{:<width$}{}", label, value, width = LABEL_WIDTH)
}

/// Round half away from zero and pad to exactly `decimals` places.
fn fixed_point(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
