use mortgage_core::amortization::schedule::{self, LoanParameters};
use mortgage_core::amortization::summary;
use mortgage_core::{Currency, MortgageError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_mortgage() -> LoanParameters {
    // €196,687 at 2.85% over 23 years, first payment in 2025
    LoanParameters::new(dec!(196_687), dec!(0.0285), 23, 0, 2025).unwrap()
}

fn assert_invalid_field(err: MortgageError, expected: &str) {
    match err {
        MortgageError::InvalidParameter { field, .. } => assert_eq!(field, expected),
        other => panic!("Expected InvalidParameter for {expected}, got {other:?}"),
    }
}

// ===========================================================================
// Schedule shape and closing balance
// ===========================================================================

#[test]
fn test_sample_mortgage_payment_and_totals() {
    let result = schedule::amortize(&sample_mortgage()).unwrap();

    assert_eq!(result.total_payments, 276);
    assert_eq!(result.schedule.len(), 276);

    // Annuity formula: 196,687 * r(1+r)^276 / ((1+r)^276 - 1), r = 0.002375
    assert!((result.monthly_payment - dec!(972.35)).abs() < dec!(0.01));

    // 276 level payments less principal
    assert!((result.total_interest - dec!(71_682.25)).abs() < dec!(0.01));
    assert_eq!(result.total_cost, dec!(196_687) + result.total_interest);
}

#[test]
fn test_total_interest_matches_payments_less_principal() {
    let result = schedule::amortize(&sample_mortgage()).unwrap();
    let paid: Decimal = result.schedule.iter().map(|e| e.payment).sum();
    assert!((paid - dec!(196_687) - result.total_interest).abs() < dec!(0.000001));

    let interest: Decimal = result.interest_series().iter().sum();
    assert!((interest - result.total_interest).abs() < dec!(0.000001));
}

#[test]
fn test_principal_portions_sum_to_principal() {
    let cases = [
        (dec!(196_687), dec!(0.0285), 23),
        (dec!(100_000), dec!(0.05), 30),
        (dec!(350_000), dec!(0.0675), 25),
        (dec!(15_000), dec!(0.12), 1),
        (dec!(250_000), dec!(0), 15),
    ];

    for (principal, rate, years) in cases {
        let params = LoanParameters::new(principal, rate, years, 0, 2025).unwrap();
        let result = schedule::amortize(&params).unwrap();

        let repaid: Decimal = result.principal_series().iter().sum();
        let tolerance = principal * dec!(0.000001);
        assert!(
            (repaid - principal).abs() < tolerance,
            "principal {principal} at {rate} over {years}y repaid {repaid}"
        );
        assert_eq!(result.final_balance(), Decimal::ZERO);
        assert!(result.schedule.iter().all(|e| e.remaining_balance >= Decimal::ZERO));
    }
}

#[test]
fn test_balances_decline_to_zero() {
    let result = schedule::amortize(&sample_mortgage()).unwrap();
    let balances = result.balances();

    assert_eq!(balances.len(), 277);
    assert_eq!(balances[0], dec!(196_687));
    assert_eq!(*balances.last().unwrap(), Decimal::ZERO);
    assert!(balances.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_cumulative_series_track_running_sums() {
    let result = schedule::amortize(&sample_mortgage()).unwrap();

    let mut principal = Decimal::ZERO;
    let mut interest = Decimal::ZERO;
    for (i, entry) in result.schedule.iter().enumerate() {
        principal += entry.principal;
        interest += entry.interest;
        assert_eq!(result.cumulative_principal[i + 1], principal);
        assert_eq!(result.cumulative_interest[i + 1], interest);
    }
}

#[test]
fn test_interest_share_falls_over_time() {
    let result = schedule::amortize(&sample_mortgage()).unwrap();
    let first = &result.schedule[0];
    let last = result.schedule.last().unwrap();

    // First month: 196,687 * 0.002375
    assert_eq!(first.interest, dec!(467.131625));
    assert!(first.interest > last.interest);
    assert!(first.principal < last.principal);
}

// ===========================================================================
// Zero rate
// ===========================================================================

#[test]
fn test_zero_rate_is_straight_line() {
    let params = LoanParameters::new(dec!(100_000), Decimal::ZERO, 10, 0, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();

    assert_eq!(result.monthly_payment, dec!(100_000) / dec!(120));
    assert!(result.schedule.iter().all(|e| e.interest.is_zero()));
    assert_eq!(result.total_interest, Decimal::ZERO);
    assert_eq!(result.total_cost, dec!(100_000));
    assert_eq!(result.final_balance(), Decimal::ZERO);
}

#[test]
fn test_zero_rate_warning() {
    let params = LoanParameters::new(dec!(100_000), Decimal::ZERO, 10, 0, 2025).unwrap();
    let output = schedule::build_schedule(&params).unwrap();
    assert!(output.warnings.iter().any(|w| w.contains("Zero interest rate")));
    assert_eq!(output.result.schedule.len(), 120);
}

// ===========================================================================
// Payments already made
// ===========================================================================

#[test]
fn test_payments_already_made_shortens_schedule() {
    let full = schedule::amortize(&sample_mortgage()).unwrap();
    let params = LoanParameters::new(dec!(196_687), dec!(0.0285), 23, 12, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();

    assert_eq!(result.schedule.len(), 276 - 12);
    assert_eq!(result.remaining_payments, 264);
    assert_eq!(result.schedule[0].month, 13);
    assert_eq!(result.first_month(), 12);
    assert_eq!(result.monthly_payment, full.monthly_payment);
    assert_eq!(result.opening_balance, full.schedule[11].remaining_balance);
    assert_eq!(result.schedule[0], full.schedule[12]);

    // Lifetime figures are unchanged; the remaining slice excludes year one
    assert_eq!(result.total_interest, full.total_interest);
    let year_one: Decimal = full.schedule[..12].iter().map(|e| e.interest).sum();
    assert!((result.remaining_interest + year_one - result.total_interest).abs() < dec!(0.000001));

    let repaid = *result.cumulative_principal.last().unwrap();
    assert!((repaid - result.opening_balance).abs() < dec!(0.000001));
}

#[test]
fn test_all_payments_made_gives_empty_schedule() {
    let params = LoanParameters::new(dec!(10_000), dec!(0.04), 2, 24, 2025).unwrap();
    let output = schedule::build_schedule(&params).unwrap();

    assert!(output.result.schedule.is_empty());
    assert_eq!(output.result.opening_balance, Decimal::ZERO);
    assert_eq!(output.result.cumulative_principal, vec![Decimal::ZERO]);
    assert!(output.warnings.iter().any(|w| w.contains("already made")));
}

#[test]
fn test_milestones_respect_payments_made() {
    let params = LoanParameters::new(dec!(196_687), dec!(0.0285), 23, 72, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();
    let years: Vec<u32> = result.balance_milestones.iter().map(|m| m.years).collect();
    assert_eq!(years, vec![10, 15, 20]);
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_zero_term_is_rejected() {
    let err = LoanParameters::new(dec!(100_000), dec!(0.03), 0, 0, 2025).unwrap_err();
    assert_invalid_field(err, "term_years");
}

#[test]
fn test_too_many_payments_made_is_rejected() {
    let err = LoanParameters::new(dec!(100_000), dec!(0.03), 10, 121, 2025).unwrap_err();
    assert_invalid_field(err, "payments_already_made");
}

#[test]
fn test_non_positive_principal_is_rejected() {
    let err = LoanParameters::new(Decimal::ZERO, dec!(0.03), 10, 0, 2025).unwrap_err();
    assert_invalid_field(err, "principal");
    let err = LoanParameters::new(dec!(-5), dec!(0.03), 10, 0, 2025).unwrap_err();
    assert_invalid_field(err, "principal");
}

#[test]
fn test_negative_rate_is_rejected() {
    let err = LoanParameters::new(dec!(100_000), dec!(-0.01), 10, 0, 2025).unwrap_err();
    assert_invalid_field(err, "annual_rate");
}

#[test]
fn test_term_beyond_maximum_is_rejected() {
    let err = LoanParameters::new(dec!(100_000), Decimal::ZERO, 101, 0, 2025).unwrap_err();
    assert_invalid_field(err, "term_years");

    let err =
        LoanParameters::new(dec!(100_000), Decimal::ZERO, 300_000_000, 0, 2025).unwrap_err();
    assert_invalid_field(err, "term_years");

    let json = r#"{"principal": "1000", "annual_rate": "0", "term_years": 4000000000, "start_year": 2025}"#;
    assert!(serde_json::from_str::<LoanParameters>(json).is_err());
}

#[test]
fn test_maximum_term_is_accepted() {
    let params =
        LoanParameters::new(dec!(100_000), dec!(0.03), schedule::MAX_TERM_YEARS, 0, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();
    assert_eq!(result.schedule.len(), 1200);
    assert_eq!(result.final_balance(), Decimal::ZERO);
}

#[test]
fn test_large_principal_at_high_rate_amortizes() {
    // 1e21 at 25% over 100 years: P * r * (1+r)^n alone exceeds Decimal's range
    let principal = dec!(1_000_000_000_000_000_000_000);
    let params = LoanParameters::new(principal, dec!(0.25), 100, 0, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();

    assert_eq!(result.schedule.len(), 1200);
    assert_eq!(result.final_balance(), Decimal::ZERO);
    assert_eq!(result.total_cost, principal + result.total_interest);
}

#[test]
fn test_unrepresentable_payment_is_an_error() {
    // 1200% a year is 100% a month; the payment on Decimal::MAX overflows
    let params = LoanParameters::new(Decimal::MAX, dec!(12), 1, 0, 2025).unwrap();
    let err = schedule::amortize(&params).unwrap_err();
    assert_invalid_field(err, "principal");

    let err = schedule::build_schedule(&params).unwrap_err();
    assert_invalid_field(err, "principal");
}

// ===========================================================================
// Envelope and summary
// ===========================================================================

#[test]
fn test_envelope_carries_assumptions() {
    let output = schedule::build_schedule(&sample_mortgage()).unwrap();
    assert!(output.methodology.contains("annuity"));
    assert_eq!(output.assumptions["term_years"], serde_json::json!(23));
    assert_eq!(output.assumptions["start_year"], serde_json::json!(2025));
    assert!(output.warnings.is_empty());

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["result"]["schedule"].as_array().unwrap().len(), 276);
}

#[test]
fn test_summary_block() {
    let params = sample_mortgage();
    let result = schedule::amortize(&params).unwrap();
    let text = summary::render_summary(&params, &result, Currency::EUR);

    let expected = "\
==================================================
MORTGAGE SUMMARY
==================================================
Loan Amount:        €196,687.00
Interest Rate:      2.85%
Term:               23 years (276 payments)
Monthly Payment:    €972.35
Total Interest:     €71,682.25
Total Cost:         €268,369.25
==================================================";
    assert_eq!(text, expected);
}

#[test]
fn test_summary_reports_payments_made() {
    let params = LoanParameters::new(dec!(100_000), Decimal::ZERO, 10, 60, 2025).unwrap();
    let result = schedule::amortize(&params).unwrap();
    let text = summary::render_summary(&params, &result, Currency::USD);

    assert!(text.contains("Payments Made:      60 (60 remaining, balance $50,000.00)"));
    assert!(text.contains("Total Interest:     $0.00"));
    assert!(text.contains("Total Cost:         $100,000.00"));
}
