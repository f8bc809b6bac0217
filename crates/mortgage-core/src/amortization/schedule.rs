//! Fixed-rate mortgage amortization.
//!
//! Builds the month-by-month schedule of a level-payment loan: interest on
//! the outstanding balance, principal from the rest of the payment, and the
//! running cumulative totals a renderer needs. All math in
//! `rust_decimal::Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value::{annuity_payment, periodic_rate, MONTHS_PER_YEAR};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Year offsets at which the remaining balance is reported.
pub const MILESTONE_YEARS: [u32; 4] = [5, 10, 15, 20];

/// Longest term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 100;

/// Annual rates above this usually mean a percentage was passed as a fraction.
const HIGH_RATE_WARNING: Decimal = dec!(0.25);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Validated loan terms. Fields are read-only once constructed, and JSON
/// input goes through the same validation as [`LoanParameters::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoanTerms")]
pub struct LoanParameters {
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
    payments_already_made: u32,
    start_year: i32,
}

/// Unvalidated wire form of [`LoanParameters`].
#[derive(Deserialize)]
struct LoanTerms {
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
    #[serde(default)]
    payments_already_made: u32,
    start_year: i32,
}

impl TryFrom<LoanTerms> for LoanParameters {
    type Error = MortgageError;

    fn try_from(t: LoanTerms) -> Result<Self, Self::Error> {
        LoanParameters::new(
            t.principal,
            t.annual_rate,
            t.term_years,
            t.payments_already_made,
            t.start_year,
        )
    }
}

impl LoanParameters {
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_years: u32,
        payments_already_made: u32,
        start_year: i32,
    ) -> MortgageResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Loan principal must be positive",
            ));
        }
        if annual_rate < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "annual_rate",
                "Annual rate must be >= 0 (expressed as a fraction, 0.05 = 5%)",
            ));
        }
        if term_years == 0 {
            return Err(MortgageError::invalid(
                "term_years",
                "Term must be at least one year",
            ));
        }
        if term_years > MAX_TERM_YEARS {
            return Err(MortgageError::invalid(
                "term_years",
                format!("Term of {term_years} years exceeds the {MAX_TERM_YEARS} year maximum"),
            ));
        }
        let total_payments = term_years * MONTHS_PER_YEAR;
        if payments_already_made > total_payments {
            return Err(MortgageError::invalid(
                "payments_already_made",
                format!(
                    "{payments_already_made} payments made exceeds the {total_payments} scheduled payments"
                ),
            ));
        }

        Ok(Self {
            principal,
            annual_rate,
            term_years,
            payments_already_made,
            start_year,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn payments_already_made(&self) -> u32 {
        self.payments_already_made
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn total_payments(&self) -> u32 {
        self.term_years * MONTHS_PER_YEAR
    }

    pub fn remaining_payments(&self) -> u32 {
        self.total_payments() - self.payments_already_made
    }

    pub fn monthly_rate(&self) -> Rate {
        periodic_rate(self.annual_rate, MONTHS_PER_YEAR)
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One scheduled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Loan month, 1-based from the first payment of the loan.
    pub month: u32,
    pub interest: Money,
    pub principal: Money,
    /// interest + principal. Equals the level payment except in the final
    /// month, where principal is capped at the outstanding balance.
    pub payment: Money,
    /// Balance after this payment, never negative.
    pub remaining_balance: Money,
}

/// Remaining balance at a whole number of years into the loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMilestone {
    pub years: u32,
    pub calendar_year: i32,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Level monthly payment from the annuity formula.
    pub monthly_payment: Money,
    pub monthly_rate: Rate,
    pub total_payments: u32,
    pub remaining_payments: u32,
    /// Balance before the first entry of `schedule`.
    pub opening_balance: Money,
    /// Payments still to be made, in month order.
    pub schedule: Vec<ScheduleEntry>,
    /// Running principal repaid over `schedule`; index 0 is before any payment.
    pub cumulative_principal: Vec<Money>,
    /// Running interest paid over `schedule`; index 0 is before any payment.
    pub cumulative_interest: Vec<Money>,
    /// Interest over the whole life of the loan.
    pub total_interest: Money,
    /// Interest over the payments still in `schedule`.
    pub remaining_interest: Money,
    /// principal + total_interest.
    pub total_cost: Money,
    pub balance_milestones: Vec<BalanceMilestone>,
}

impl AmortizationResult {
    /// Opening balance followed by the balance after every scheduled payment.
    pub fn balances(&self) -> Vec<Money> {
        std::iter::once(self.opening_balance)
            .chain(self.schedule.iter().map(|e| e.remaining_balance))
            .collect()
    }

    pub fn interest_series(&self) -> Vec<Money> {
        self.schedule.iter().map(|e| e.interest).collect()
    }

    pub fn principal_series(&self) -> Vec<Money> {
        self.schedule.iter().map(|e| e.principal).collect()
    }

    /// Loan month of the balance at index 0 of [`Self::balances`].
    pub fn first_month(&self) -> u32 {
        self.total_payments - self.remaining_payments
    }

    pub fn final_balance(&self) -> Money {
        self.schedule
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(self.opening_balance)
    }
}

/// Fractional calendar year at which loan month `month` falls.
pub fn calendar_year(month: u32, start_year: i32) -> f64 {
    f64::from(start_year) + f64::from(month) / f64::from(MONTHS_PER_YEAR)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the amortization schedule wrapped in the computation envelope.
pub fn build_schedule(
    params: &LoanParameters,
) -> MortgageResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();

    let result = amortize(params)?;

    let mut warnings: Vec<String> = Vec::new();
    if params.annual_rate.is_zero() {
        warnings.push("Zero interest rate: principal is repaid in equal instalments".into());
    }
    if params.annual_rate > HIGH_RATE_WARNING {
        let pct = params
            .annual_rate
            .checked_mul(dec!(100))
            .and_then(|p| p.to_f64())
            .unwrap_or(f64::NAN);
        warnings.push(format!(
            "Annual rate of {pct:.2}% is unusually high; rates are fractions (0.05 = 5%)"
        ));
    }
    if result.schedule.is_empty() {
        warnings.push("All scheduled payments already made; schedule is empty".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortization (monthly compounding)",
        params,
        warnings,
        elapsed,
        result,
    ))
}

/// Amortize the loan month by month.
///
/// The balance is advanced through payments already made without recording
/// them; the remaining months form the schedule. The final payment's
/// principal is capped at the outstanding balance so the loan closes at
/// exactly zero.
pub fn amortize(params: &LoanParameters) -> MortgageResult<AmortizationResult> {
    let monthly_rate = params.monthly_rate();
    let total_payments = params.total_payments();
    let made = params.payments_already_made;
    let remaining_payments = params.remaining_payments();

    let monthly_payment = annuity_payment(monthly_rate, total_payments, params.principal)?;

    log::debug!(
        "amortizing {} at monthly rate {} over {} payments ({} already made): payment {}",
        params.principal,
        monthly_rate,
        total_payments,
        made,
        monthly_payment
    );

    let capacity = remaining_payments as usize;
    let mut schedule = Vec::with_capacity(capacity);
    let mut cumulative_principal = Vec::with_capacity(capacity + 1);
    let mut cumulative_interest = Vec::with_capacity(capacity + 1);
    cumulative_principal.push(Decimal::ZERO);
    cumulative_interest.push(Decimal::ZERO);

    let mut balance = params.principal;
    let mut opening_balance = params.principal;
    let mut total_interest = Decimal::ZERO;
    let mut remaining_interest = Decimal::ZERO;
    let mut paid_principal = Decimal::ZERO;

    for month in 1..=total_payments {
        let interest = balance.checked_mul(monthly_rate).ok_or_else(too_large)?;
        let principal_paid = if month == total_payments {
            balance
        } else {
            (monthly_payment - interest).min(balance)
        };
        balance -= principal_paid;
        total_interest = total_interest.checked_add(interest).ok_or_else(too_large)?;

        if month <= made {
            if month == made {
                opening_balance = balance;
            }
            continue;
        }

        remaining_interest = remaining_interest
            .checked_add(interest)
            .ok_or_else(too_large)?;
        paid_principal += principal_paid;
        cumulative_principal.push(paid_principal);
        cumulative_interest.push(remaining_interest);

        schedule.push(ScheduleEntry {
            month,
            interest,
            principal: principal_paid,
            payment: interest + principal_paid,
            remaining_balance: balance.max(Decimal::ZERO),
        });
    }

    let balance_milestones = milestones(params, opening_balance, &schedule);

    Ok(AmortizationResult {
        monthly_payment,
        monthly_rate,
        total_payments,
        remaining_payments,
        opening_balance,
        schedule,
        cumulative_principal,
        cumulative_interest,
        total_interest,
        remaining_interest,
        total_cost: params
            .principal
            .checked_add(total_interest)
            .ok_or_else(too_large)?,
        balance_milestones,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn too_large() -> MortgageError {
    MortgageError::invalid("principal", "Loan totals exceed the representable range")
}

fn milestones(
    params: &LoanParameters,
    opening_balance: Money,
    schedule: &[ScheduleEntry],
) -> Vec<BalanceMilestone> {
    let made = params.payments_already_made;

    MILESTONE_YEARS
        .iter()
        .filter(|&&years| years <= params.term_years)
        .filter_map(|&years| {
            let month = years * MONTHS_PER_YEAR;
            if month < made {
                return None;
            }
            let balance = if month == made {
                opening_balance
            } else {
                schedule.get((month - made - 1) as usize)?.remaining_balance
            };
            Some(BalanceMilestone {
                years,
                calendar_year: params.start_year + years as i32,
                balance,
            })
        })
        .collect()
}
