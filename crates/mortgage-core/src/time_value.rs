use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Payment periods in a year for monthly amortization.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Periodic rate for a nominal annual rate compounded `periods_per_year` times.
pub fn periodic_rate(annual_rate: Rate, periods_per_year: u32) -> Rate {
    annual_rate / Decimal::from(periods_per_year)
}

/// Level payment that fully repays `principal` over `nper` periods.
///
/// Uses the annuity formula `P * r(1+r)^n / ((1+r)^n - 1)`. At a zero rate
/// the formula is undefined, so the payment is straight-line `P / n`.
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }
    if rate < Decimal::ZERO {
        return Err(MortgageError::invalid("rate", "Periodic rate must be >= 0"));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let growth = (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| MortgageError::invalid("rate", "Compounded growth overflows"))?;
    let denominator = growth - Decimal::ONE;

    // (1+r)^n rounds to 1 only for rates far below any real mortgage rate
    if denominator <= Decimal::ZERO {
        return Ok(principal / Decimal::from(nper));
    }

    // Payment per unit of principal first; P * r * (1+r)^n overflows long
    // before the payment itself does.
    let per_unit = rate
        .checked_mul(growth)
        .and_then(|g| g.checked_div(denominator))
        .ok_or_else(|| MortgageError::invalid("rate", "Compounded growth overflows"))?;
    principal
        .checked_mul(per_unit)
        .ok_or_else(|| MortgageError::invalid("principal", "Payment exceeds the representable range"))
}
