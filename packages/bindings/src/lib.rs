use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_core::amortization::schedule::{self, LoanParameters};
use mortgage_core::amortization::summary;
use mortgage_core::Currency;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_params(input_json: &str) -> NapiResult<LoanParameters> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization_schedule(input_json: String) -> NapiResult<String> {
    let input = parse_params(&input_json)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn render_mortgage_summary(input_json: String, currency: Option<String>) -> NapiResult<String> {
    let input = parse_params(&input_json)?;
    let currency: Currency = match currency {
        Some(code) => code.parse().map_err(to_napi_error)?,
        None => Currency::default(),
    };
    let result = schedule::amortize(&input).map_err(to_napi_error)?;
    Ok(summary::render_summary(&input, &result, currency))
}
