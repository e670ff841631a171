use napi::Result as NapiResult;
use napi_derive::napi;

use installment_core::financing::{self, FinancingInput};
use installment_core::InstallmentError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_input(input_json: &str) -> NapiResult<FinancingInput> {
    serde_json::from_str(input_json)
        .map_err(InstallmentError::from)
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Financing comparator
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_summary(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = financing::compute_summary(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = financing::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_investment(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = financing::simulate_investment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_financing(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = financing::analyze_financing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
