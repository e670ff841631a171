use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use installment_core::financing::{self, FinancingInput};
use installment_core::types::with_metadata;
use installment_core::InstallmentError;

use crate::input;

/// Arguments shared by every financing command
#[derive(Args, Debug, Default)]
pub struct FinancingArgs {
    /// Price if paid upfront
    #[arg(long)]
    pub cash_price: Option<Decimal>,

    /// Total price when paying in installments
    #[arg(long)]
    pub installment_total: Option<Decimal>,

    /// Number of monthly installments (1-60)
    #[arg(long, alias = "count")]
    pub installments: Option<u32>,

    /// Monthly inflation rate (e.g. 0.019 for 1.9%)
    #[arg(long, default_value = "0")]
    pub inflation_rate: Decimal,

    /// Monthly return on an alternative investment (e.g. 0.02 for 2%)
    #[arg(long)]
    pub investment_rate: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Build the input from a file, the flags, or piped JSON, in that order.
fn resolve_input(args: FinancingArgs) -> Result<FinancingInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_document(path);
    }
    if args.cash_price.is_some()
        || args.installment_total.is_some()
        || args.installments.is_some()
    {
        return from_flags(args);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(parse_piped(data)?);
    }
    Err("--cash-price, --installment-total and --installments are required \
         (or provide --input <file> or JSON on stdin)"
        .into())
}

fn parse_piped(data: Value) -> Result<FinancingInput, InstallmentError> {
    serde_json::from_value(data).map_err(InstallmentError::from)
}

fn from_flags(args: FinancingArgs) -> Result<FinancingInput, Box<dyn std::error::Error>> {
    Ok(FinancingInput {
        cash_price: args
            .cash_price
            .ok_or("--cash-price is required (or provide --input)")?,
        installment_total: args
            .installment_total
            .ok_or("--installment-total is required (or provide --input)")?,
        installment_count: args
            .installments
            .ok_or("--installments is required (or provide --input)")?,
        periodic_inflation_rate: args.inflation_rate,
        periodic_investment_rate: args.investment_rate,
    })
}

pub fn run_compare(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fin_input = resolve_input(args)?;
    info!(
        cash_price = %fin_input.cash_price,
        installment_total = %fin_input.installment_total,
        installments = fin_input.installment_count,
        "comparing cash with installments"
    );
    let result = financing::analyze_financing(&fin_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let fin_input = resolve_input(args)?;
    let schedule = financing::build_schedule(&fin_input)?;
    let result = with_metadata(
        "Installment schedule discounted by constant monthly inflation",
        &fin_input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        schedule,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_invest(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let fin_input = resolve_input(args)?;
    if fin_input.periodic_investment_rate.is_none() {
        return Err("--investment-rate is required for the investment simulation".into());
    }
    let simulation = financing::simulate_investment(&fin_input)?;
    let result = with_metadata(
        "Investment drawdown (grow the cash price, then pay each installment)",
        &fin_input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        simulation,
    );
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flag_args() -> FinancingArgs {
        FinancingArgs {
            cash_price: Some(dec!(4_500_000)),
            installment_total: Some(dec!(5_760_000)),
            installments: Some(24),
            inflation_rate: dec!(0.019),
            investment_rate: None,
            input: None,
        }
    }

    #[test]
    fn test_compare_from_flags() {
        let value = run_compare(flag_args()).unwrap();
        assert_eq!(value["result"]["recommendation"], "Cash");
        assert_eq!(value["result"]["summary"]["installment_count"], 24);
    }

    #[test]
    fn test_missing_installments_flag() {
        let mut args = flag_args();
        args.installments = None;
        let err = run_compare(args).unwrap_err();
        assert!(err.to_string().contains("--installments"));
    }

    #[test]
    fn test_lone_installments_flag_asks_for_cash_price() {
        let args = FinancingArgs {
            installments: Some(24),
            ..FinancingArgs::default()
        };
        let err = resolve_input(args).unwrap_err();
        assert!(err.to_string().contains("--cash-price is required"), "err={}", err);
    }

    #[test]
    fn test_piped_document_errors_are_serialization_errors() {
        let err = parse_piped(serde_json::json!({"cash_price": "abc"})).unwrap_err();
        assert!(matches!(err, InstallmentError::SerializationError(_)));

        let ok = parse_piped(serde_json::json!({
            "cash_price": "1000",
            "installment_total": "1200",
            "installment_count": 12
        }))
        .unwrap();
        assert_eq!(ok.installment_count, 12);
    }

    #[test]
    fn test_overflow_is_reported_not_raised() {
        let mut args = flag_args();
        args.installments = Some(60);
        args.inflation_rate = dec!(3);
        let err = run_compare(args).unwrap_err();
        assert!(err.to_string().contains("Arithmetic overflow"), "err={}", err);
    }

    #[test]
    fn test_schedule_envelope() {
        let value = run_schedule(flag_args()).unwrap();
        assert_eq!(value["result"]["periods"].as_array().unwrap().len(), 24);
        assert!(value["methodology"].as_str().unwrap().contains("schedule"));
    }

    #[test]
    fn test_invest_requires_rate() {
        assert!(run_invest(flag_args()).is_err());

        let mut args = flag_args();
        args.investment_rate = Some(dec!(0.02));
        let value = run_invest(args).unwrap();
        assert_eq!(value["result"]["outcome"], "Shortfall");
    }

    #[test]
    fn test_core_validation_surfaces() {
        let mut args = flag_args();
        args.cash_price = Some(Decimal::ZERO);
        let err = run_compare(args).unwrap_err();
        assert!(err.to_string().contains("cash_price"));
    }
}
