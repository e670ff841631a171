use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use crate::types::{with_metadata, ComputationOutput, Money};
use crate::InstallmentResult;

use super::comparator::{compute_summary, FinancingSummary, Recommendation};
use super::input::{FinancingInput, RECOMMENDED_MAX_RATE};
use super::investment::{simulate_investment, InvestmentOutcome, InvestmentSimulation};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One line of the side-by-side cash vs installments comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub concept: String,
    pub cash: Money,
    pub installments: Money,
    /// installments - cash
    pub difference: Money,
}

/// Top-level output from `analyze_financing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingAnalysis {
    pub recommendation: Recommendation,
    pub summary: FinancingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment: Option<InvestmentSimulation>,
    pub comparison: Vec<ComparisonRow>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Full cash vs installments analysis: summary, schedule, the optional
/// investment drawdown and the comparison table, wrapped in the standard
/// envelope with warnings.
pub fn analyze_financing(
    input: &FinancingInput,
) -> InstallmentResult<ComputationOutput<FinancingAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = compute_summary(input)?;
    let investment = match input.periodic_investment_rate {
        Some(_) => Some(simulate_investment(input)?),
        None => None,
    };

    if summary.monthly_financing_rate < input.periodic_inflation_rate
        && summary.recommendation == Recommendation::Cash
    {
        warnings.push(format!(
            "Financing rate ({}) is below inflation ({}) but the {} overprice is too large \
             for inflation to offset; installments still cost more in real terms",
            summary.monthly_financing_rate.round_dp(4),
            input.periodic_inflation_rate,
            summary.overprice_pct.round_dp(4),
        ));
    }
    if input.periodic_inflation_rate > RECOMMENDED_MAX_RATE {
        warnings.push(format!(
            "Inflation rate {} per period exceeds the recommended maximum of {}",
            input.periodic_inflation_rate, RECOMMENDED_MAX_RATE
        ));
    }
    if let Some(rate) = input.periodic_investment_rate {
        if rate > RECOMMENDED_MAX_RATE {
            warnings.push(format!(
                "Investment rate {} per period exceeds the recommended maximum of {}",
                rate, RECOMMENDED_MAX_RATE
            ));
        }
    }
    if summary.overprice < Decimal::ZERO {
        warnings.push("Installment total is below the cash price; installments carry a discount".into());
    }
    if let Some(sim) = &investment {
        if sim.outcome == InvestmentOutcome::Shortfall && sim.shortfall > Decimal::ZERO {
            warnings.push(format!(
                "Investing the cash price does not cover the installments; {} more is needed",
                sim.shortfall.round_dp(2)
            ));
        }
    }
    for w in &warnings {
        warn!("{}", w);
    }

    let comparison = build_comparison(&summary);
    let output = FinancingAnalysis {
        recommendation: summary.recommendation,
        summary,
        investment,
        comparison,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cash vs installments (inflation-discounted present value of equal installments)",
        &serde_json::json!({
            "cash_price": input.cash_price.to_string(),
            "installment_total": input.installment_total.to_string(),
            "installment_count": input.installment_count,
            "periodic_inflation_rate": input.periodic_inflation_rate.to_string(),
            "periodic_investment_rate": input.periodic_investment_rate.map(|r| r.to_string()),
            "discounting": "end of period, constant rate",
            "tie_break": "cash",
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn build_comparison(summary: &FinancingSummary) -> Vec<ComparisonRow> {
    vec![
        ComparisonRow {
            concept: "total_payment".into(),
            cash: summary.cash_price,
            installments: summary.installment_total,
            difference: summary.overprice,
        },
        ComparisonRow {
            concept: "present_value".into(),
            cash: summary.cash_price,
            installments: summary.present_value_of_installments,
            difference: summary.real_difference,
        },
        ComparisonRow {
            concept: "monthly_rate".into(),
            cash: Decimal::ZERO,
            installments: summary.monthly_financing_rate,
            difference: summary.monthly_financing_rate - summary.periodic_inflation_rate,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
