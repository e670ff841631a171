use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InstallmentError;
use crate::time_value::{compound, nth_root};
use crate::types::{Money, Periods, Rate};
use crate::InstallmentResult;

use super::input::FinancingInput;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which way of paying is cheaper in today's money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Cash,
    Installments,
}

impl Recommendation {
    /// Installments win only when strictly cheaper; ties go to cash.
    pub fn from_present_value(present_value: Money, cash_price: Money) -> Self {
        if present_value < cash_price {
            Recommendation::Installments
        } else {
            Recommendation::Cash
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Cash => "cash",
            Recommendation::Installments => "installments",
        }
    }
}

/// One installment, in face value and in today's money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPeriod {
    pub period: Periods,
    pub nominal_payment: Money,
    /// (1 + inflation)^period
    pub inflation_factor: Decimal,
    pub present_value: Money,
    pub cumulative_nominal: Money,
    pub cumulative_present_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub nominal_payment: Money,
    pub total_nominal: Money,
    pub total_present_value: Money,
    pub periods: Vec<InstallmentPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub cash_price: Money,
    pub installment_total: Money,
    pub installment_count: Periods,
    pub periodic_inflation_rate: Rate,
    pub overprice: Money,
    pub overprice_pct: Rate,
    pub nominal_payment: Money,
    pub monthly_financing_rate: Rate,
    pub present_value_of_installments: Money,
    pub inflation_savings: Money,
    pub real_difference: Money,
    pub real_difference_pct: Rate,
    /// Positive when installments are cheaper in real terms.
    pub installment_benefit: Money,
    /// Installment total whose present value equals the cash price.
    pub breakeven_installment_total: Money,
    pub recommendation: Recommendation,
    pub schedule: InstallmentSchedule,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Discount every installment by inflation and accumulate running totals.
pub fn build_schedule(input: &FinancingInput) -> InstallmentResult<InstallmentSchedule> {
    input.validate()?;

    let nominal_payment = input.nominal_payment();
    let mut periods = Vec::with_capacity(input.installment_count as usize);
    let mut cumulative_nominal = Decimal::ZERO;
    let mut cumulative_present_value = Decimal::ZERO;

    for period in 1..=input.installment_count {
        let inflation_factor = compound(input.periodic_inflation_rate, period)?;
        let present_value = nominal_payment / inflation_factor;
        cumulative_nominal += nominal_payment;
        cumulative_present_value += present_value;

        periods.push(InstallmentPeriod {
            period,
            nominal_payment,
            inflation_factor,
            present_value,
            cumulative_nominal,
            cumulative_present_value,
        });
    }

    Ok(InstallmentSchedule {
        nominal_payment,
        total_nominal: cumulative_nominal,
        total_present_value: cumulative_present_value,
        periods,
    })
}

/// Compare the cash price with the inflation-adjusted installment stream.
pub fn compute_summary(input: &FinancingInput) -> InstallmentResult<FinancingSummary> {
    input.validate()?;

    let cash_price = input.cash_price;
    let installment_total = input.installment_total;

    let price_ratio = installment_total
        .checked_div(cash_price)
        .ok_or_else(|| InstallmentError::overflow("installment total / cash price"))?;
    let overprice = installment_total - cash_price;
    let overprice_pct = overprice / cash_price;

    // Rate r such that cash_price * (1 + r)^n == installment_total
    let growth = nth_root(price_ratio, input.installment_count)?;
    let monthly_financing_rate = growth - Decimal::ONE;

    let schedule = build_schedule(input)?;
    let present_value_of_installments = schedule.total_present_value;

    let inflation_savings = installment_total - present_value_of_installments;
    let real_difference = present_value_of_installments - cash_price;
    let real_difference_pct = real_difference / cash_price;
    let installment_benefit = cash_price - present_value_of_installments;

    // PV is linear in the installment total
    let breakeven_installment_total = installment_total
        .checked_div(present_value_of_installments)
        .and_then(|scale| cash_price.checked_mul(scale))
        .ok_or_else(|| InstallmentError::overflow("break-even installment total"))?;

    let recommendation =
        Recommendation::from_present_value(present_value_of_installments, cash_price);

    debug!(
        %cash_price,
        %installment_total,
        installment_count = input.installment_count,
        %present_value_of_installments,
        %monthly_financing_rate,
        recommendation = recommendation.label(),
        "computed financing summary"
    );

    Ok(FinancingSummary {
        cash_price,
        installment_total,
        installment_count: input.installment_count,
        periodic_inflation_rate: input.periodic_inflation_rate,
        overprice,
        overprice_pct,
        nominal_payment: schedule.nominal_payment,
        monthly_financing_rate,
        present_value_of_installments,
        inflation_savings,
        real_difference,
        real_difference_pct,
        installment_benefit,
        breakeven_installment_total,
        recommendation,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::present_value;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn default_input() -> FinancingInput {
        FinancingInput {
            cash_price: dec!(4_500_000),
            installment_total: dec!(5_760_000),
            installment_count: 24,
            periodic_inflation_rate: dec!(0.019),
            periodic_investment_rate: None,
        }
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_overprice_metrics() {
        let summary = compute_summary(&default_input()).unwrap();
        assert_eq!(summary.overprice, dec!(1_260_000));
        assert_eq!(summary.overprice_pct, dec!(0.28));
        assert_eq!(summary.nominal_payment, dec!(240_000));
    }

    #[test]
    fn test_monthly_financing_rate_near_one_percent() {
        let summary = compute_summary(&default_input()).unwrap();
        // 1.28^(1/24) - 1 ≈ 1.0339%
        assert_close(summary.monthly_financing_rate, dec!(0.010339), dec!(0.000001));
    }

    #[test]
    fn test_monthly_financing_rate_round_trip() {
        let input = default_input();
        let summary = compute_summary(&input).unwrap();
        let grown = input.cash_price * compound(summary.monthly_financing_rate, 24).unwrap();
        let relative = ((grown - input.installment_total) / input.installment_total).abs();
        assert!(relative < dec!(0.000000001), "relative error {}", relative);
    }

    #[test]
    fn test_schedule_shape() {
        let schedule = build_schedule(&default_input()).unwrap();
        assert_eq!(schedule.periods.len(), 24);
        assert_eq!(schedule.periods[0].period, 1);
        assert_eq!(schedule.periods[23].period, 24);
        for row in &schedule.periods {
            assert_eq!(row.nominal_payment, dec!(240_000));
            assert!(row.present_value <= row.nominal_payment);
        }
        let last = schedule.periods.last().unwrap();
        assert_eq!(last.cumulative_nominal, schedule.total_nominal);
        assert_eq!(last.cumulative_present_value, schedule.total_present_value);
        assert_eq!(schedule.total_nominal, dec!(5_760_000));
    }

    #[test]
    fn test_present_value_matches_time_value_helper() {
        let input = default_input();
        let summary = compute_summary(&input).unwrap();
        let expected = present_value(dec!(0.019), &vec![dec!(240_000); 24]).unwrap();
        assert_close(summary.present_value_of_installments, expected, dec!(0.0000001));
    }

    #[test]
    fn test_inflation_scenario_recommends_cash() {
        // 240k/month for 24 months at 1.9% inflation is worth ~4.59M today
        let summary = compute_summary(&default_input()).unwrap();
        assert!(summary.present_value_of_installments > dec!(4_500_000));
        assert!(summary.present_value_of_installments < dec!(4_600_000));
        assert_eq!(summary.recommendation, Recommendation::Cash);
        assert!(summary.real_difference > Decimal::ZERO);
        assert_eq!(summary.installment_benefit, -summary.real_difference);
        assert_eq!(
            summary.inflation_savings,
            dec!(5_760_000) - summary.present_value_of_installments
        );
    }

    #[test]
    fn test_zero_inflation_present_value_equals_total() {
        let mut input = default_input();
        input.periodic_inflation_rate = Decimal::ZERO;
        let summary = compute_summary(&input).unwrap();
        assert_eq!(summary.present_value_of_installments, dec!(5_760_000));
        assert_eq!(summary.inflation_savings, Decimal::ZERO);
        assert_eq!(summary.recommendation, Recommendation::Cash);
    }

    #[test]
    fn test_single_installment_at_cash_price() {
        let input = FinancingInput {
            cash_price: dec!(1000),
            installment_total: dec!(1000),
            installment_count: 1,
            periodic_inflation_rate: dec!(0.05),
            periodic_investment_rate: None,
        };
        let summary = compute_summary(&input).unwrap();
        assert_eq!(summary.overprice, Decimal::ZERO);
        assert_eq!(summary.monthly_financing_rate, Decimal::ZERO);
        assert_eq!(summary.present_value_of_installments, dec!(1000) / dec!(1.05));
        assert_eq!(summary.recommendation, Recommendation::Installments);
    }

    #[test]
    fn test_tie_resolves_to_cash() {
        let input = FinancingInput {
            cash_price: dec!(1000),
            installment_total: dec!(1000),
            installment_count: 10,
            periodic_inflation_rate: Decimal::ZERO,
            periodic_investment_rate: None,
        };
        let summary = compute_summary(&input).unwrap();
        assert_eq!(summary.present_value_of_installments, summary.cash_price);
        assert_eq!(summary.recommendation, Recommendation::Cash);
    }

    #[test]
    fn test_present_value_decreases_with_inflation() {
        let mut previous: Option<Decimal> = None;
        for rate in [dec!(0), dec!(0.005), dec!(0.01), dec!(0.019), dec!(0.05), dec!(0.2)] {
            let mut input = default_input();
            input.periodic_inflation_rate = rate;
            let pv = compute_summary(&input)
                .unwrap()
                .present_value_of_installments;
            if let Some(prev) = previous {
                assert!(pv < prev, "pv {} at rate {} not below {}", pv, rate, prev);
            }
            previous = Some(pv);
        }
    }

    #[test]
    fn test_high_inflation_recommends_installments() {
        let mut input = default_input();
        input.periodic_inflation_rate = dec!(0.05);
        let summary = compute_summary(&input).unwrap();
        assert_eq!(summary.recommendation, Recommendation::Installments);
        assert!(summary.installment_benefit > Decimal::ZERO);
    }

    #[test]
    fn test_breakeven_total_has_cash_price_present_value() {
        let input = default_input();
        let summary = compute_summary(&input).unwrap();
        let breakeven = FinancingInput {
            installment_total: summary.breakeven_installment_total,
            ..input
        };
        let pv = compute_summary(&breakeven)
            .unwrap()
            .present_value_of_installments;
        assert_close(pv, dec!(4_500_000), dec!(0.0001));
    }

    #[test]
    fn test_breakeven_total_for_large_prices() {
        let input = FinancingInput {
            cash_price: dec!(1_000_000_000_000_000),
            installment_total: dec!(1_200_000_000_000_000),
            installment_count: 12,
            periodic_inflation_rate: dec!(0.01),
            periodic_investment_rate: None,
        };
        let summary = compute_summary(&input).unwrap();
        // 1e14 a month at 1% is worth ~1.1255e15 today
        assert!(summary.present_value_of_installments > dec!(1_125_000_000_000_000));
        assert!(summary.present_value_of_installments < dec!(1_126_000_000_000_000));
        let pv = compute_summary(&FinancingInput {
            installment_total: summary.breakeven_installment_total,
            ..input
        })
        .unwrap()
        .present_value_of_installments;
        assert_close(pv, input.cash_price, dec!(0.01));
    }

    #[test]
    fn test_inflation_factor_overflow_is_an_error() {
        let mut input = default_input();
        input.installment_count = 60;
        input.periodic_inflation_rate = dec!(3);
        match build_schedule(&input) {
            Err(InstallmentError::Overflow { context }) => assert!(context.contains("^48")),
            other => panic!("expected Overflow, got {:?}", other),
        }
        assert!(matches!(
            compute_summary(&input),
            Err(InstallmentError::Overflow { .. })
        ));
    }

    #[test]
    fn test_installments_cheaper_than_cash_gives_negative_rate() {
        let mut input = default_input();
        input.installment_total = dec!(4_000_000);
        let summary = compute_summary(&input).unwrap();
        assert!(summary.overprice < Decimal::ZERO);
        assert!(summary.monthly_financing_rate < Decimal::ZERO);
        assert_eq!(summary.recommendation, Recommendation::Installments);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let mut input = default_input();
        input.cash_price = Decimal::ZERO;
        assert!(matches!(
            compute_summary(&input),
            Err(InstallmentError::InvalidInput { .. })
        ));

        let mut input = default_input();
        input.installment_count = 0;
        assert!(matches!(
            compute_summary(&input),
            Err(InstallmentError::InvalidInput { .. })
        ));
    }
}
