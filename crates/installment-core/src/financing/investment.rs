use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InstallmentError;
use crate::time_value::{annuity_payment, present_value};
use crate::types::{Money, Periods, Rate};
use crate::InstallmentResult;

use super::input::FinancingInput;

/// Whether investing the cash price covers every installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentOutcome {
    Surplus,
    Shortfall,
}

/// Balance movement for one period of the drawdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPeriod {
    pub period: Periods,
    pub beginning_balance: Money,
    pub investment_return: Money,
    pub payment: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSimulation {
    pub investment_rate: Rate,
    pub initial_balance: Money,
    pub total_investment_return: Money,
    pub final_balance: Money,
    pub outcome: InvestmentOutcome,
    /// Left over after the last installment, zero on a shortfall.
    pub surplus: Money,
    /// Extra funds needed to finish paying, zero on a surplus.
    pub shortfall: Money,
    /// Installments discounted at the investment rate. The final balance is
    /// `(initial_balance - installments_present_value) * (1 + rate)^n`.
    pub installments_present_value: Money,
    /// Largest level installment the invested cash price can pay off.
    pub sustainable_payment: Money,
    pub periods: Vec<InvestmentPeriod>,
}

/// Invest the cash price at the alternative rate and pay each installment out
/// of the balance: grow first, then pay.
pub fn simulate_investment(input: &FinancingInput) -> InstallmentResult<InvestmentSimulation> {
    input.validate()?;

    let rate = input.periodic_investment_rate.ok_or_else(|| {
        InstallmentError::invalid(
            "periodic_investment_rate",
            "periodic_investment_rate is required for the investment simulation",
        )
    })?;

    let payment = input.nominal_payment();
    let mut balance = input.cash_price;
    let mut total_investment_return = Decimal::ZERO;
    let mut periods = Vec::with_capacity(input.installment_count as usize);

    for period in 1..=input.installment_count {
        let beginning_balance = balance;
        let investment_return = beginning_balance.checked_mul(rate).ok_or_else(|| {
            InstallmentError::overflow(format!("investment return at period {period}"))
        })?;
        balance = beginning_balance
            .checked_add(investment_return)
            .and_then(|b| b.checked_sub(payment))
            .ok_or_else(|| {
                InstallmentError::overflow(format!("investment balance at period {period}"))
            })?;
        total_investment_return = total_investment_return
            .checked_add(investment_return)
            .ok_or_else(|| InstallmentError::overflow("total investment return"))?;

        periods.push(InvestmentPeriod {
            period,
            beginning_balance,
            investment_return,
            payment,
            ending_balance: balance,
        });
    }

    let installments = vec![payment; input.installment_count as usize];
    let installments_present_value = present_value(rate, &installments)?;
    let sustainable_payment = annuity_payment(rate, input.installment_count, input.cash_price)?;

    let final_balance = balance;
    let outcome = if final_balance > Decimal::ZERO {
        InvestmentOutcome::Surplus
    } else {
        InvestmentOutcome::Shortfall
    };

    debug!(
        investment_rate = %rate,
        %final_balance,
        ?outcome,
        "simulated investment drawdown"
    );

    Ok(InvestmentSimulation {
        investment_rate: rate,
        initial_balance: input.cash_price,
        total_investment_return,
        final_balance,
        outcome,
        surplus: final_balance.max(Decimal::ZERO),
        shortfall: (-final_balance).max(Decimal::ZERO),
        installments_present_value,
        sustainable_payment,
        periods,
    })
}
