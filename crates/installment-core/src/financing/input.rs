use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InstallmentError;
use crate::types::{Money, Periods, Rate};
use crate::InstallmentResult;

/// Longest installment plan the comparator accepts.
pub const MAX_INSTALLMENTS: Periods = 60;

/// Per-period rates above this are accepted but flagged in warnings.
pub const RECOMMENDED_MAX_RATE: Rate = dec!(0.20);

/// A purchase that can be paid in cash or in equal monthly installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingInput {
    /// Price if paid upfront.
    pub cash_price: Money,
    /// Sum of all installments.
    pub installment_total: Money,
    pub installment_count: Periods,
    /// Expected inflation per period, used as the discount rate.
    #[serde(default)]
    pub periodic_inflation_rate: Rate,
    /// Return available on the cash if it were invested instead. Supplying it
    /// requests the investment simulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic_investment_rate: Option<Rate>,
}

impl FinancingInput {
    /// Reject any input outside the documented domain before computing.
    pub fn validate(&self) -> InstallmentResult<()> {
        if self.cash_price <= Decimal::ZERO {
            return Err(InstallmentError::invalid(
                "cash_price",
                "cash_price must be > 0",
            ));
        }
        if self.installment_total <= Decimal::ZERO {
            return Err(InstallmentError::invalid(
                "installment_total",
                "installment_total must be > 0",
            ));
        }
        if self.installment_count == 0 {
            return Err(InstallmentError::invalid(
                "installment_count",
                "installment_count must be >= 1",
            ));
        }
        if self.installment_count > MAX_INSTALLMENTS {
            return Err(InstallmentError::invalid(
                "installment_count",
                format!("installment_count must be <= {MAX_INSTALLMENTS}"),
            ));
        }
        if self.periodic_inflation_rate < Decimal::ZERO {
            return Err(InstallmentError::invalid(
                "periodic_inflation_rate",
                "periodic_inflation_rate must be >= 0",
            ));
        }
        if let Some(rate) = self.periodic_investment_rate {
            if rate < Decimal::ZERO {
                return Err(InstallmentError::invalid(
                    "periodic_investment_rate",
                    "periodic_investment_rate must be >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Face value of each installment.
    pub fn nominal_payment(&self) -> Money {
        self.installment_total / Decimal::from(self.installment_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> FinancingInput {
        FinancingInput {
            cash_price: dec!(4_500_000),
            installment_total: dec!(5_760_000),
            installment_count: 24,
            periodic_inflation_rate: dec!(0.019),
            periodic_investment_rate: None,
        }
    }

    fn rejected_field(input: &FinancingInput) -> String {
        match input.validate() {
            Err(InstallmentError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_zero_cash_price_rejected() {
        let mut input = valid_input();
        input.cash_price = Decimal::ZERO;
        assert_eq!(rejected_field(&input), "cash_price");
    }

    #[test]
    fn test_negative_installment_total_rejected() {
        let mut input = valid_input();
        input.installment_total = dec!(-1);
        assert_eq!(rejected_field(&input), "installment_total");
    }

    #[test]
    fn test_installment_count_bounds() {
        let mut input = valid_input();
        input.installment_count = 0;
        assert_eq!(rejected_field(&input), "installment_count");

        input.installment_count = MAX_INSTALLMENTS + 1;
        assert_eq!(rejected_field(&input), "installment_count");

        input.installment_count = MAX_INSTALLMENTS;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_negative_rates_rejected() {
        let mut input = valid_input();
        input.periodic_inflation_rate = dec!(-0.01);
        assert_eq!(rejected_field(&input), "periodic_inflation_rate");

        let mut input = valid_input();
        input.periodic_investment_rate = Some(dec!(-0.02));
        assert_eq!(rejected_field(&input), "periodic_investment_rate");
    }

    #[test]
    fn test_nominal_payment() {
        assert_eq!(valid_input().nominal_payment(), dec!(240_000));
    }

    #[test]
    fn test_deserialize_defaults_rates() {
        let input: FinancingInput = serde_json::from_str(
            r#"{"cash_price": "1000", "installment_total": "1200", "installment_count": 12}"#,
        )
        .unwrap();
        assert_eq!(input.periodic_inflation_rate, Decimal::ZERO);
        assert_eq!(input.periodic_investment_rate, None);
    }
}
