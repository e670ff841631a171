use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::InstallmentError;
use crate::types::{Money, Periods, Rate};
use crate::InstallmentResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.00000000000000000001);
const MAX_ROOT_ITERATIONS: u32 = 100;

/// Raise `base` to an integer power by repeated multiplication.
///
/// `Decimal::powd` goes through `exp(ln(x) * y)` and drifts in the last
/// digits; exact multiplication keeps schedules reproducible. Fails with
/// `Overflow` once the power leaves the `Decimal` range.
pub fn pow_n(base: Decimal, n: Periods) -> InstallmentResult<Decimal> {
    let mut result = Decimal::ONE;
    for k in 1..=n {
        result = result
            .checked_mul(base)
            .ok_or_else(|| InstallmentError::overflow(format!("{}^{}", base, k)))?;
    }
    Ok(result)
}

/// Compute (1 + r)^n.
pub fn compound(rate: Rate, n: Periods) -> InstallmentResult<Decimal> {
    pow_n(Decimal::ONE + rate, n)
}

/// Present value of a payment stream where `payments[k - 1]` falls at the end
/// of period `k`.
pub fn present_value(rate: Rate, payments: &[Money]) -> InstallmentResult<Money> {
    if rate <= dec!(-1) {
        return Err(InstallmentError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, payment) in payments.iter().enumerate() {
        discount = discount.checked_mul(one_plus_r).ok_or_else(|| {
            InstallmentError::overflow(format!("present value discount factor at period {}", t + 1))
        })?;
        if discount.is_zero() {
            return Err(InstallmentError::DivisionByZero {
                context: format!("present value discount factor at period {}", t + 1),
            });
        }
        result += payment / discount;
    }

    Ok(result)
}

/// Positive real n-th root of a positive value.
///
/// Starts from `powd` and polishes with Newton steps on `x^n - value`, using
/// exact integer powers, so `root^n` reproduces `value` to ~20 digits.
pub fn nth_root(value: Decimal, n: Periods) -> InstallmentResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(InstallmentError::InvalidInput {
            field: "value".into(),
            reason: "n-th root requires a positive value".into(),
        });
    }
    if n == 0 {
        return Err(InstallmentError::InvalidInput {
            field: "n".into(),
            reason: "Root degree must be > 0".into(),
        });
    }
    if n == 1 || value == Decimal::ONE {
        return Ok(value);
    }

    let n_dec = Decimal::from(n);
    let mut x = value
        .checked_powd(Decimal::ONE / n_dec)
        .filter(|guess| *guess > Decimal::ZERO)
        .unwrap_or_else(|| Decimal::ONE + (value - Decimal::ONE) / n_dec);

    for _ in 0..MAX_ROOT_ITERATIONS {
        let x_pow = pow_n(x, n - 1)?;
        if x_pow.is_zero() {
            return Err(InstallmentError::DivisionByZero {
                context: "n-th root derivative".into(),
            });
        }
        let residual = x_pow
            .checked_mul(x)
            .and_then(|p| p.checked_sub(value))
            .ok_or_else(|| InstallmentError::overflow("n-th root residual"))?;
        let slope = n_dec
            .checked_mul(x_pow)
            .ok_or_else(|| InstallmentError::overflow("n-th root derivative"))?;
        let delta = residual / slope;
        x -= delta;
        if delta.abs() < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    Ok(x)
}

/// Level payment over `n` periods whose present value at `rate` equals
/// `principal`.
pub fn annuity_payment(rate: Rate, n: Periods, principal: Money) -> InstallmentResult<Money> {
    if n == 0 {
        return Err(InstallmentError::InvalidInput {
            field: "n".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let factor = compound(rate, n)?;
    if factor.is_zero() {
        return Err(InstallmentError::DivisionByZero {
            context: "annuity compound factor".into(),
        });
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor) / rate;
    if annuity_factor.is_zero() {
        return Err(InstallmentError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    Ok(principal / annuity_factor)
}
