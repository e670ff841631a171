use rust_decimal::Decimal;

/// Whole-currency amount with thousands separators: $4,591,187
pub fn money(val: Decimal) -> String {
    let rounded = val.round_dp(0);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}")
    } else {
        format!("${with_commas}")
    }
}

/// Fraction as a percentage: 0.0103389 -> "1.03%"
pub fn pct(rate: Decimal, dp: u32) -> String {
    let scaled = (rate * Decimal::ONE_HUNDRED).round_dp(dp);
    format!("{:.*}%", dp as usize, scaled)
}
