//! Type-safe price representation using decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paisa).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display with grouped thousands, e.g. `PKR 12,500` or
    /// `USD 19.99`.
    ///
    /// Whole amounts are printed without a fractional part.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let text = rounded.abs().to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        if fraction.is_empty() {
            format!("{} {sign}{grouped}", self.currency_code.code())
        } else {
            format!("{} {sign}{grouped}.{fraction:0<2}", self.currency_code.code())
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    PKR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PKR => "PKR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkr(amount: Decimal) -> String {
        Price::new(amount, CurrencyCode::PKR).display()
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(pkr(Decimal::from(1_000)), "PKR 1,000");
        assert_eq!(pkr(Decimal::from(1_234_567)), "PKR 1,234,567");
        assert_eq!(pkr(Decimal::from(999)), "PKR 999");
        assert_eq!(pkr(Decimal::ZERO), "PKR 0");
    }

    #[test]
    fn test_display_keeps_two_fraction_digits() {
        assert_eq!(pkr(Decimal::new(1_999, 2)), "PKR 19.99");
        assert_eq!(pkr(Decimal::new(125, 1)), "PKR 12.50");
        assert_eq!(pkr(Decimal::new(10_005, 3)), "PKR 10.01");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(
            Price::new(Decimal::from(-2_500), CurrencyCode::USD).display(),
            "USD -2,500"
        );
    }
}
