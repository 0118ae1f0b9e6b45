use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Money type with 8 decimal places precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(8))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(8)))
    }

    /// create from integer amount (rupees, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// check if strictly negative (negative zero is not)
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// add, clamping at the bounds of `Decimal`
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0).round_dp(8))
    }

    /// fraction of this amount (e.g., 0.5 of a salary), clamped on overflow
    pub fn fraction(&self, ratio: Decimal) -> Self {
        Money(self.0.saturating_mul(ratio).round_dp(8))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(8))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(8);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(8))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(8);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(8))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(8))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// rate type for interest rates and ratios, stored as a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.12 for 12%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 12 for 12%)
    pub fn from_percentage<D: Into<Decimal>>(p: D) -> Self {
        Rate(p.into() / Decimal::ONE_HUNDRED)
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0.saturating_mul(Decimal::ONE_HUNDRED).normalize()
    }

    /// check if negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

/// credit score on a 0 to 100 scale; fractional because of the volume term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Score(Decimal);

impl Score {
    pub const ZERO: Score = Score(Decimal::ZERO);
    pub const MAX: Score = Score(Decimal::ONE_HUNDRED);

    pub fn from_decimal(d: Decimal) -> Self {
        Score(d)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// cap at the given ceiling
    pub fn cap(self, ceiling: Decimal) -> Self {
        Score(self.0.min(ceiling))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<i32> for Score {
    fn from(i: i32) -> Self {
        Score(Decimal::from(i))
    }
}

/// serde adapter carrying a `Rate` as a percentage on the wire (`12` for 12%)
///
/// Written as a json number; read from a number or a string.
pub mod percent {
    use super::Rate;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rate: &Rate, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&rate.as_percentage(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rate, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Rate::from_percentage)
    }

    /// same adapter for optional rates
    pub mod option {
        use super::Rate;
        use rust_decimal::Decimal;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(rate: &Option<Rate>, serializer: S) -> Result<S::Ok, S::Error> {
            rust_decimal::serde::float_option::serialize(&rate.map(|r| r.as_percentage()), serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rate>, D::Error> {
            Ok(Option::<Decimal>::deserialize(deserializer)?.map(Rate::from_percentage))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.123456789").unwrap();
        assert_eq!(m.to_string(), "100.12345679"); // rounded to 8 places
    }

    #[test]
    fn test_money_sum() {
        let total: Money = vec![Money::from_major(5_000), Money::from_major(7_500)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_major(12_500));

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert_eq!(empty, Money::ZERO);
    }

    #[test]
    fn test_negative_zero_is_not_negative() {
        assert!(!Money::from_decimal(dec!(-0)).is_negative());
        assert!(Money::from_decimal(dec!(-0.01)).is_negative());
    }

    #[test]
    fn test_rate_percentage() {
        let rate = Rate::from_percentage(12);
        assert_eq!(rate.as_decimal(), dec!(0.12));
        assert_eq!(rate.as_percentage(), dec!(12));
        assert_eq!(rate.to_string(), "12%");

        let fractional = Rate::from_percentage(dec!(12.5));
        assert_eq!(fractional.as_decimal(), dec!(0.125));
        assert!(fractional > rate);
    }

    #[test]
    fn test_score_cap() {
        let score = Score::from_decimal(dec!(118));
        assert_eq!(score.cap(dec!(100)), Score::MAX);
        assert_eq!(Score::from(40).cap(dec!(100)), Score::from(40));
    }

    #[test]
    fn test_percent_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Wire {
            #[serde(with = "percent")]
            rate: Rate,
        }

        let wire: Wire = serde_json::from_str(r#"{"rate": 16}"#).unwrap();
        assert_eq!(wire.rate, Rate::from_percentage(16));

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["rate"], serde_json::json!(16.0));
        assert!(json["rate"].is_number());

        let fractional: Wire = serde_json::from_str(r#"{"rate": 12.5}"#).unwrap();
        assert_eq!(fractional.rate, Rate::from_percentage(dec!(12.5)));
        let quoted: Wire = serde_json::from_str(r#"{"rate": "16.93"}"#).unwrap();
        assert_eq!(quoted.rate, Rate::from_percentage(dec!(16.93)));
    }

    #[test]
    fn test_saturating_arithmetic() {
        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.saturating_add(Money::from_major(1)), max);
        assert_eq!(max.fraction(dec!(2)), max);
        assert_eq!(Money::from_major(50_000).fraction(dec!(0.5)), Money::from_major(25_000));
    }
}
