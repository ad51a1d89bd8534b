//! Value Objects for the storefront core

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phone number value object, stored as digits only
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 8;
    pub const MAX_DIGITS: usize = 15;

    /// Strips everything that is not an ASCII digit.
    pub fn digits_of(raw: &str) -> String { raw.chars().filter(char::is_ascii_digit).collect() }

    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits = Self::digits_of(raw);
        if digits.len() < Self::MIN_DIGITS { return Err(PhoneError::TooShort(digits.len())); }
        if digits.len() > Self::MAX_DIGITS { return Err(PhoneError::TooLong(digits.len())); }
        Ok(Self(digits))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self { value.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PhoneError { TooShort(usize), TooLong(usize) }
impl std::error::Error for PhoneError {}
impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "phone number has {n} digits, need at least {}", PhoneNumber::MIN_DIGITS),
            Self::TooLong(n) => write!(f, "phone number has {n} digits, at most {} allowed", PhoneNumber::MAX_DIGITS),
        }
    }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn multiply(&self, qty: Quantity) -> Money { Money::new(line_amount(self.amount, qty), &self.currency) }

    /// Plain rendering used in order transcripts: `1234.5 EGP`.
    pub fn plain(&self) -> String { format!("{} {}", plain_amount(self.amount), self.currency) }

    /// Decorated rendering for on-screen display: `EGP 1,234.50`.
    pub fn display(&self) -> String {
        let mut rounded = self.amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        let text = rounded.abs().to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        format!("{} {sign}{}.{fraction}", self.currency, group_thousands(whole))
    }
}

/// `unit × qty`, pinned at `Decimal::MAX` instead of overflowing.
pub fn line_amount(unit: Decimal, qty: Quantity) -> Decimal {
    unit.checked_mul(Decimal::from(qty.value())).unwrap_or(Decimal::MAX)
}

/// Sum of amounts, pinned at `Decimal::MAX` instead of overflowing.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc.checked_add(a).unwrap_or(Decimal::MAX))
}

/// Trailing zeros dropped, no exponent: `100`, `12.5`.
pub fn plain_amount(amount: Decimal) -> String { amount.normalize().to_string() }

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(','); }
        out.push(ch);
    }
    out
}

/// Quantity value object. Between one and [`Quantity::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    pub const MAX: Quantity = Quantity(9_999);

    /// Clamps into `1..=MAX`.
    pub fn new(value: i64) -> Self { Self(value.clamp(1, i64::from(Self::MAX.0)) as u32) }

    /// Reads user-typed text the way a number input does: leading integer
    /// part counts, anything non-numeric or non-positive becomes one.
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        let (negative, rest) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<i64>() {
            Ok(n) if !negative => Self::new(n),
            Err(_) if !digits.is_empty() => Self::MAX,
            _ => Self::ONE,
        }
    }

    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0).min(Self::MAX.0)) }
    pub fn increment(&self) -> Self { self.add(Self::ONE) }
    pub fn decrement(&self) -> Self { Self(self.0.saturating_sub(1).max(1)) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 { Err(QuantityError::Zero) } else { Ok(Self(value.min(Self::MAX.0))) }
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone)] pub enum QuantityError { Zero }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "quantity must be at least 1") }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_phone_normalization() {
        let phone = PhoneNumber::parse("+20 155-760-9572").unwrap();
        assert_eq!(phone.as_str(), "201557609572");
        assert_eq!(PhoneNumber::parse("1234567"), Err(PhoneError::TooShort(7)));
        assert!(PhoneNumber::parse("12345678").is_ok());
        assert_eq!(PhoneNumber::parse("1234567890123456"), Err(PhoneError::TooLong(16)));
    }
    #[test]
    fn test_line_amounts_never_overflow() {
        let huge = Decimal::from_str_exact("30000000000000000000000000000").unwrap();
        assert_eq!(line_amount(huge, Quantity::MAX), Decimal::MAX);
        assert_eq!(sum_amounts([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(sum_amounts([Decimal::new(125, 1), Decimal::new(75, 1)]), Decimal::new(20, 0));
        assert_eq!(Money::new(Decimal::new(45, 0), "EGP").multiply(Quantity::new(3)).amount(), Decimal::new(135, 0));
    }
    #[test]
    fn test_money_rendering() {
        let m = Money::new(Decimal::new(123450, 2), "EGP");
        assert_eq!(m.plain(), "1234.5 EGP");
        assert_eq!(m.display(), "EGP 1,234.50");
        assert_eq!(Money::new(Decimal::new(1005, 3), "EGP").display(), "EGP 1.01");
        assert_eq!(Money::new(Decimal::ZERO, "EGP").display(), "EGP 0.00");
        assert_eq!(Money::new(Decimal::new(2500, 0), "EGP").plain(), "2500 EGP");
        assert_eq!(Money::new(Decimal::new(1_000_000, 0), "EGP").display(), "EGP 1,000,000.00");
    }
    #[test]
    fn test_quantity_floor() {
        assert_eq!(Quantity::new(0), Quantity::ONE);
        assert_eq!(Quantity::new(-4), Quantity::ONE);
        assert_eq!(Quantity::ONE.decrement(), Quantity::ONE);
        assert_eq!(Quantity::new(3).decrement().value(), 2);
        assert!(Quantity::try_from(0).is_err());
    }
    #[test]
    fn test_quantity_ceiling() {
        assert_eq!(Quantity::new(i64::MAX), Quantity::MAX);
        assert_eq!(Quantity::MAX.increment(), Quantity::MAX);
        assert_eq!(Quantity::new(9_000).add(Quantity::new(5_000)), Quantity::MAX);
        assert_eq!(Quantity::parse_lenient("99999999999"), Quantity::MAX);
        assert_eq!(Quantity::parse_lenient("123456"), Quantity::MAX);
        assert_eq!(Quantity::try_from(50_000).unwrap(), Quantity::MAX);
    }
    #[test]
    fn test_quantity_lenient_parse() {
        assert_eq!(Quantity::parse_lenient("3").value(), 3);
        assert_eq!(Quantity::parse_lenient(" 7 items").value(), 7);
        assert_eq!(Quantity::parse_lenient(""), Quantity::ONE);
        assert_eq!(Quantity::parse_lenient("abc"), Quantity::ONE);
        assert_eq!(Quantity::parse_lenient("0"), Quantity::ONE);
        assert_eq!(Quantity::parse_lenient("-2"), Quantity::ONE);
    }
}
