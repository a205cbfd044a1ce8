//! Money and display currencies.
//!
//! All arithmetic happens in USD, the base currency of the catalog. A
//! [`Currency`] only changes how an amount is rendered: it is multiplied by a
//! fixed exchange rate and formatted with the currency's conventions.
//!
//! ```rust
//! use rahat_core::{Currency, Money};
//! use rust_decimal::Decimal;
//!
//! let total = Money::usd(Decimal::new(13_041, 3));
//! assert_eq!(total.display(Currency::Usd), "$13.04");
//! assert_eq!(total.display(Currency::Afn), "978 ؋");
//! ```

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A USD-denominated amount.
///
/// Serializes as a JSON number (the backend validates amounts as numerics) and
/// deserializes from either a number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a USD amount.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The raw USD amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// `percent`% of this amount, unrounded.
    #[must_use]
    pub fn percent(self, percent: Decimal) -> Self {
        Self(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    /// Subtract, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }

    /// Whether the amount is zero or negative.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 <= Decimal::ZERO
    }

    /// Convert into `currency` and format for display.
    #[must_use]
    pub fn display(self, currency: Currency) -> String {
        currency.format(self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Currency::Usd.format(*self))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

/// Display currencies supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar, the base currency.
    #[default]
    Usd,
    /// Afghan afghani.
    Afn,
}

/// Error returned when parsing an unsupported currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

impl Currency {
    /// All supported currencies.
    pub const ALL: [Self; 2] = [Self::Usd, Self::Afn];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Afn => "AFN",
        }
    }

    /// Units of this currency per one USD.
    #[must_use]
    pub fn rate(self) -> Decimal {
        match self {
            Self::Usd => Decimal::ONE,
            Self::Afn => Decimal::from(75),
        }
    }

    /// Convert a USD amount into this currency without rounding.
    #[must_use]
    pub fn convert(self, money: Money) -> Decimal {
        money.amount() * self.rate()
    }

    /// Format a USD amount in this currency.
    ///
    /// Dollars are rounded to cents; afghanis are floored to whole units and
    /// grouped by thousands.
    #[must_use]
    pub fn format(self, money: Money) -> String {
        let converted = self.convert(money);
        match self {
            Self::Usd => {
                let rounded =
                    converted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                format!("${rounded:.2}")
            }
            Self::Afn => {
                let whole = converted.floor().normalize();
                format!("{} ؋", group_thousands(&whole.to_string()))
            }
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "AFN" => Ok(Self::Afn),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}
