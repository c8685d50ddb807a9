//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API sends prices as plain JSON numbers, and `null` for
//! products that are not for sale ("priceless"). A priceless product still
//! appears in the catalog and contributes nothing to a basket total.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency label rendered after an amount.
const CURRENCY: &str = "синапсов";

/// Label rendered for a product without a price.
const PRICELESS: &str = "Бесценно";

/// A product price in synapses, or no price at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Price(Option<Decimal>);

impl Price {
    /// A price for a product that cannot be bought.
    pub const PRICELESS: Self = Self(None);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(Some(amount))
    }

    /// Create a price from a whole number of synapses.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Some(Decimal::from(units)))
    }

    /// The amount used for totals: a missing price counts as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }

    /// Whether this product has no price.
    #[must_use]
    pub const fn is_priceless(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(amount) => write!(f, "{} {CURRENCY}", amount.normalize()),
            None => f.write_str(PRICELESS),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float_option::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Decimal>::deserialize(deserializer).map(Self)
    }
}
