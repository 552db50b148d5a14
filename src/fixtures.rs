//! Fixtures
//!
//! Cart fixtures are YAML files under `<base>/carts/<name>.yml`:
//!
//! ```yaml
//! currency: INR
//! items:
//!   - id: s1
//!     name: Photography
//!     price: "300.00 INR"
//!     quantity: 1
//!     date: 2026-12-05
//! ```

use std::{fs, path::PathBuf};

use jiff::civil::Date;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{CartError, CartItem, InMemoryCart},
    ids::ServiceId,
    pricing::Price,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the fixture and one of its items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

#[derive(Debug, Deserialize)]
struct CartFixtureFile {
    currency: String,
    items: Vec<ItemFixture>,
}

#[derive(Debug, Deserialize)]
struct ItemFixture {
    id: ServiceId,
    name: String,
    price: String,
    #[serde(default)]
    image: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    date: Option<Date>,
}

fn default_quantity() -> u32 {
    1
}

/// A parsed cart fixture.
#[derive(Debug, Clone)]
pub struct CartFixture {
    currency: &'static Currency,
    items: Vec<CartItem>,
}

impl CartFixture {
    /// Fixture currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Fixture items, in file order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Build an in-memory cart holding the fixture items.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart rejects one of the items.
    pub fn into_cart(self) -> Result<InMemoryCart, FixtureError> {
        Ok(InMemoryCart::with_items(self.items, self.currency)?)
    }
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is
    /// malformed, or an item is priced in another currency.
    pub fn load_cart(&self, name: &str) -> Result<CartFixture, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        parse_cart(&contents)
    }
}

/// Parse a cart fixture from YAML text.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price is malformed, or an item
/// is priced in another currency.
pub fn parse_cart(contents: &str) -> Result<CartFixture, FixtureError> {
    let fixture: CartFixtureFile = serde_norway::from_str(contents)?;
    let currency = parse_currency(&fixture.currency)?;

    let items = fixture
        .items
        .into_iter()
        .map(|item| {
            let price = parse_price(&item.price)?;

            if price.currency() != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    price.currency().iso_alpha_code.to_string(),
                ));
            }

            Ok(CartItem {
                id: item.id,
                name: item.name,
                price,
                image: item.image,
                quantity: item.quantity,
                date: item.date,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CartFixture { currency, items })
}

/// Parse price string (e.g., "300.00 INR") into a [`Price`]
///
/// # Errors
///
/// Returns an error if the price string is not `AMOUNT CURRENCY`, the amount
/// is not a decimal, or the currency is unknown.
pub fn parse_price(s: &str) -> Result<Price, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    parse_amount(amount, parse_currency(currency_code)?)
}

/// Parse a decimal amount (e.g., "50.00") in the given currency.
///
/// # Errors
///
/// Returns an error if the amount is not a decimal or does not fit in minor
/// units.
pub fn parse_amount(amount: &str, currency: &'static Currency) -> Result<Price, FixtureError> {
    let minor_units = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(amount.to_string()))?
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(amount.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Resolve a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "INR" => Ok(iso::INR),
        "USD" => Ok(iso::USD),
        "GBP" => Ok(iso::GBP),
        "EUR" => Ok(iso::EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
