//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartItem;

/// A monetary amount in one of the ISO currencies.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while calculating cart totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Price multiplied by quantity does not fit in minor units.
    #[error("line total for service {0} overflowed")]
    Overflow(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Calculates the price of a single cart line (unit price times quantity).
///
/// # Errors
///
/// - [`PricingError::Overflow`]: the line total does not fit in minor units.
pub fn line_total(item: &CartItem) -> Result<Price, PricingError> {
    let minor_units = item
        .price
        .to_minor_units()
        .checked_mul(i64::from(item.quantity))
        .ok_or_else(|| PricingError::Overflow(item.id.to_string()))?;

    Ok(Money::from_minor(minor_units, item.price.currency()))
}

/// Calculates the subtotal of a list of cart items in the given currency.
///
/// An empty list totals to zero.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total does not fit in minor units.
/// - [`PricingError::Money`]: an item is priced in a different currency.
pub fn subtotal(items: &[CartItem], currency: &'static Currency) -> Result<Price, PricingError> {
    items.iter().try_fold(zero(currency), |acc, item| {
        Ok(acc.add(line_total(item)?)?)
    })
}
