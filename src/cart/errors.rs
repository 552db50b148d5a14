//! Cart store errors.

use thiserror::Error;

use crate::{ids::ServiceId, pricing::PricingError};

/// Errors raised by cart store mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (service, item currency, cart currency).
    #[error("service {0} is priced in {1}, but the cart is in {2}")]
    CurrencyMismatch(ServiceId, &'static str, &'static str),

    /// No line exists for the service.
    #[error("service {0} is not in the cart")]
    NotFound(ServiceId),

    /// Items must be added with at least one unit.
    #[error("service {0} was added with a quantity of zero")]
    ZeroQuantity(ServiceId),

    /// Errors bubbled up from subtotal calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}
