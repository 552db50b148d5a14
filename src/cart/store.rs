//! Cart store.

use mockall::automock;
use parking_lot::RwLock;
use rusty_money::iso::Currency;
use tracing::debug;

use crate::{
    cart::{CartError, CartItem},
    ids::ServiceId,
    pricing::{self, Price, PricingError},
};

/// Shared cart contract consumed by the checkout and by the catalogue views.
///
/// Implementations use interior mutability so a single store can be handed to
/// several consumers behind an `Arc`.
#[automock]
pub trait CartStore: Send + Sync {
    /// Currency every line in the cart is priced in.
    fn currency(&self) -> &'static Currency;

    /// Snapshot of the cart lines, in insertion order.
    fn items(&self) -> Vec<CartItem>;

    /// Sum of price times quantity over every line.
    fn subtotal(&self) -> Price;

    /// Add a service, merging quantities when the service is already present.
    fn add_to_cart(&self, item: CartItem) -> Result<(), CartError>;

    /// Change the quantity of a line. A quantity of zero removes it.
    fn update_quantity(&self, id: &ServiceId, quantity: u32) -> Result<(), CartError>;

    /// Remove a line.
    fn remove_from_cart(&self, id: &ServiceId) -> Result<(), CartError>;

    /// Remove every line.
    fn clear_cart(&self);
}

#[derive(Debug, Clone)]
struct CartContents {
    items: Vec<CartItem>,
    subtotal: Price,
}

/// Cart held in memory for the lifetime of a browsing session.
#[derive(Debug)]
pub struct InMemoryCart {
    currency: &'static Currency,
    contents: RwLock<CartContents>,
}

impl InMemoryCart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            contents: RwLock::new(CartContents {
                items: Vec::new(),
                subtotal: pricing::zero(currency),
            }),
        }
    }

    /// Create a cart pre-filled with the given items.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if an item has a different currency, a zero
    /// quantity, or the subtotal overflows.
    pub fn with_items(
        items: impl IntoIterator<Item = CartItem>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let cart = Self::new(currency);

        items
            .into_iter()
            .try_for_each(|item| cart.add_to_cart(item))?;

        Ok(cart)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.contents.read().items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.contents.read().items.is_empty()
    }

    /// Apply `change` to a copy of the lines and commit only if the new
    /// subtotal can be computed.
    fn mutate(
        &self,
        change: impl FnOnce(&mut Vec<CartItem>) -> Result<(), CartError>,
    ) -> Result<(), CartError> {
        let mut contents = self.contents.write();
        let mut items = contents.items.clone();

        change(&mut items)?;

        let subtotal = pricing::subtotal(&items, self.currency)?;

        *contents = CartContents { items, subtotal };

        Ok(())
    }
}

impl CartStore for InMemoryCart {
    fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn items(&self) -> Vec<CartItem> {
        self.contents.read().items.clone()
    }

    fn subtotal(&self) -> Price {
        self.contents.read().subtotal
    }

    fn add_to_cart(&self, item: CartItem) -> Result<(), CartError> {
        let item_currency = item.price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item.id,
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity(item.id));
        }

        debug!(service_id = %item.id, quantity = item.quantity, "adding service to cart");

        self.mutate(|items| {
            match items.iter_mut().find(|line| line.id == item.id) {
                Some(line) => {
                    line.quantity = line
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| PricingError::Overflow(item.id.to_string()))?;
                }
                None => items.push(item),
            }

            Ok(())
        })
    }

    fn update_quantity(&self, id: &ServiceId, quantity: u32) -> Result<(), CartError> {
        debug!(service_id = %id, quantity, "updating cart quantity");

        self.mutate(|items| {
            let position = items
                .iter()
                .position(|line| line.id == *id)
                .ok_or_else(|| CartError::NotFound(id.clone()))?;

            if quantity == 0 {
                items.remove(position);
            } else if let Some(line) = items.get_mut(position) {
                line.quantity = quantity;
            }

            Ok(())
        })
    }

    fn remove_from_cart(&self, id: &ServiceId) -> Result<(), CartError> {
        debug!(service_id = %id, "removing service from cart");

        self.mutate(|items| {
            let before = items.len();

            items.retain(|line| line.id != *id);

            if items.len() == before {
                return Err(CartError::NotFound(id.clone()));
            }

            Ok(())
        })
    }

    fn clear_cart(&self) {
        debug!("clearing cart");

        let mut contents = self.contents.write();

        contents.items.clear();
        contents.subtotal = pricing::zero(self.currency);
    }
}
