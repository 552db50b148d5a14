//! Checkout Data

use rusty_money::{MoneyError, iso::Currency};

use crate::{
    cart::CartItem,
    pricing::{self, Price},
};

/// Snapshot of the cart as seen by the checkout, plus the applied discount.
///
/// `discounted_price` always equals `total_price - discount_amount`. The
/// discount is a flat amount and survives cart changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutData {
    services: Vec<CartItem>,
    total_price: Price,
    discounted_price: Price,
    discount_code: String,
    discount_amount: Price,
}

impl CheckoutData {
    /// No services and no discount.
    pub fn empty(currency: &'static Currency) -> Self {
        Self {
            services: Vec::new(),
            total_price: pricing::zero(currency),
            discounted_price: pricing::zero(currency),
            discount_code: String::new(),
            discount_amount: pricing::zero(currency),
        }
    }

    /// Mirror the cart contents, keeping the current discount amount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if `subtotal` is in a different currency from
    /// the discount. Nothing changes in that case.
    pub fn sync(&mut self, services: Vec<CartItem>, subtotal: Price) -> Result<(), MoneyError> {
        let discounted_price = subtotal.sub(self.discount_amount)?;

        self.services = services;
        self.total_price = subtotal;
        self.discounted_price = discounted_price;

        Ok(())
    }

    /// Apply a discount code worth `amount`. The amount is taken as given.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if `amount` is in a different currency from
    /// the total. Nothing changes in that case.
    pub fn apply_discount(
        &mut self,
        code: impl Into<String>,
        amount: Price,
    ) -> Result<(), MoneyError> {
        let discounted_price = self.total_price.sub(amount)?;

        self.discount_code = code.into();
        self.discount_amount = amount;
        self.discounted_price = discounted_price;

        Ok(())
    }

    /// Drop the discount.
    pub fn clear_discount(&mut self) {
        self.discount_code.clear();
        self.discount_amount = pricing::zero(self.total_price.currency());
        self.discounted_price = self.total_price;
    }

    /// Services in the cart.
    pub fn services(&self) -> &[CartItem] {
        &self.services
    }

    /// Cart subtotal before the discount.
    pub fn total_price(&self) -> Price {
        self.total_price
    }

    /// Amount due after the discount.
    pub fn discounted_price(&self) -> Price {
        self.discounted_price
    }

    /// Applied discount code, empty when none.
    pub fn discount_code(&self) -> &str {
        &self.discount_code
    }

    /// Applied discount amount, zero when none.
    pub fn discount_amount(&self) -> Price {
        self.discount_amount
    }

    /// Check if a discount code is applied.
    pub fn has_discount(&self) -> bool {
        !self.discount_code.is_empty()
    }
}
