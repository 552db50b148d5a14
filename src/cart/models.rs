//! Cart Models

use jiff::civil::Date;

use crate::{ids::ServiceId, pricing::Price};

/// A vendor service the customer intends to book.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Service identifier, unique per offering.
    pub id: ServiceId,

    /// Display name of the service.
    pub name: String,

    /// Unit price.
    pub price: Price,

    /// Image URI shown beside the line.
    pub image: String,

    /// Number of units, at least one while the line is in a cart.
    pub quantity: u32,

    /// Event date the customer picked, if any.
    pub date: Option<Date>,
}

impl CartItem {
    /// Create a single-unit line with no image or date.
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: String::new(),
            quantity: 1,
            date: None,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the image URI.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the event date.
    #[must_use]
    pub fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }
}
