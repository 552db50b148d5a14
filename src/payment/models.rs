//! Payment Models

use crate::{ids::PaymentMethodId, pricing::Price};

/// Method id of the inline card form. Card payments need [`PaymentDetails`].
pub const CARD_FORM: &str = "card-form";

/// Method id of UPI transfers.
pub const UPI: &str = "upi";

/// Method id of cash on delivery.
pub const CASH_ON_DELIVERY: &str = "cod";

/// Card details captured by the payment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Last four digits of the card number.
    pub last_four: String,

    /// Name printed on the card.
    pub cardholder_name: Option<String>,
}

impl PaymentDetails {
    /// Details with only the last four digits known.
    pub fn new(last_four: impl Into<String>) -> Self {
        Self {
            last_four: last_four.into(),
            cardholder_name: None,
        }
    }

    /// Set the cardholder name.
    #[must_use]
    pub fn with_cardholder_name(mut self, name: impl Into<String>) -> Self {
        self.cardholder_name = Some(name.into());
        self
    }
}

/// A single charge sent to a payment gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Amount to charge, after discounts.
    pub amount: Price,

    /// Selected payment method, if any.
    pub method: Option<PaymentMethodId>,

    /// Card details, when paying through the card form.
    pub details: Option<PaymentDetails>,
}

/// Result of a charge the gateway was able to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The charge went through.
    Approved {
        /// Gateway reference for the charge.
        reference: String,
    },

    /// The gateway refused the charge.
    Declined {
        /// Reason given by the gateway.
        reason: String,
    },
}

impl PaymentOutcome {
    /// Check if the charge went through.
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}
