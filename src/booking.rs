//! Booking details
//!
//! A [`BookingDetail`] is the confirmation record produced once a payment
//! resolves. It is built by [`generate_booking_details`], which is a pure
//! function of the cart contents, the charged total, the payment selection and
//! the clock reading.

use std::fmt;

use jiff::{ToSpan, Zoned, civil::Date};

use crate::{
    cart::CartItem,
    ids::{PaymentMethodId, ServiceId},
    payment::{CASH_ON_DELIVERY, PaymentDetails, UPI},
    pricing::Price,
};

/// Prefix of generated order numbers.
pub const ORDER_NUMBER_PREFIX: &str = "EVT";

/// Days between placing an order and the provisional booking date.
pub const BOOKING_LEAD_DAYS: i64 = 7;

/// Venue shown until the vendor confirms one.
pub const VENUE_PLACEHOLDER: &str = "To be confirmed";

const ORDER_NUMBER_MODULUS: i64 = 1_000_000;

/// A booked service as shown on the confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedService {
    /// Service identifier.
    pub id: ServiceId,

    /// Service name.
    pub name: String,

    /// Units booked.
    pub quantity: u32,
}

impl From<&CartItem> for BookedService {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
        }
    }
}

/// How the booking was paid, rendered as a customer-facing label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodLabel {
    /// Card entered through the card form.
    Card {
        /// Last four digits of the card.
        last_four: String,
    },

    /// UPI transfer.
    Upi,

    /// Cash handed over on delivery.
    CashOnDelivery,

    /// Saved card or any other method.
    CreditDebitCard,
}

impl PaymentMethodLabel {
    /// Resolve the label for a payment selection.
    ///
    /// Card details win over the selected method id.
    pub fn resolve(details: Option<&PaymentDetails>, method: Option<&PaymentMethodId>) -> Self {
        if let Some(details) = details {
            return Self::Card {
                last_four: details.last_four.clone(),
            };
        }

        match method.map(PaymentMethodId::as_str) {
            Some(UPI) => Self::Upi,
            Some(CASH_ON_DELIVERY) => Self::CashOnDelivery,
            _ => Self::CreditDebitCard,
        }
    }
}

impl fmt::Display for PaymentMethodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card { last_four } => write!(f, "Card ending in {last_four}"),
            Self::Upi => f.write_str("UPI Payment"),
            Self::CashOnDelivery => f.write_str("Cash on Delivery"),
            Self::CreditDebitCard => f.write_str("Credit/Debit Card"),
        }
    }
}

/// Confirmation record for a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetail {
    /// Order number derived from the creation time. Not globally unique.
    pub order_number: String,

    /// Provisional booking date.
    pub booking_date: Date,

    /// Booked services, in cart order.
    pub services: Vec<BookedService>,

    /// Venue, a placeholder until confirmed.
    pub venue: String,

    /// Payment method label.
    pub payment_method: PaymentMethodLabel,

    /// Name entered on the card form, if any.
    pub cardholder_name: Option<String>,

    /// Amount charged.
    pub total_amount: Price,
}

/// Build the confirmation record for a checkout resolved at `now`.
pub fn generate_booking_details(
    items: &[CartItem],
    total_amount: Price,
    payment_details: Option<&PaymentDetails>,
    selected_payment_method_id: Option<&PaymentMethodId>,
    now: &Zoned,
) -> BookingDetail {
    BookingDetail {
        order_number: order_number(now),
        booking_date: now.date().saturating_add(BOOKING_LEAD_DAYS.days()),
        services: items.iter().map(BookedService::from).collect(),
        venue: VENUE_PLACEHOLDER.to_string(),
        payment_method: PaymentMethodLabel::resolve(payment_details, selected_payment_method_id),
        cardholder_name: payment_details.and_then(|details| details.cardholder_name.clone()),
        total_amount,
    }
}

/// Last six digits of the millisecond timestamp, prefixed.
fn order_number(now: &Zoned) -> String {
    let suffix = now
        .timestamp()
        .as_millisecond()
        .rem_euclid(ORDER_NUMBER_MODULUS);

    format!("{ORDER_NUMBER_PREFIX}{suffix:06}")
}
