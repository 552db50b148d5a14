//! Checkout steps

use std::fmt;

use thiserror::Error;

/// A step number outside `1..=5`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("checkout step {0} does not exist")]
pub struct InvalidStep(pub u8);

/// The five linear checkout steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    /// Review the selected services.
    #[default]
    CartReview = 1,

    /// Pick a saved address.
    AddressSelection = 2,

    /// Review the order before paying.
    OrderReview = 3,

    /// Choose a method and pay.
    Payment = 4,

    /// Booking confirmed. Absorbing.
    Confirmation = 5,
}

impl CheckoutStep {
    /// Every step in order.
    pub const ALL: [Self; 5] = [
        Self::CartReview,
        Self::AddressSelection,
        Self::OrderReview,
        Self::Payment,
        Self::Confirmation,
    ];

    /// One-based step number.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The following step, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::CartReview => Some(Self::AddressSelection),
            Self::AddressSelection => Some(Self::OrderReview),
            Self::OrderReview => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// The step a customer can go back to. Nothing precedes the first step and
    /// a confirmed booking cannot be reopened.
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::CartReview | Self::Confirmation => None,
            Self::AddressSelection => Some(Self::CartReview),
            Self::OrderReview => Some(Self::AddressSelection),
            Self::Payment => Some(Self::OrderReview),
        }
    }

    /// Short label for progress indicators.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CartReview => "Cart",
            Self::AddressSelection => "Address",
            Self::OrderReview => "Review",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl TryFrom<u8> for CheckoutStep {
    type Error = InvalidStep;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|step| step.number() == value)
            .ok_or(InvalidStep(value))
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}
