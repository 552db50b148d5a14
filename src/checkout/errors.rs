//! Checkout errors.

use rusty_money::MoneyError;
use thiserror::Error;

use crate::{cart::CartError, checkout::step::CheckoutStep, payment::PaymentError};

/// Errors raised by checkout operations.
///
/// A transition refused by a guard is reported through
/// [`Transition::Blocked`](crate::checkout::Transition::Blocked) rather than
/// as an error.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The operation is only valid on another step.
    #[error("operation requires step {expected}, checkout is on step {actual}")]
    WrongStep {
        /// Step the operation needs.
        expected: CheckoutStep,
        /// Step the checkout is on.
        actual: CheckoutStep,
    },

    /// A charge is already in flight.
    #[error("a payment is already being processed")]
    PaymentInFlight,

    /// A payment outcome arrived with no charge in flight.
    #[error("no payment is being processed")]
    NoPaymentInFlight,

    /// The charge went through but the checkout cannot confirm from its
    /// current step. The charge is kept for the next move onto the
    /// confirmation.
    #[error("payment {reference} approved but checkout cannot confirm from step {step}")]
    PaymentUnconfirmed {
        /// Gateway reference for the approved charge.
        reference: String,
        /// Step the checkout is on.
        step: CheckoutStep,
    },

    /// An approved charge is waiting to be confirmed, so no new charge is
    /// started.
    #[error("payment {0} is already approved")]
    PaymentAlreadyApproved(String),

    /// The session was abandoned.
    #[error("checkout was cancelled")]
    Cancelled,

    /// Errors bubbled up from the cart store.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The payment gateway failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}
