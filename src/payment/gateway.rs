//! Payment gateway port.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::payment::models::{ChargeRequest, PaymentOutcome};

/// Failures reaching or talking to a gateway. A refused charge is a
/// [`PaymentOutcome::Declined`], not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The gateway could not be reached.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous payment port. Implementations charge the customer and report
/// the outcome.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge the request amount.
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, PaymentError>;
}
