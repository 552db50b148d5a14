//! Simulated payment gateway.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::payment::{
    gateway::{PaymentError, PaymentGateway},
    models::{ChargeRequest, PaymentOutcome},
};

/// Default round-trip time of the simulated gateway.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Gateway that approves every charge after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    /// Create a gateway that answers after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Round-trip delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    #[tracing::instrument(
        name = "payment.simulated.charge",
        skip(self, request),
        fields(amount = %request.amount, delay = ?self.delay)
    )]
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, PaymentError> {
        tokio::time::sleep(self.delay).await;

        let reference = format!("sim_{}", Uuid::now_v7().simple());

        info!(%reference, "simulated charge approved");

        Ok(PaymentOutcome::Approved { reference })
    }
}
