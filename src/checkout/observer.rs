//! Step observers

use mockall::automock;

use crate::checkout::step::CheckoutStep;

/// Presentation hooks fired when the checkout changes step.
#[automock]
pub trait StepObserver: Send + Sync {
    /// Reset the presentation position (scroll back to the top) for `step`.
    fn reset_position(&self, step: CheckoutStep);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn reset_position(&self, _step: CheckoutStep) {}
}
