//! Checkout
//!
//! A five-step checkout: review the cart, pick an address, review the order,
//! pay, and land on the confirmation. [`Checkout`] orchestrates one session
//! over an injected [`CartStore`](crate::cart::CartStore) and
//! [`PaymentGateway`](crate::payment::PaymentGateway).

pub mod data;
pub mod errors;
pub mod observer;
pub mod session;
pub mod state;
pub mod step;

pub use data::CheckoutData;
pub use errors::CheckoutError;
pub use observer::{MockStepObserver, NoopObserver, StepObserver};
pub use session::{Checkout, PaymentResolution};
pub use state::{ApprovedCharge, CheckoutState, Transition};
pub use step::{CheckoutStep, InvalidStep};
