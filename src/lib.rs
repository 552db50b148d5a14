//! Festoon
//!
//! Festoon is the checkout core of an event-services marketplace: a guarded
//! five-step checkout state machine over a cart store, a pluggable payment
//! gateway, and the booking confirmation produced when a payment succeeds.

pub mod booking;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod fixtures;
pub mod ids;
pub mod observability;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod receipt;
