//! Payments

pub mod gateway;
pub mod models;
pub mod simulated;

pub use gateway::{MockPaymentGateway, PaymentError, PaymentGateway};
pub use models::{
    CARD_FORM, CASH_ON_DELIVERY, ChargeRequest, PaymentDetails, PaymentOutcome, UPI,
};
pub use simulated::SimulatedGateway;
