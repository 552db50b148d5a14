//! Festoon prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    booking::{BookedService, BookingDetail, PaymentMethodLabel, generate_booking_details},
    cart::{CartError, CartItem, CartStore, InMemoryCart},
    checkout::{
        Checkout, CheckoutData, CheckoutError, CheckoutState, CheckoutStep, NoopObserver,
        PaymentResolution, StepObserver, Transition,
    },
    clock::{Clock, FixedClock, SystemClock},
    fixtures::{CartFixture, Fixture, FixtureError},
    ids::{AddressId, PaymentMethodId, ServiceId},
    payment::{
        CARD_FORM, CASH_ON_DELIVERY, ChargeRequest, PaymentDetails, PaymentError, PaymentGateway,
        PaymentOutcome, SimulatedGateway, UPI,
    },
    pricing::{Price, PricingError},
    receipt::{BookingReceipt, ReceiptError},
};
