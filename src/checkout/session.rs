//! Checkout session.

use std::{fmt, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    booking::{BookingDetail, generate_booking_details},
    cart::{CartItem, CartStore},
    checkout::{
        errors::CheckoutError,
        observer::{NoopObserver, StepObserver},
        state::{ApprovedCharge, CheckoutState, Transition},
        step::CheckoutStep,
    },
    clock::{Clock, SystemClock},
    ids::{AddressId, PaymentMethodId, ServiceId},
    payment::{ChargeRequest, PaymentDetails, PaymentGateway, PaymentOutcome},
    pricing::Price,
};

/// How an in-flight payment ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentResolution {
    /// The charge went through and the checkout moved to the confirmation.
    Confirmed {
        /// Gateway reference for the charge.
        reference: String,
        /// Confirmation record.
        booking: BookingDetail,
    },

    /// The gateway refused the charge. The checkout stays on the payment step.
    Declined {
        /// Reason given by the gateway.
        reason: String,
    },
}

/// One checkout session.
///
/// The session reads and mutates the injected cart store, keeps its own
/// snapshot of the cart in [`CheckoutState`], and charges through the
/// injected gateway. Dropping the session cancels any charge still in flight.
pub struct Checkout {
    cart: Arc<dyn CartStore>,
    gateway: Arc<dyn PaymentGateway>,
    observer: Arc<dyn StepObserver>,
    clock: Arc<dyn Clock>,
    state: CheckoutState,
    booking: Option<BookingDetail>,
    cancellation: CancellationToken,
}

impl Checkout {
    /// Start a session on the first step, mirroring the cart's current contents.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Money`] if the cart subtotal is not in the
    /// cart currency.
    pub fn new(
        cart: Arc<dyn CartStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, CheckoutError> {
        let mut state = CheckoutState::new(cart.currency());

        state.checkout_data.sync(cart.items(), cart.subtotal())?;

        Ok(Self {
            cart,
            gateway,
            observer: Arc::new(NoopObserver),
            clock: Arc::new(SystemClock),
            state,
            booking: None,
            cancellation: CancellationToken::new(),
        })
    }

    /// Notify `observer` of step changes.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Read the time from `clock` when generating bookings.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cancel the session when `token` is cancelled. The session holds a
    /// child of `token`, so dropping the session never cancels `token` itself.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token.child_token();
        self
    }

    /// Session state. The cart snapshot is as of the last session operation;
    /// see [`Checkout::refresh`].
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Current step.
    pub fn current_step(&self) -> CheckoutStep {
        self.state.current_step
    }

    /// Confirmation record, once the payment went through.
    pub fn booking(&self) -> Option<&BookingDetail> {
        self.booking.as_ref()
    }

    /// Token that abandons the session when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Check if the session was abandoned.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Guard for leaving the current step forwards, evaluated against the
    /// cart store's current contents.
    pub fn can_proceed_to_next(&self) -> bool {
        let mut state = self.state.clone();

        state
            .checkout_data
            .sync(self.cart.items(), self.cart.subtotal())
            .is_ok()
            && state.can_proceed_to_next()
    }

    /// Move one step forward if the guard allows it.
    ///
    /// The cart snapshot is re-read first. Reaching the confirmation with an
    /// approved charge pending turns that charge into the booking.
    pub fn next_step(&mut self) -> Transition {
        let at = self.state.current_step;

        if let Err(source) = self.refresh() {
            warn!(step = %at, error = %source, "cart could not be re-read");
            return Transition::Blocked { at };
        }

        let transition = self.state.advance();

        self.after_transition(transition);

        if let Transition::Moved {
            to: CheckoutStep::Confirmation,
            ..
        } = transition
        {
            self.book_approved_charge();
        }

        transition
    }

    /// Move one step back. Not possible from the first or the last step.
    pub fn prev_step(&mut self) -> Transition {
        let transition = self.state.retreat();

        self.after_transition(transition);

        transition
    }

    fn after_transition(&self, transition: Transition) {
        match transition {
            Transition::Moved { from, to } => {
                debug!(%from, %to, "checkout step changed");
                self.observer.reset_position(to);
            }
            Transition::Blocked { at } => debug!(step = %at, "checkout transition blocked"),
            Transition::AtBoundary { at } => debug!(step = %at, "no checkout step in that direction"),
        }
    }

    /// Re-read the cart store. Call this when another view changed the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Money`] if the cart subtotal is not in the
    /// discount currency.
    pub fn refresh(&mut self) -> Result<(), CheckoutError> {
        self.state
            .checkout_data
            .sync(self.cart.items(), self.cart.subtotal())?;

        Ok(())
    }

    /// Add a service through the cart store.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the store rejects the item.
    pub fn add_service(&mut self, item: CartItem) -> Result<(), CheckoutError> {
        self.cart.add_to_cart(item)?;
        self.refresh()
    }

    /// Change a service quantity through the cart store. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the store rejects the change.
    pub fn update_quantity(
        &mut self,
        service_id: &ServiceId,
        quantity: u32,
    ) -> Result<(), CheckoutError> {
        self.cart.update_quantity(service_id, quantity)?;
        self.refresh()
    }

    /// Remove a service through the cart store.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Cart`] if the service is not in the cart.
    pub fn remove_service(&mut self, service_id: &ServiceId) -> Result<(), CheckoutError> {
        self.cart.remove_from_cart(service_id)?;
        self.refresh()
    }

    /// Apply a discount code worth `amount`. The code is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Money`] if `amount` is not in the cart currency.
    pub fn apply_discount(
        &mut self,
        code: impl Into<String>,
        amount: Price,
    ) -> Result<(), CheckoutError> {
        let code = code.into();

        info!(discount_code = %code, %amount, "applying discount");

        self.state.checkout_data.apply_discount(code, amount)?;

        Ok(())
    }

    /// Remove the discount.
    pub fn clear_discount(&mut self) {
        self.state.checkout_data.clear_discount();
    }

    /// Select the delivery address.
    pub fn select_address(&mut self, address_id: AddressId) {
        self.state.selected_address_id = Some(address_id);
    }

    /// Select the payment method.
    pub fn select_payment_method(&mut self, method_id: PaymentMethodId) {
        self.state.selected_payment_method_id = Some(method_id);
    }

    /// Record whether the customer accepted the booking policies.
    pub fn set_policy_agreement(&mut self, agreed: bool) {
        self.state.agreed_to_policies = agreed;
    }

    /// Mark a charge as in flight and build the gateway request.
    ///
    /// Use with [`Checkout::resolve_payment`] when the caller talks to the
    /// gateway itself; [`Checkout::process_payment`] does both.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Cancelled`]: the session was abandoned.
    /// - [`CheckoutError::WrongStep`]: the checkout is not on the payment step.
    /// - [`CheckoutError::PaymentInFlight`]: a charge is already in flight.
    /// - [`CheckoutError::PaymentAlreadyApproved`]: an earlier charge went
    ///   through and is waiting to be confirmed.
    /// - [`CheckoutError::Money`]: the cart could not be re-read.
    pub fn begin_payment(
        &mut self,
        details: Option<PaymentDetails>,
    ) -> Result<ChargeRequest, CheckoutError> {
        if self.is_cancelled() {
            return Err(CheckoutError::Cancelled);
        }

        self.expect_step(CheckoutStep::Payment)?;

        if self.state.charge_in_flight.is_some() {
            return Err(CheckoutError::PaymentInFlight);
        }

        if let Some(charge) = &self.state.approved_charge {
            return Err(CheckoutError::PaymentAlreadyApproved(charge.reference.clone()));
        }

        self.refresh()?;

        let request = ChargeRequest {
            amount: self.state.checkout_data.discounted_price(),
            method: self.state.selected_payment_method_id.clone(),
            details,
        };

        self.state.charge_in_flight = Some(request.amount);
        self.state.payment_details.clone_from(&request.details);

        info!(amount = %request.amount, method = ?request.method, "payment started");

        Ok(request)
    }

    /// Apply the gateway outcome of the charge in flight.
    ///
    /// The payment guard is checked again before moving on. If the customer
    /// withdrew their agreement or left the payment step while the charge was
    /// in flight, the approved charge is kept: no new charge is accepted, and
    /// the next [`Checkout::next_step`] onto the confirmation books it.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Cancelled`]: the session was abandoned; nothing changes.
    /// - [`CheckoutError::NoPaymentInFlight`]: there is no charge to resolve.
    /// - [`CheckoutError::PaymentUnconfirmed`]: the charge went through but
    ///   the checkout cannot confirm from its current step yet.
    pub fn resolve_payment(
        &mut self,
        outcome: PaymentOutcome,
    ) -> Result<PaymentResolution, CheckoutError> {
        if self.is_cancelled() {
            return Err(CheckoutError::Cancelled);
        }

        let Some(amount) = self.state.charge_in_flight.take() else {
            return Err(CheckoutError::NoPaymentInFlight);
        };

        let reference = match outcome {
            PaymentOutcome::Approved { reference } => reference,
            PaymentOutcome::Declined { reason } => {
                warn!(%reason, "payment declined");
                return Ok(PaymentResolution::Declined { reason });
            }
        };

        self.state.approved_charge = Some(ApprovedCharge {
            reference: reference.clone(),
            amount,
        });

        if self.state.current_step == CheckoutStep::Payment && self.next_step().is_moved() {
            if let Some(booking) = self.booking.clone() {
                return Ok(PaymentResolution::Confirmed { reference, booking });
            }
        }

        let step = self.state.current_step;

        warn!(%reference, %step, "payment approved but checkout cannot be confirmed yet");

        Err(CheckoutError::PaymentUnconfirmed { reference, step })
    }

    /// Charge through the gateway and resolve the outcome.
    ///
    /// The charge races the session's cancellation token. Once cancelled the
    /// charge is dropped and the session no longer reports it as in flight.
    ///
    /// # Errors
    ///
    /// Everything [`Checkout::begin_payment`] and [`Checkout::resolve_payment`]
    /// return, plus [`CheckoutError::Payment`] when the gateway fails. A
    /// gateway failure clears the in-flight charge so the customer can retry.
    pub async fn process_payment(
        &mut self,
        details: Option<PaymentDetails>,
    ) -> Result<PaymentResolution, CheckoutError> {
        let request = self.begin_payment(details)?;
        let gateway = Arc::clone(&self.gateway);
        let cancellation = self.cancellation.clone();

        let result = tokio::select! {
            biased;

            () = cancellation.cancelled() => {
                warn!("checkout abandoned while payment was in flight");
                self.state.charge_in_flight = None;
                return Err(CheckoutError::Cancelled);
            }
            result = gateway.charge(&request) => result,
        };

        match result {
            Ok(outcome) => self.resolve_payment(outcome),
            Err(source) => {
                error!(error = %source, "payment gateway failed");
                self.state.charge_in_flight = None;
                Err(source.into())
            }
        }
    }

    /// Turn a pending approved charge into the booking.
    fn book_approved_charge(&mut self) {
        let Some(charge) = self.state.approved_charge.take() else {
            return;
        };

        let data = &self.state.checkout_data;

        let booking = generate_booking_details(
            data.services(),
            charge.amount,
            self.state.payment_details.as_ref(),
            self.state.selected_payment_method_id.as_ref(),
            &self.clock.now(),
        );

        info!(
            reference = %charge.reference,
            order_number = %booking.order_number,
            total = %booking.total_amount,
            "booking confirmed"
        );

        self.booking = Some(booking);
    }

    /// Abandon the session, cancelling any charge in flight.
    ///
    /// An approved charge that was never confirmed is logged so it can be
    /// refunded.
    pub fn abandon(self) {
        info!(step = %self.state.current_step, "checkout abandoned");

        if let Some(charge) = &self.state.approved_charge {
            warn!(
                reference = %charge.reference,
                amount = %charge.amount,
                "abandoned checkout holds an unconfirmed charge"
            );
        }
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        let actual = self.state.current_step;

        if actual == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep { expected, actual })
        }
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("state", &self.state)
            .field("booking", &self.booking)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::{Timestamp, tz::TimeZone};
    use mockall::predicate::eq;
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;
    use crate::{
        cart::{InMemoryCart, MockCartStore},
        checkout::observer::MockStepObserver,
        clock::FixedClock,
        payment::{CARD_FORM, MockPaymentGateway, PaymentError, SimulatedGateway, UPI},
    };

    fn inr(minor: i64) -> Price {
        Money::from_minor(minor, iso::INR)
    }

    fn photography() -> CartItem {
        CartItem::new("s1", "Photography", inr(300_00))
    }

    fn cart_with_photography() -> Result<Arc<InMemoryCart>, crate::cart::CartError> {
        Ok(Arc::new(InMemoryCart::with_items([photography()], iso::INR)?))
    }

    fn approving_gateway() -> Arc<MockPaymentGateway> {
        let mut gateway = MockPaymentGateway::new();

        gateway.expect_charge().returning(|_| {
            Ok(PaymentOutcome::Approved {
                reference: "ref_1".to_string(),
            })
        });

        Arc::new(gateway)
    }

    fn fixed_clock() -> Result<Arc<FixedClock>, jiff::Error> {
        let now = Timestamp::from_millisecond(1_760_000_123_456)?.to_zoned(TimeZone::UTC);

        Ok(Arc::new(FixedClock::new(now)))
    }

    /// Walk a session with a card payment up to the payment step.
    fn at_payment_step(gateway: Arc<dyn PaymentGateway>) -> TestResult<Checkout> {
        let mut checkout =
            Checkout::new(cart_with_photography()?, gateway)?.with_clock(fixed_clock()?);

        assert!(checkout.next_step().is_moved());
        checkout.select_address(AddressId::new("home"));
        assert!(checkout.next_step().is_moved());
        assert!(checkout.next_step().is_moved());

        checkout.select_payment_method(PaymentMethodId::new(CARD_FORM));
        checkout.set_policy_agreement(true);

        Ok(checkout)
    }

    #[test]
    fn new_session_mirrors_cart() -> TestResult {
        let checkout = Checkout::new(cart_with_photography()?, approving_gateway())?;

        let data = checkout.state().checkout_data();

        assert_eq!(checkout.current_step(), CheckoutStep::CartReview);
        assert_eq!(data.services().len(), 1);
        assert_eq!(data.total_price(), inr(300_00));
        assert_eq!(data.discounted_price(), inr(300_00));

        Ok(())
    }

    #[test]
    fn missing_address_blocks_second_step() -> TestResult {
        let mut checkout = Checkout::new(cart_with_photography()?, approving_gateway())?;

        assert!(checkout.can_proceed_to_next());
        assert_eq!(
            checkout.next_step(),
            Transition::Moved {
                from: CheckoutStep::CartReview,
                to: CheckoutStep::AddressSelection,
            }
        );

        assert!(!checkout.can_proceed_to_next());
        assert_eq!(
            checkout.next_step(),
            Transition::Blocked {
                at: CheckoutStep::AddressSelection
            }
        );
        assert_eq!(checkout.current_step(), CheckoutStep::AddressSelection);

        Ok(())
    }

    #[test]
    fn observer_is_notified_only_on_moves() -> TestResult {
        let mut observer = MockStepObserver::new();

        observer
            .expect_reset_position()
            .with(eq(CheckoutStep::AddressSelection))
            .times(1)
            .return_const(());
        observer
            .expect_reset_position()
            .with(eq(CheckoutStep::CartReview))
            .times(1)
            .return_const(());

        let mut checkout = Checkout::new(cart_with_photography()?, approving_gateway())?
            .with_observer(Arc::new(observer));

        assert!(checkout.next_step().is_moved());
        assert!(!checkout.next_step().is_moved());
        assert!(checkout.prev_step().is_moved());
        assert!(!checkout.prev_step().is_moved());

        Ok(())
    }

    #[test]
    fn select_address_is_idempotent() -> TestResult {
        let mut once = Checkout::new(cart_with_photography()?, approving_gateway())?;
        let mut twice = Checkout::new(cart_with_photography()?, approving_gateway())?;

        once.select_address(AddressId::new("home"));
        twice.select_address(AddressId::new("home"));
        twice.select_address(AddressId::new("home"));

        assert_eq!(once.state(), twice.state());

        Ok(())
    }

    #[test]
    fn quantity_changes_flow_through_the_store() -> TestResult {
        let cart = cart_with_photography()?;
        let mut checkout = Checkout::new(cart.clone(), approving_gateway())?;

        checkout.update_quantity(&ServiceId::new("s1"), 3)?;

        assert_eq!(cart.subtotal(), inr(900_00));
        assert_eq!(checkout.state().checkout_data().total_price(), inr(900_00));

        checkout.remove_service(&ServiceId::new("s1"))?;

        assert!(cart.is_empty());
        assert!(checkout.state().checkout_data().services().is_empty());
        assert!(!checkout.can_proceed_to_next());

        Ok(())
    }

    #[test]
    fn store_errors_are_propagated() -> TestResult {
        let mut store = MockCartStore::new();

        store.expect_currency().return_const(iso::INR);
        store.expect_items().returning(Vec::new);
        store.expect_subtotal().returning(|| inr(0));
        store
            .expect_remove_from_cart()
            .returning(|id| Err(crate::cart::CartError::NotFound(id.clone())));

        let mut checkout = Checkout::new(Arc::new(store), approving_gateway())?;

        let result = checkout.remove_service(&ServiceId::new("ghost"));

        assert!(matches!(
            result,
            Err(CheckoutError::Cart(crate::cart::CartError::NotFound(_)))
        ));

        Ok(())
    }

    #[test]
    fn stale_discount_is_kept_as_flat_amount() -> TestResult {
        let cart = cart_with_photography()?;
        let mut checkout = Checkout::new(cart.clone(), approving_gateway())?;

        checkout.apply_discount("SAVE50", inr(50_00))?;

        assert_eq!(
            checkout.state().checkout_data().discounted_price(),
            inr(250_00)
        );

        cart.add_to_cart(CartItem::new("s2", "Decor", inr(200_00)))?;
        checkout.refresh()?;

        let data = checkout.state().checkout_data();

        assert_eq!(data.total_price(), inr(500_00));
        assert_eq!(data.discounted_price(), inr(450_00));
        assert_eq!(
            data.discounted_price(),
            data.total_price().sub(data.discount_amount())?
        );

        Ok(())
    }

    #[test]
    fn card_form_without_details_blocks_payment_step() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;

        assert_eq!(checkout.current_step(), CheckoutStep::Payment);
        assert_eq!(
            checkout.next_step(),
            Transition::Blocked {
                at: CheckoutStep::Payment
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn approved_payment_confirms_booking() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge()
            .once()
            .withf(|request| request.amount == inr(300_00) && request.details.is_some())
            .returning(|_| {
                Ok(PaymentOutcome::Approved {
                    reference: "ref_42".to_string(),
                })
            });

        let mut checkout = at_payment_step(Arc::new(gateway))?;

        let resolution = checkout
            .process_payment(Some(PaymentDetails::new("4567")))
            .await?;

        let PaymentResolution::Confirmed { reference, booking } = resolution else {
            panic!("expected confirmation, got {resolution:?}");
        };

        assert_eq!(reference, "ref_42");
        assert_eq!(booking.order_number, "EVT123456");
        assert_eq!(booking.payment_method.to_string(), "Card ending in 4567");
        assert_eq!(booking.total_amount, inr(300_00));
        assert_eq!(checkout.current_step(), CheckoutStep::Confirmation);
        assert!(!checkout.state().is_processing_payment());
        assert_eq!(checkout.booking(), Some(&booking));

        Ok(())
    }

    #[tokio::test]
    async fn discounted_price_is_charged() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge()
            .once()
            .withf(|request| request.amount == inr(250_00))
            .returning(|_| {
                Ok(PaymentOutcome::Approved {
                    reference: "ref_7".to_string(),
                })
            });

        let mut checkout = at_payment_step(Arc::new(gateway))?;
        checkout.apply_discount("SAVE50", inr(50_00))?;

        let resolution = checkout
            .process_payment(Some(PaymentDetails::new("4567")))
            .await?;

        assert!(matches!(
            resolution,
            PaymentResolution::Confirmed { booking, .. } if booking.total_amount == inr(250_00)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn declined_payment_stays_on_payment_step() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway.expect_charge().once().returning(|_| {
            Ok(PaymentOutcome::Declined {
                reason: "insufficient funds".to_string(),
            })
        });

        let mut checkout = at_payment_step(Arc::new(gateway))?;

        let resolution = checkout
            .process_payment(Some(PaymentDetails::new("4567")))
            .await?;

        assert_eq!(
            resolution,
            PaymentResolution::Declined {
                reason: "insufficient funds".to_string()
            }
        );
        assert_eq!(checkout.current_step(), CheckoutStep::Payment);
        assert!(!checkout.state().is_processing_payment());
        assert!(checkout.booking().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn gateway_failure_clears_processing_flag() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge()
            .once()
            .returning(|_| Err(PaymentError::Unavailable("timeout".to_string())));

        let mut checkout = at_payment_step(Arc::new(gateway))?;

        let result = checkout
            .process_payment(Some(PaymentDetails::new("4567")))
            .await;

        assert_eq!(
            result,
            Err(CheckoutError::Payment(PaymentError::Unavailable(
                "timeout".to_string()
            )))
        );
        assert!(!checkout.state().is_processing_payment());
        assert_eq!(checkout.current_step(), CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn payment_outside_payment_step_is_rejected() -> TestResult {
        let mut checkout = Checkout::new(cart_with_photography()?, approving_gateway())?;

        let result = checkout.begin_payment(None);

        assert_eq!(
            result,
            Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Payment,
                actual: CheckoutStep::CartReview,
            })
        );
        assert!(!checkout.state().is_processing_payment());

        Ok(())
    }

    #[test]
    fn second_payment_while_in_flight_is_rejected() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;

        let request = checkout.begin_payment(Some(PaymentDetails::new("4567")))?;

        assert_eq!(request.amount, inr(300_00));
        assert!(checkout.state().is_processing_payment());
        assert_eq!(
            checkout.begin_payment(Some(PaymentDetails::new("4567"))),
            Err(CheckoutError::PaymentInFlight)
        );

        Ok(())
    }

    #[test]
    fn resolving_without_payment_in_flight_is_rejected() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;

        let result = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "ref".to_string(),
        });

        assert_eq!(result, Err(CheckoutError::NoPaymentInFlight));

        Ok(())
    }

    #[test]
    fn withdrawn_agreement_keeps_approved_charge_for_later() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;

        checkout.begin_payment(Some(PaymentDetails::new("4567")))?;
        checkout.set_policy_agreement(false);

        let result = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "ref_A".to_string(),
        });

        assert_eq!(
            result,
            Err(CheckoutError::PaymentUnconfirmed {
                reference: "ref_A".to_string(),
                step: CheckoutStep::Payment,
            })
        );
        assert_eq!(checkout.current_step(), CheckoutStep::Payment);
        assert!(!checkout.state().is_processing_payment());
        assert!(checkout.booking().is_none());
        assert_eq!(
            checkout.state().approved_charge(),
            Some(&ApprovedCharge {
                reference: "ref_A".to_string(),
                amount: inr(300_00),
            })
        );

        checkout.set_policy_agreement(true);

        assert_eq!(
            checkout.begin_payment(Some(PaymentDetails::new("4567"))),
            Err(CheckoutError::PaymentAlreadyApproved("ref_A".to_string()))
        );

        assert!(checkout.next_step().is_moved());
        assert_eq!(checkout.current_step(), CheckoutStep::Confirmation);
        assert!(checkout.state().approved_charge().is_none());

        let booking = checkout.booking().ok_or("booking missing")?;

        assert_eq!(booking.total_amount, inr(300_00));
        assert_eq!(booking.payment_method.to_string(), "Card ending in 4567");

        Ok(())
    }

    #[test]
    fn approval_after_leaving_payment_step_is_booked_on_return() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;

        checkout.begin_payment(Some(PaymentDetails::new("4567")))?;

        assert!(checkout.prev_step().is_moved());

        let result = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "ref_B".to_string(),
        });

        assert_eq!(
            result,
            Err(CheckoutError::PaymentUnconfirmed {
                reference: "ref_B".to_string(),
                step: CheckoutStep::OrderReview,
            })
        );
        assert!(checkout.state().approved_charge().is_some());

        assert!(checkout.next_step().is_moved());
        assert_eq!(
            checkout.begin_payment(Some(PaymentDetails::new("4567"))),
            Err(CheckoutError::PaymentAlreadyApproved("ref_B".to_string()))
        );
        assert!(checkout.next_step().is_moved());

        assert_eq!(checkout.current_step(), CheckoutStep::Confirmation);
        assert!(checkout.booking().is_some());

        Ok(())
    }

    #[test]
    fn store_changes_are_seen_without_refresh() -> TestResult {
        let cart = cart_with_photography()?;
        let mut checkout = Checkout::new(cart.clone(), approving_gateway())?;

        cart.clear_cart();

        assert!(!checkout.can_proceed_to_next());
        assert_eq!(
            checkout.next_step(),
            Transition::Blocked {
                at: CheckoutStep::CartReview
            }
        );
        assert!(checkout.state().checkout_data().services().is_empty());
        assert_eq!(checkout.state().checkout_data().total_price(), inr(0));

        Ok(())
    }

    #[test]
    fn charge_and_booking_use_current_store_contents() -> TestResult {
        let cart = cart_with_photography()?;
        let mut checkout =
            Checkout::new(cart.clone(), approving_gateway())?.with_clock(fixed_clock()?);

        assert!(checkout.next_step().is_moved());
        checkout.select_address(AddressId::new("home"));
        assert!(checkout.next_step().is_moved());
        assert!(checkout.next_step().is_moved());
        checkout.select_payment_method(PaymentMethodId::new(UPI));
        checkout.set_policy_agreement(true);

        cart.add_to_cart(CartItem::new("s2", "Decor", inr(200_00)))?;

        let request = checkout.begin_payment(None)?;

        assert_eq!(request.amount, inr(500_00));

        let resolution = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "ref_C".to_string(),
        })?;

        let PaymentResolution::Confirmed { booking, .. } = resolution else {
            panic!("expected confirmation, got {resolution:?}");
        };

        assert_eq!(booking.services.len(), 2);
        assert_eq!(booking.total_amount, inr(500_00));

        Ok(())
    }

    #[test]
    fn upi_payment_needs_no_card_details() -> TestResult {
        let mut checkout = at_payment_step(approving_gateway())?;
        checkout.select_payment_method(PaymentMethodId::new(UPI));

        checkout.begin_payment(None)?;

        let resolution = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "upi_1".to_string(),
        })?;

        assert!(matches!(
            resolution,
            PaymentResolution::Confirmed { booking, .. }
                if booking.payment_method.to_string() == "UPI Payment"
        ));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_abandons_payment_in_flight() -> TestResult {
        let gateway = Arc::new(SimulatedGateway::new(Duration::from_secs(30)));
        let mut checkout = at_payment_step(gateway)?;
        let token = checkout.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        let result = checkout
            .process_payment(Some(PaymentDetails::new("4567")))
            .await;

        assert_eq!(result, Err(CheckoutError::Cancelled));
        assert_eq!(checkout.current_step(), CheckoutStep::Payment);
        assert!(!checkout.state().is_processing_payment());
        assert!(checkout.booking().is_none());

        let late = checkout.resolve_payment(PaymentOutcome::Approved {
            reference: "late".to_string(),
        });

        assert_eq!(late, Err(CheckoutError::Cancelled));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_gateway_confirms_after_delay() -> TestResult {
        let gateway = Arc::new(SimulatedGateway::new(Duration::from_secs(2)));
        let mut checkout = at_payment_step(gateway)?;

        let resolution = checkout
            .process_payment(Some(PaymentDetails::new("0042")))
            .await?;

        assert!(matches!(resolution, PaymentResolution::Confirmed { .. }));
        assert_eq!(checkout.current_step(), CheckoutStep::Confirmation);
        assert_eq!(
            checkout.prev_step(),
            Transition::AtBoundary {
                at: CheckoutStep::Confirmation
            }
        );

        Ok(())
    }

    #[test]
    fn dropping_the_session_cancels_its_token() -> TestResult {
        let checkout = Checkout::new(cart_with_photography()?, approving_gateway())?;
        let token = checkout.cancellation_token();

        checkout.abandon();

        assert!(token.is_cancelled());

        Ok(())
    }

    #[test]
    fn dropping_the_session_leaves_the_parent_token_alone() -> TestResult {
        let shutdown = CancellationToken::new();
        let checkout = Checkout::new(cart_with_photography()?, approving_gateway())?
            .with_cancellation(shutdown.clone());
        let session_token = checkout.cancellation_token();

        drop(checkout);

        assert!(session_token.is_cancelled());
        assert!(!shutdown.is_cancelled());

        Ok(())
    }

    #[test]
    fn cancelling_the_parent_cancels_the_session() -> TestResult {
        let shutdown = CancellationToken::new();
        let checkout = Checkout::new(cart_with_photography()?, approving_gateway())?
            .with_cancellation(shutdown.clone());

        shutdown.cancel();

        assert!(checkout.is_cancelled());

        Ok(())
    }
}
