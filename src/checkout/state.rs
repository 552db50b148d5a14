//! Checkout State

use rusty_money::iso::Currency;

use crate::{
    checkout::{data::CheckoutData, step::CheckoutStep},
    ids::{AddressId, PaymentMethodId},
    payment::{CARD_FORM, PaymentDetails},
    pricing::Price,
};

/// A charge the gateway approved that has not been turned into a booking yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedCharge {
    /// Gateway reference for the charge.
    pub reference: String,

    /// Amount charged.
    pub amount: Price,
}

/// Result of asking the machine to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The step changed.
    Moved {
        /// Step before the move.
        from: CheckoutStep,
        /// Step after the move.
        to: CheckoutStep,
    },

    /// The guard for the current step does not hold.
    Blocked {
        /// Step the machine stayed on.
        at: CheckoutStep,
    },

    /// There is no step in that direction.
    AtBoundary {
        /// Step the machine stayed on.
        at: CheckoutStep,
    },
}

impl Transition {
    /// Check if the step changed.
    pub fn is_moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// The step the machine is on after the transition.
    pub fn current(self) -> CheckoutStep {
        match self {
            Self::Moved { to, .. } => to,
            Self::Blocked { at } | Self::AtBoundary { at } => at,
        }
    }
}

/// Transient state of one checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutState {
    pub(crate) current_step: CheckoutStep,
    pub(crate) checkout_data: CheckoutData,
    pub(crate) selected_address_id: Option<AddressId>,
    pub(crate) selected_payment_method_id: Option<PaymentMethodId>,
    pub(crate) payment_details: Option<PaymentDetails>,
    pub(crate) charge_in_flight: Option<Price>,
    pub(crate) approved_charge: Option<ApprovedCharge>,
    pub(crate) agreed_to_policies: bool,
}

impl CheckoutState {
    /// Fresh state on the first step with an empty cart snapshot.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            current_step: CheckoutStep::CartReview,
            checkout_data: CheckoutData::empty(currency),
            selected_address_id: None,
            selected_payment_method_id: None,
            payment_details: None,
            charge_in_flight: None,
            approved_charge: None,
            agreed_to_policies: false,
        }
    }

    /// Current step.
    pub fn current_step(&self) -> CheckoutStep {
        self.current_step
    }

    /// Cart snapshot and discount.
    pub fn checkout_data(&self) -> &CheckoutData {
        &self.checkout_data
    }

    /// Selected address.
    pub fn selected_address_id(&self) -> Option<&AddressId> {
        self.selected_address_id.as_ref()
    }

    /// Selected payment method.
    pub fn selected_payment_method_id(&self) -> Option<&PaymentMethodId> {
        self.selected_payment_method_id.as_ref()
    }

    /// Card details from the payment form.
    pub fn payment_details(&self) -> Option<&PaymentDetails> {
        self.payment_details.as_ref()
    }

    /// Check if a charge is in flight.
    pub fn is_processing_payment(&self) -> bool {
        self.charge_in_flight.is_some()
    }

    /// Approved charge still waiting for the checkout to confirm.
    pub fn approved_charge(&self) -> Option<&ApprovedCharge> {
        self.approved_charge.as_ref()
    }

    /// Check if the customer accepted the booking policies.
    pub fn agreed_to_policies(&self) -> bool {
        self.agreed_to_policies
    }

    /// Guard for leaving the current step forwards.
    pub fn can_proceed_to_next(&self) -> bool {
        match self.current_step {
            CheckoutStep::CartReview => !self.checkout_data.services().is_empty(),
            CheckoutStep::AddressSelection => self.selected_address_id.is_some(),
            CheckoutStep::OrderReview | CheckoutStep::Confirmation => true,
            CheckoutStep::Payment => self.payment_ready(),
        }
    }

    /// Payment step guard. The card form needs captured details; any other
    /// method only needs to be selected. Policies must be accepted either way.
    pub fn payment_ready(&self) -> bool {
        let method_ready = match &self.selected_payment_method_id {
            Some(method) if *method == CARD_FORM => self.payment_details.is_some(),
            Some(_) => true,
            None => false,
        };

        method_ready && self.agreed_to_policies
    }

    /// Move one step forward if the guard holds.
    pub(crate) fn advance(&mut self) -> Transition {
        let from = self.current_step;

        let Some(to) = from.next() else {
            return Transition::AtBoundary { at: from };
        };

        if !self.can_proceed_to_next() {
            return Transition::Blocked { at: from };
        }

        self.current_step = to;

        Transition::Moved { from, to }
    }

    /// Move one step back. No business guard applies.
    pub(crate) fn retreat(&mut self) -> Transition {
        let from = self.current_step;

        match from.previous() {
            Some(to) => {
                self.current_step = to;
                Transition::Moved { from, to }
            }
            None => Transition::AtBoundary { at: from },
        }
    }
}
