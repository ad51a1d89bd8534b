//! Order completion controller.
//!
//! `Idle → Validating → (Invalid → Idle) | (Valid → Composing → Dispatching → Completed → Idle)`
//!
//! The cart is cleared and the completion marker written only after the
//! dispatcher accepted the message. A failed dispatch leaves both untouched.

pub mod validator;

pub use validator::OrderValidator;

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::domain::aggregates::{CustomerForm, FieldError, Order, OrderComposer};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::{Money, PhoneNumber};
use crate::store::{CartStore, CompletionMarkerStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Invalid,
    Valid,
    Composing,
    Dispatching,
    Completed,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{}", join_messages(.0))]
    Invalid(Vec<FieldError>),

    #[error("Could not open the chat app: {0}")]
    Dispatch(#[source] DispatchError),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderReceipt {
    pub transcript: String,
    pub completed_at: DateTime<Utc>,
    pub item_count: u64,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    /// Nothing to send; no state was touched.
    EmptyCart,
    Sent(OrderReceipt),
}

pub trait Clock { fn now(&self) -> DateTime<Utc>; }

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

pub struct OrderCompletionController<D, C = SystemClock> {
    dispatcher: D,
    clock: C,
    validator: OrderValidator,
    markers: CompletionMarkerStore,
    composer: OrderComposer,
    destination: PhoneNumber,
    dispatch_delay: Duration,
    state: CheckoutState,
    events: Vec<DomainEvent>,
}

impl<D: Dispatcher> OrderCompletionController<D> {
    pub fn new(dispatcher: D, validator: OrderValidator, markers: CompletionMarkerStore, composer: OrderComposer, destination: PhoneNumber) -> Self {
        Self {
            dispatcher, clock: SystemClock, validator, markers, composer, destination,
            dispatch_delay: Duration::ZERO, state: CheckoutState::Idle, events: vec![],
        }
    }
}

impl<D: Dispatcher, C: Clock> OrderCompletionController<D, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> OrderCompletionController<D, C2> {
        OrderCompletionController {
            dispatcher: self.dispatcher, clock, validator: self.validator, markers: self.markers,
            composer: self.composer, destination: self.destination, dispatch_delay: self.dispatch_delay,
            state: self.state, events: self.events,
        }
    }

    /// Pause before opening the link so the UI can show its "opening" notice.
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self { self.dispatch_delay = delay; self }

    pub fn state(&self) -> CheckoutState { self.state }
    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    /// Validates `form`, sends the cart as one chat message and, once the
    /// link is open, empties the cart and stamps the completion marker.
    pub async fn send(&mut self, form: &CustomerForm, cart: &mut CartStore) -> Result<SendOutcome, CheckoutError> {
        if cart.is_empty() {
            debug!("send ignored, cart is empty");
            return Ok(SendOutcome::EmptyCart);
        }

        self.transition(CheckoutState::Validating);
        let report = self.validator.validate(form);
        let Some(customer) = report.record() else {
            self.transition(CheckoutState::Invalid);
            self.raise_event(CheckoutEvent::Rejected { errors: report.messages() });
            self.transition(CheckoutState::Idle);
            return Err(CheckoutError::Invalid(report.errors));
        };
        self.transition(CheckoutState::Valid);

        self.transition(CheckoutState::Composing);
        let snapshot = cart.snapshot();
        let order = match Order::from_cart(customer, &snapshot, self.composer.currency()) {
            Ok(order) => order,
            Err(_) => { self.transition(CheckoutState::Idle); return Ok(SendOutcome::EmptyCart); }
        };
        let transcript = order.transcript(self.composer.store_name());

        self.transition(CheckoutState::Dispatching);
        if !self.dispatch_delay.is_zero() { tokio::time::sleep(self.dispatch_delay).await; }
        if let Err(e) = self.dispatcher.dispatch(&self.destination, &transcript).await {
            error!(error = %e, "order dispatch failed, cart kept");
            self.raise_event(CheckoutEvent::DispatchFailed { reason: e.to_string() });
            self.transition(CheckoutState::Idle);
            return Err(CheckoutError::Dispatch(e));
        }

        self.transition(CheckoutState::Completed);
        cart.clear();
        let completed_at = self.clock.now();
        self.markers.record(completed_at);
        let item_count = order.item_count();
        self.raise_event(CheckoutEvent::Completed { at: completed_at, item_count });
        info!(items = item_count, total = %order.total().plain(), "order handed off");
        self.transition(CheckoutState::Idle);

        Ok(SendOutcome::Sent(OrderReceipt { transcript, completed_at, item_count, total: order.total().clone() }))
    }

    /// Sends a fixed test message to the store contact. No validation, and
    /// neither the cart nor the completion marker changes.
    pub async fn send_test_message(&self) -> Result<(), CheckoutError> {
        let message = self.composer.test_message();
        self.dispatcher.dispatch(&self.destination, &message).await.map_err(CheckoutError::Dispatch)
    }

    fn transition(&mut self, to: CheckoutState) {
        let from = std::mem::replace(&mut self.state, to);
        debug!(?from, ?to, "checkout state");
        self.raise_event(CheckoutEvent::StateChanged { from, to });
    }

    fn raise_event(&mut self, e: CheckoutEvent) { self.events.push(DomainEvent::Checkout(e)); }
}
