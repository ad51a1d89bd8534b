//! Application context owning the catalog, the stores and the checkout
//! controller. A presentation layer drives it and renders what it returns.

use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::catalog::Catalog;
use crate::checkout::{CheckoutError, Clock, OrderCompletionController, OrderValidator, SendOutcome};
use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::domain::aggregates::{CustomerForm, CustomerProfile, OrderComposer, Product, ProfileField, ALL_CATEGORIES};
use crate::domain::events::DomainEvent;
use crate::storage::{SharedStorage, SlotKeys};
use crate::store::{CartStore, CompletionMarkerStore, CustomerProfileStore};

/// Current search box text and category chip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogView { pub search_term: String, pub category: String }

impl Default for CatalogView {
    fn default() -> Self { Self { search_term: String::new(), category: ALL_CATEGORIES.to_string() } }
}

pub struct Storefront<D, C> {
    catalog: Arc<Catalog>,
    view: CatalogView,
    cart: CartStore,
    profiles: CustomerProfileStore,
    markers: CompletionMarkerStore,
    checkout: OrderCompletionController<D, C>,
}

impl<D: Dispatcher, C: Clock> Storefront<D, C> {
    /// Wires an already-loaded catalog to storage and hydrates every store.
    pub fn new(config: &AppConfig, catalog: Catalog, storage: SharedStorage, dispatcher: D, clock: C) -> Self {
        let keys = SlotKeys::new(&config.storage_namespace);
        let catalog = Arc::new(catalog);
        let cart = CartStore::open(storage.clone(), keys.cart(), catalog.clone(), &config.currency);
        let profiles = CustomerProfileStore::new(storage.clone(), keys.customer());
        let markers = CompletionMarkerStore::new(storage, keys.order_completed())
            .with_window(Duration::minutes(config.ack_window_mins));
        let composer = OrderComposer::new(&config.store_name, &config.currency);
        let checkout = OrderCompletionController::new(
            dispatcher, OrderValidator::new(profiles.clone()), markers.clone(), composer, config.whatsapp_number.clone(),
        )
        .with_clock(clock)
        .with_dispatch_delay(config.dispatch_delay);
        info!(products = catalog.len(), cart_entries = cart.entries().len(), "storefront ready");
        Self { catalog, view: CatalogView::default(), cart, profiles, markers, checkout }
    }

    /// Loads the catalog from `config.catalog_path`; a failure ends the session.
    pub async fn init(config: &AppConfig, storage: SharedStorage, dispatcher: D, clock: C) -> crate::Result<Self> {
        let catalog = Catalog::load(&config.catalog_path).await?;
        Ok(Self::new(config, catalog, storage, dispatcher, clock))
    }

    /// Empties the cart and resets the search and category filters.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.view = CatalogView::default();
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn view(&self) -> &CatalogView { &self.view }
    pub fn set_search(&mut self, term: &str) { self.view.search_term = term.trim().to_string(); }
    pub fn set_category(&mut self, category: &str) { self.view.category = category.to_string(); }

    pub fn visible_products(&self) -> Vec<&Product> {
        self.catalog.filter(&self.view.search_term, &self.view.category)
    }

    pub fn cart(&self) -> &CartStore { &self.cart }
    pub fn cart_mut(&mut self) -> &mut CartStore { &mut self.cart }

    pub fn profile(&self) -> CustomerProfile { self.profiles.load() }
    pub fn remember(&self, field: ProfileField, value: &str) { self.profiles.remember(field, value); }
    pub fn checkout_form(&self) -> CustomerForm { CustomerForm::prefilled(&self.profiles.load()) }

    pub async fn send_order(&mut self, form: &CustomerForm) -> Result<SendOutcome, CheckoutError> {
        self.checkout.send(form, &mut self.cart).await
    }

    pub async fn send_test_message(&self) -> Result<(), CheckoutError> { self.checkout.send_test_message().await }

    pub fn completion_markers(&self) -> &CompletionMarkerStore { &self.markers }

    /// Cart and checkout events since the last call, cart first.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = self.cart.take_events();
        events.extend(self.checkout.take_events());
        events
    }
}
