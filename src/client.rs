//! yew_paddle/src/client.rs
//!
//! High-level checkout client sitting on top of Paddle.js.
//!
//! This module provides:
//! - `CheckoutDriver`, the seam between the client and the browser (the real
//!   implementation is `interop::PaddleJs`).
//! - `CheckoutClient::initialize()` to load and configure Paddle.js exactly once,
//!   sharing one in-flight attempt between concurrent callers.
//! - `open_catalog_session()` / `open_amount_session()` / `open_plan_session()`
//!   to open the overlay and wait for its terminal event.
//!
//! Paddle only supports one overlay per tab and reports results through a
//! single global `eventCallback`, so the client keeps one pending session slot
//! and routes each terminal event to whoever is waiting in it.
//!
//! # Example Usage
//! ```rust,ignore
//! use yew_paddle::{paddle, CatalogSession, SessionOutcome};
//!
//! wasm_bindgen_futures::spawn_local(async move {
//!     let client = paddle();
//!     match client.open_catalog_session(CatalogSession::new("pri_123")).await {
//!         Ok(SessionOutcome::Completed(done)) => log::info!("paid: {:?}", done.transaction_id),
//!         Ok(SessionOutcome::Closed) => log::info!("overlay closed"),
//!         Ok(SessionOutcome::Failed(err)) | Err(err) => log::error!("checkout failed: {err}"),
//!     }
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt, LocalBoxFuture, Shared};
use serde_json::{json, Map, Value};

use crate::amount::{exact_minor_units, format_usd, validate_amount};
use crate::config::{DonationStrategy, PaddleConfig};
use crate::error::CheckoutError;
use crate::paddle::{terminal_event, CheckoutOptions, Customer, LineItem, PaddleSetup, TerminalEvent};
use crate::session::{
    CatalogSession, CompletedCheckout, PlanDescriptor, SessionId, SessionOutcome,
    SessionRequest, DONATION_DESCRIPTION,
};

/// Receives every raw payload Paddle passes to its `eventCallback`.
pub type EventHandler = Rc<dyn Fn(Value)>;

/// Everything the client needs from the page it runs in.
pub trait CheckoutDriver {
    /// Insert the vendor `<script>` and resolve once it has loaded.
    fn load_script(&self, src: &str, element_id: &str)
        -> LocalBoxFuture<'static, Result<(), CheckoutError>>;

    /// Set the environment, run the seller setup and register `on_event`.
    fn configure(&self, setup: &PaddleSetup, on_event: EventHandler) -> Result<(), CheckoutError>;

    /// Ask the vendor to present its checkout overlay. Returns immediately.
    fn open_checkout(&self, options: &CheckoutOptions) -> Result<(), CheckoutError>;

    /// Blocking yes/no prompt shown to the user.
    fn confirm(&self, message: &str) -> bool;

    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()>;

    fn navigate(&self, url: &str);

    /// Page origin, e.g. `https://example.com`.
    fn origin(&self) -> Option<String>;
}

type InitFuture = Shared<LocalBoxFuture<'static, Result<(), CheckoutError>>>;

enum Lifecycle {
    Uninitialized,
    Initializing(InitFuture),
    Initialized,
}

struct Pending {
    id: SessionId,
    redirect: String,
    tx: oneshot::Sender<SessionOutcome>,
}

struct Inner<D> {
    driver: D,
    config: PaddleConfig,
    lifecycle: RefCell<Lifecycle>,
    pending: RefCell<Option<Pending>>,
    next_session: Cell<u64>,
}

/// Frees the session slot if its session is dropped before resolving.
struct SessionTicket<'a, D> {
    inner: &'a Inner<D>,
    id: SessionId,
}

impl<D> Drop for SessionTicket<'_, D> {
    fn drop(&mut self) {
        let mut slot = self.inner.pending.borrow_mut();
        if slot.as_ref().is_some_and(|pending| pending.id == self.id) {
            log::debug!("{} released before a terminal event", self.id);
            *slot = None;
        }
    }
}

impl<D: CheckoutDriver + 'static> Inner<D> {
    async fn bootstrap(self: Rc<Self>) -> Result<(), CheckoutError> {
        let result = self.load_and_configure().await;
        *self.lifecycle.borrow_mut() = match &result {
            Ok(()) => {
                log::info!(
                    "paddle ready (seller {}, {})",
                    self.config.seller_id,
                    self.config.environment.as_str()
                );
                Lifecycle::Initialized
            }
            Err(err) => {
                log::error!("paddle initialization failed: {err}");
                Lifecycle::Uninitialized
            }
        };
        result
    }

    async fn load_and_configure(self: &Rc<Self>) -> Result<(), CheckoutError> {
        log::debug!("loading {}", self.config.script_url);
        self.driver
            .load_script(&self.config.script_url, &self.config.script_element_id)
            .await?;
        self.driver
            .configure(&PaddleSetup::from(&self.config), self.event_handler())
    }

    fn event_handler(self: &Rc<Self>) -> EventHandler {
        let inner: Weak<Self> = Rc::downgrade(self);
        Rc::new(move |payload| {
            if let Some(inner) = inner.upgrade() {
                if let Some(event) = terminal_event(payload) {
                    inner.resolve(event, false);
                }
            }
        })
    }

    fn reserve(
        &self,
        request: &SessionRequest,
    ) -> Result<(SessionTicket<'_, D>, oneshot::Receiver<SessionOutcome>), CheckoutError> {
        let mut slot = self.pending.borrow_mut();
        if let Some(open) = slot.as_ref() {
            log::warn!("refusing a second checkout while {} is open", open.id);
            return Err(CheckoutError::SessionInProgress);
        }
        let id = SessionId(self.next_session.get());
        self.next_session.set(id.0 + 1);
        let (tx, rx) = oneshot::channel();
        *slot = Some(Pending {
            id,
            redirect: request.dashboard_url(&self.config.dashboard_path),
            tx,
        });
        Ok((SessionTicket { inner: self, id }, rx))
    }

    /// Hand a terminal event to the pending session. Later events for the
    /// same session find the slot empty and are dropped.
    fn resolve(&self, event: TerminalEvent, simulated: bool) {
        let taken = self.pending.borrow_mut().take();
        let Some(pending) = taken else {
            log::debug!("terminal event {event:?} with no open session");
            return;
        };
        let outcome = match event {
            TerminalEvent::Completed { transaction_id } => {
                SessionOutcome::Completed(CompletedCheckout {
                    session: pending.id,
                    transaction_id,
                    simulated,
                })
            }
            TerminalEvent::Closed => SessionOutcome::Closed,
            TerminalEvent::Failed(err) => SessionOutcome::Failed(err),
        };
        log::info!("{} resolved: {outcome:?}", pending.id);
        let redirect = matches!(outcome, SessionOutcome::Completed(_))
            && self.config.redirect_on_complete;
        if pending.tx.send(outcome).is_err() {
            log::warn!("{} resolved after its caller went away", pending.id);
        }
        if redirect {
            self.driver.navigate(&pending.redirect);
        }
    }
}

/// Process-wide Paddle checkout client.
///
/// Cheap to share through `Rc`; all methods take `&self`.
pub struct CheckoutClient<D: CheckoutDriver + 'static> {
    inner: Rc<Inner<D>>,
}

impl<D: CheckoutDriver + 'static> CheckoutClient<D> {
    pub fn new(driver: D, config: PaddleConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                driver,
                config,
                lifecycle: RefCell::new(Lifecycle::Uninitialized),
                pending: RefCell::new(None),
                next_session: Cell::new(1),
            }),
        }
    }

    pub fn config(&self) -> &PaddleConfig {
        &self.inner.config
    }

    pub fn driver(&self) -> &D {
        &self.inner.driver
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.inner.lifecycle.borrow(), Lifecycle::Initialized)
    }

    pub fn has_open_session(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// Load and configure Paddle.js.
    ///
    /// Idempotent. Callers arriving while an attempt is in flight await that
    /// same attempt and see the same result. After a failure the next call
    /// starts a fresh attempt.
    pub async fn initialize(&self) -> Result<(), CheckoutError> {
        let mut lifecycle = self.inner.lifecycle.borrow_mut();
        let joined = match &*lifecycle {
            Lifecycle::Initialized => return Ok(()),
            Lifecycle::Initializing(attempt) => Some(attempt.clone()),
            Lifecycle::Uninitialized => None,
        };
        let attempt = match joined {
            Some(attempt) => attempt,
            None => {
                let attempt = Rc::clone(&self.inner).bootstrap().boxed_local().shared();
                *lifecycle = Lifecycle::Initializing(attempt.clone());
                attempt
            }
        };
        drop(lifecycle);
        attempt.await
    }

    /// Open the overlay for a fixed-price catalog item and wait for the outcome.
    pub async fn open_catalog_session(
        &self,
        session: CatalogSession,
    ) -> Result<SessionOutcome, CheckoutError> {
        if session.price_id.trim().is_empty() {
            return Err(CheckoutError::validation("a catalog price id is required"));
        }
        if session.quantity == 0 {
            return Err(CheckoutError::validation("quantity must be at least 1"));
        }
        let request = session.to_request();
        let success_url = session
            .success_url
            .or_else(|| self.absolute(&request.dashboard_url(&self.inner.config.dashboard_path)));
        let options = CheckoutOptions {
            items: vec![LineItem {
                price_id: session.price_id,
                quantity: session.quantity,
            }],
            customer: session.customer_email.map(|email| Customer { email }),
            custom_data: session.custom_data,
            success_url,
            settings: self.inner.config.display.clone(),
        };
        self.run_session(request, options).await
    }

    /// Open a checkout for a free-form donation amount.
    ///
    /// Amounts below the minimum fail before anything is loaded. With the
    /// default `SimulatedConfirmation` strategy this does NOT charge anything:
    /// it asks the browser to confirm and then reports a simulated success.
    /// Configure `DonationStrategy::UnitPrice` for a real vendor-side charge.
    pub async fn open_amount_session(
        &self,
        amount: f64,
        description: &str,
    ) -> Result<SessionOutcome, CheckoutError> {
        let amount = validate_amount(amount)?;
        let request = SessionRequest::donation(amount, description);
        match &self.inner.config.donation {
            DonationStrategy::UnitPrice {
                price_id,
                unit_minor,
            } => {
                let quantity = unit_quantity(amount, *unit_minor)?;
                let options = CheckoutOptions {
                    items: vec![LineItem {
                        price_id: price_id.clone(),
                        quantity,
                    }],
                    customer: None,
                    custom_data: donation_data(amount, description),
                    success_url: self
                        .absolute(&request.dashboard_url(&self.inner.config.dashboard_path)),
                    settings: self.inner.config.display.clone(),
                };
                self.run_session(request, options).await
            }
            DonationStrategy::SimulatedConfirmation { settle_ms } => {
                self.simulate_donation(request, amount, *settle_ms).await
            }
        }
    }

    /// Open whatever checkout a plan descriptor calls for.
    pub async fn open_plan_session(
        &self,
        plan: &PlanDescriptor,
        customer_email: Option<&str>,
    ) -> Result<SessionOutcome, CheckoutError> {
        match plan {
            PlanDescriptor::Donation { amount } => {
                self.open_amount_session(*amount, DONATION_DESCRIPTION).await
            }
            PlanDescriptor::Subscription { tier, cycle } => {
                let price_id = self
                    .inner
                    .config
                    .catalog
                    .price_for(*tier, *cycle)
                    .ok_or_else(|| {
                        CheckoutError::validation(format!(
                            "no price configured for the {} {} plan",
                            tier.as_str(),
                            cycle.as_str()
                        ))
                    })?;
                let mut data = Map::new();
                data.insert("planType".into(), json!(tier.as_str()));
                data.insert("billingCycle".into(), json!(cycle.as_str()));
                if let Some(email) = customer_email {
                    data.insert("userId".into(), json!(email));
                }
                let session = CatalogSession::new(price_id)
                    .plan(*tier, *cycle)
                    .customer_email(customer_email)
                    .custom_data(data);
                self.open_catalog_session(session).await
            }
        }
    }

    async fn run_session(
        &self,
        request: SessionRequest,
        options: CheckoutOptions,
    ) -> Result<SessionOutcome, CheckoutError> {
        self.initialize().await?;
        let (ticket, rx) = self.inner.reserve(&request)?;
        log::info!("{} opening checkout: {:?}", ticket.id, request.kind);
        self.inner.driver.open_checkout(&options)?;
        Ok(self.await_outcome(ticket, rx).await)
    }

    async fn simulate_donation(
        &self,
        request: SessionRequest,
        amount: f64,
        settle_ms: u32,
    ) -> Result<SessionOutcome, CheckoutError> {
        self.initialize().await?;
        let (ticket, rx) = self.inner.reserve(&request)?;
        log::warn!(
            "{} simulating a {} donation; no payment will be captured",
            ticket.id,
            format_usd(amount)
        );
        let prompt = format!("Confirm donation of {}?", format_usd(amount));
        if self.inner.driver.confirm(&prompt) {
            self.inner.driver.sleep(settle_ms).await;
            self.inner.resolve(
                TerminalEvent::Completed {
                    transaction_id: None,
                },
                true,
            );
        } else {
            self.inner.resolve(TerminalEvent::Closed, false);
        }
        Ok(self.await_outcome(ticket, rx).await)
    }

    async fn await_outcome(
        &self,
        ticket: SessionTicket<'_, D>,
        rx: oneshot::Receiver<SessionOutcome>,
    ) -> SessionOutcome {
        let received = match self.inner.config.session_timeout_ms {
            None => rx.await,
            Some(after_ms) => match future::select(rx, self.inner.driver.sleep(after_ms)).await {
                Either::Left((received, _)) => received,
                Either::Right(_) => {
                    log::warn!("{} timed out after {after_ms} ms", ticket.id);
                    return SessionOutcome::Failed(CheckoutError::Timeout { after_ms });
                }
            },
        };
        received.unwrap_or_else(|_| {
            SessionOutcome::Failed(CheckoutError::rejection("checkout session was abandoned"))
        })
    }

    fn absolute(&self, path: &str) -> Option<String> {
        self.inner
            .driver
            .origin()
            .map(|origin| format!("{}{path}", origin.trim_end_matches('/')))
    }
}

fn donation_data(amount: f64, description: &str) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("planType".into(), json!("donation"));
    data.insert("amount".into(), json!(amount));
    data.insert("description".into(), json!(description));
    data
}

/// Quantity of a `unit_minor`-cent price that adds up to `amount`.
fn unit_quantity(amount: f64, unit_minor: u32) -> Result<u32, CheckoutError> {
    if unit_minor == 0 {
        return Err(CheckoutError::validation("donation unit price must be positive"));
    }
    let minor = exact_minor_units(amount).ok_or_else(|| CheckoutError::fractional_cents(amount))?;
    let unit = u64::from(unit_minor);
    if minor % unit != 0 {
        return Err(CheckoutError::validation(format!(
            "{} is not a multiple of {}",
            format_usd(amount),
            format_usd(unit as f64 / 100.0)
        )));
    }
    u32::try_from(minor / unit)
        .map_err(|_| CheckoutError::validation(format!("{} is too large", format_usd(amount))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BillingCycle, PlanTier};
    use crate::testing::MockDriver;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use serde_json::json;
    use std::future::Future;
    use std::task::Context;

    fn client_with(driver: MockDriver, config: PaddleConfig) -> Rc<CheckoutClient<MockDriver>> {
        Rc::new(CheckoutClient::new(driver, config))
    }

    fn client() -> Rc<CheckoutClient<MockDriver>> {
        client_with(MockDriver::default(), PaddleConfig::default())
    }

    type Slot<T> = Rc<RefCell<Option<T>>>;

    fn spawn_session(
        pool: &LocalPool,
        client: &Rc<CheckoutClient<MockDriver>>,
        session: CatalogSession,
    ) -> Slot<Result<SessionOutcome, CheckoutError>> {
        let slot: Slot<_> = Rc::new(RefCell::new(None));
        let (client, out) = (Rc::clone(client), Rc::clone(&slot));
        pool.spawner()
            .spawn_local(async move {
                let result = client.open_catalog_session(session).await;
                *out.borrow_mut() = Some(result);
            })
            .unwrap();
        slot
    }

    #[test]
    fn test_concurrent_initialize_loads_script_once() {
        let client = client_with(MockDriver::gated(), PaddleConfig::default());
        let mut pool = LocalPool::new();
        let results = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..5 {
            let (client, results) = (Rc::clone(&client), Rc::clone(&results));
            pool.spawner()
                .spawn_local(async move {
                    let result = client.initialize().await;
                    results.borrow_mut().push(result);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(client.driver().script_loads(), 1);
        assert!(results.borrow().is_empty());
        assert!(!client.is_initialized());

        client.driver().finish_loads(Ok(()));
        pool.run();
        assert_eq!(*results.borrow(), vec![Ok(()); 5]);
        assert!(client.is_initialized());
        assert_eq!(client.driver().setups(), 1);

        block_on(client.initialize()).unwrap();
        assert_eq!(client.driver().script_loads(), 1);
    }

    #[test]
    fn test_concurrent_initialize_shares_failure_then_retries() {
        let client = client_with(MockDriver::gated(), PaddleConfig::default());
        let mut pool = LocalPool::new();
        let results = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..3 {
            let (client, results) = (Rc::clone(&client), Rc::clone(&results));
            pool.spawner()
                .spawn_local(async move {
                    let result = client.initialize().await;
                    results.borrow_mut().push(result);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        let failure = CheckoutError::Initialization("Failed to load Paddle.js".into());
        client.driver().finish_loads(Err(failure.clone()));
        pool.run();
        assert_eq!(*results.borrow(), vec![Err(failure); 3]);
        assert!(!client.is_initialized());
        assert_eq!(client.driver().setups(), 0);

        results.borrow_mut().clear();
        {
            let (client, results) = (Rc::clone(&client), Rc::clone(&results));
            pool.spawner()
                .spawn_local(async move {
                    let result = client.initialize().await;
                    results.borrow_mut().push(result);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(client.driver().script_loads(), 2);
        client.driver().finish_loads(Ok(()));
        pool.run();
        assert_eq!(*results.borrow(), vec![Ok(())]);
        assert!(client.is_initialized());
    }

    #[test]
    fn test_retry_after_failed_load_loads_again() {
        let driver = MockDriver::default();
        driver.fail_next_load(CheckoutError::Initialization("offline".into()));
        let client = client_with(driver, PaddleConfig::default());

        assert!(matches!(
            block_on(client.initialize()),
            Err(CheckoutError::Initialization(_))
        ));
        assert!(!client.is_initialized());
        assert_eq!(block_on(client.initialize()), Ok(()));
        assert_eq!(client.driver().script_loads(), 2);
        assert!(client.is_initialized());
    }

    #[test]
    fn test_configure_failure_leaves_uninitialized() {
        let driver = MockDriver::default();
        driver.fail_configure(CheckoutError::Initialization("Paddle.Setup threw".into()));
        let client = client_with(driver, PaddleConfig::default());
        assert_eq!(
            block_on(client.initialize()),
            Err(CheckoutError::Initialization("Paddle.Setup threw".into()))
        );
        assert!(!client.is_initialized());
    }

    #[test]
    fn test_setup_uses_configured_seller() {
        let client = client_with(MockDriver::default(), PaddleConfig::sandbox(1234));
        block_on(client.initialize()).unwrap();
        let setup = client.driver().last_setup().unwrap();
        assert_eq!(setup.seller, 1234);
        assert_eq!(setup.environment.as_str(), "sandbox");
    }

    #[test]
    fn test_catalog_session_completes_and_redirects() {
        let client = client();
        let mut pool = LocalPool::new();
        let result = spawn_session(
            &pool,
            &client,
            CatalogSession::new("pri_1").plan(PlanTier::Pro, BillingCycle::Monthly),
        );
        pool.run_until_stalled();
        assert!(client.has_open_session());

        let opened = client.driver().opened();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0]["items"], json!([{ "priceId": "pri_1", "quantity": 1 }]));
        assert_eq!(
            opened[0]["successUrl"],
            json!("https://app.test/dashboard?payment=success&plan=pro&billing=monthly")
        );

        client.driver().emit(json!({
            "name": "checkout.completed",
            "data": { "transaction_id": "txn_9" }
        }));
        pool.run();
        match result.borrow_mut().take() {
            Some(Ok(SessionOutcome::Completed(done))) => {
                assert_eq!(done.transaction_id.as_deref(), Some("txn_9"));
                assert!(!done.simulated);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            client.driver().navigations(),
            vec!["/dashboard?payment=success&plan=pro&billing=monthly".to_string()]
        );
        assert!(!client.has_open_session());
    }

    #[test]
    fn test_closed_and_error_do_not_redirect() {
        let client = client();
        let mut pool = LocalPool::new();

        let first = spawn_session(&pool, &client, CatalogSession::new("pri_1"));
        pool.run_until_stalled();
        client.driver().emit(json!({ "name": "checkout.closed", "data": {} }));
        pool.run();
        assert_eq!(first.borrow_mut().take(), Some(Ok(SessionOutcome::Closed)));

        let second = spawn_session(&pool, &client, CatalogSession::new("pri_1"));
        pool.run_until_stalled();
        client.driver().emit(json!({
            "name": "checkout.error",
            "error": { "detail": "Card declined", "code": "declined" }
        }));
        pool.run();
        assert_eq!(
            second.borrow_mut().take(),
            Some(Ok(SessionOutcome::Failed(CheckoutError::VendorRejection {
                message: "Card declined".into(),
                code: Some("declined".into()),
            })))
        );
        assert!(client.driver().navigations().is_empty());
    }

    #[test]
    fn test_second_session_is_refused_without_disturbing_first() {
        let client = client();
        let mut pool = LocalPool::new();
        let first = spawn_session(&pool, &client, CatalogSession::new("pri_1"));
        pool.run_until_stalled();

        assert_eq!(
            block_on(client.open_amount_session(10.0, "Donation")),
            Err(CheckoutError::SessionInProgress)
        );
        assert_eq!(
            block_on(client.open_catalog_session(CatalogSession::new("pri_2"))),
            Err(CheckoutError::SessionInProgress)
        );
        assert_eq!(client.driver().opened().len(), 1);

        client.driver().emit(json!({ "name": "checkout.completed", "data": {} }));
        pool.run();
        assert!(matches!(
            first.borrow_mut().take(),
            Some(Ok(SessionOutcome::Completed(_)))
        ));
    }

    #[test]
    fn test_duplicate_terminal_events_are_ignored() {
        let client = client();
        let mut pool = LocalPool::new();
        let result = spawn_session(&pool, &client, CatalogSession::new("pri_1"));
        pool.run_until_stalled();
        client.driver().emit(json!({ "name": "checkout.loaded" }));
        pool.run_until_stalled();
        assert!(client.has_open_session());

        client.driver().emit(json!({ "name": "checkout.completed", "data": {} }));
        client.driver().emit(json!({ "name": "checkout.closed" }));
        pool.run();
        assert!(matches!(
            result.borrow_mut().take(),
            Some(Ok(SessionOutcome::Completed(_)))
        ));
        assert_eq!(client.driver().navigations().len(), 1);
    }

    #[test]
    fn test_event_without_session_is_dropped() {
        let client = client();
        block_on(client.initialize()).unwrap();
        client.driver().emit(json!({ "name": "checkout.completed" }));
        assert!(client.driver().navigations().is_empty());
    }

    #[test]
    fn test_malformed_event_fails_session() {
        let client = client();
        let mut pool = LocalPool::new();
        let result = spawn_session(&pool, &client, CatalogSession::new("pri_1"));
        pool.run_until_stalled();
        client.driver().emit(json!("garbage"));
        pool.run();
        assert!(matches!(
            result.borrow_mut().take(),
            Some(Ok(SessionOutcome::Failed(CheckoutError::VendorRejection { .. })))
        ));
    }

    #[test]
    fn test_open_failure_frees_slot() {
        let driver = MockDriver::default();
        driver.fail_open(CheckoutError::rejection("Paddle.Checkout.open threw"));
        let client = client_with(driver, PaddleConfig::default());
        assert_eq!(
            block_on(client.open_catalog_session(CatalogSession::new("pri_1"))),
            Err(CheckoutError::rejection("Paddle.Checkout.open threw"))
        );
        assert!(!client.has_open_session());
    }

    #[test]
    fn test_dropped_session_frees_slot() {
        let client = client();
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut session = Box::pin(client.open_catalog_session(CatalogSession::new("pri_1")));
        assert!(session.as_mut().poll(&mut cx).is_pending());
        assert!(client.has_open_session());
        drop(session);
        assert!(!client.has_open_session());
    }

    #[test]
    fn test_catalog_validation() {
        let client = client();
        assert!(matches!(
            block_on(client.open_catalog_session(CatalogSession::new(" "))),
            Err(CheckoutError::Validation { .. })
        ));
        assert!(matches!(
            block_on(client.open_catalog_session(CatalogSession::new("pri_1").quantity(0))),
            Err(CheckoutError::Validation { .. })
        ));
        assert_eq!(client.driver().script_loads(), 0);
    }

    #[test]
    fn test_amount_below_minimum_fails_fast() {
        let client = client();
        for amount in [0.0, 0.5, 0.99, -3.0, f64::NAN] {
            assert!(matches!(
                block_on(client.open_amount_session(amount, "Donation")),
                Err(CheckoutError::Validation { .. })
            ));
        }
        assert_eq!(client.driver().script_loads(), 0);
        assert!(client.driver().prompts().is_empty());
    }

    #[test]
    fn test_fractional_cent_amount_fails_fast() {
        let config = PaddleConfig {
            donation: DonationStrategy::UnitPrice {
                price_id: "pri_cent".into(),
                unit_minor: 1,
            },
            ..PaddleConfig::default()
        };
        let client = client_with(MockDriver::default(), config);
        for amount in [25.004, 12.345] {
            assert!(matches!(
                block_on(client.open_amount_session(amount, "Donation")),
                Err(CheckoutError::Validation { .. })
            ));
        }
        assert_eq!(client.driver().script_loads(), 0);
        assert!(client.driver().opened().is_empty());
    }

    #[test]
    fn test_simulated_donation_confirmed() {
        let client = client();
        let outcome = block_on(client.open_amount_session(25.0, "Donation")).unwrap();
        match outcome {
            SessionOutcome::Completed(done) => {
                assert!(done.simulated);
                assert_eq!(done.transaction_id, None);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            client.driver().prompts(),
            vec!["Confirm donation of $25.00?".to_string()]
        );
        assert_eq!(client.driver().sleeps(), vec![1000]);
        assert_eq!(
            client.driver().navigations(),
            vec!["/dashboard?payment=success&type=donation&amount=25".to_string()]
        );
        assert!(client.driver().opened().is_empty());
    }

    #[test]
    fn test_simulated_donation_declined() {
        let driver = MockDriver::default();
        driver.answer_prompts(false);
        let client = client_with(driver, PaddleConfig::default());
        assert_eq!(
            block_on(client.open_amount_session(10.0, "Donation")),
            Ok(SessionOutcome::Closed)
        );
        assert!(client.driver().navigations().is_empty());
        assert!(!client.has_open_session());
    }

    #[test]
    fn test_amount_session_refused_while_simulation_settles() {
        let client = client_with(MockDriver::gated(), PaddleConfig::default());
        let mut pool = LocalPool::new();
        let first = Rc::new(RefCell::new(None));
        {
            let (client, first) = (Rc::clone(&client), Rc::clone(&first));
            pool.spawner()
                .spawn_local(async move {
                    let result = client.open_amount_session(50.0, "Donation").await;
                    *first.borrow_mut() = Some(result);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        client.driver().finish_loads(Ok(()));
        pool.run_until_stalled();
        assert!(client.has_open_session());

        assert_eq!(
            block_on(client.open_amount_session(5.0, "Donation")),
            Err(CheckoutError::SessionInProgress)
        );

        client.driver().wake_sleepers();
        pool.run();
        assert!(matches!(
            first.borrow_mut().take(),
            Some(Ok(SessionOutcome::Completed(CompletedCheckout { simulated: true, .. })))
        ));
    }

    #[test]
    fn test_unit_price_donation_opens_checkout() {
        let config = PaddleConfig {
            donation: DonationStrategy::UnitPrice {
                price_id: "pri_cent".into(),
                unit_minor: 1,
            },
            ..PaddleConfig::default()
        };
        let client = client_with(MockDriver::default(), config);
        let mut pool = LocalPool::new();
        let result = Rc::new(RefCell::new(None));
        {
            let (client, result) = (Rc::clone(&client), Rc::clone(&result));
            pool.spawner()
                .spawn_local(async move {
                    let outcome = client.open_amount_session(12.34, "Donation").await;
                    *result.borrow_mut() = Some(outcome);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        let opened = client.driver().opened();
        assert_eq!(opened[0]["items"], json!([{ "priceId": "pri_cent", "quantity": 1234 }]));
        assert_eq!(opened[0]["customData"]["planType"], json!("donation"));
        assert!(client.driver().prompts().is_empty());

        client.driver().emit(json!({ "name": "checkout.completed", "data": { "id": "txn_d" } }));
        pool.run();
        assert!(matches!(
            result.borrow_mut().take(),
            Some(Ok(SessionOutcome::Completed(CompletedCheckout { simulated: false, .. })))
        ));
    }

    #[test]
    fn test_unit_quantity() {
        assert_eq!(unit_quantity(12.34, 1), Ok(1234));
        assert_eq!(unit_quantity(25.0, 100), Ok(25));
        assert!(unit_quantity(12.34, 100).is_err());
        assert!(unit_quantity(5.0, 0).is_err());
        assert!(matches!(
            unit_quantity(25.004, 100),
            Err(CheckoutError::Validation { .. })
        ));
        assert!(matches!(
            unit_quantity(12.345, 1),
            Err(CheckoutError::Validation { .. })
        ));
    }

    #[test]
    fn test_plan_session_uses_catalog() {
        let client = client();
        let mut pool = LocalPool::new();
        let plan = PlanDescriptor::Subscription {
            tier: PlanTier::Enterprise,
            cycle: BillingCycle::Yearly,
        };
        {
            let client = Rc::clone(&client);
            pool.spawner()
                .spawn_local(async move {
                    let _ = client.open_plan_session(&plan, Some("me@example.com")).await;
                })
                .unwrap();
        }
        pool.run_until_stalled();
        let opened = client.driver().opened();
        assert_eq!(
            opened[0]["items"][0]["priceId"],
            json!("pri_01jxkfxs04a3gxkrwj32kpzk30")
        );
        assert_eq!(opened[0]["customer"], json!({ "email": "me@example.com" }));
        assert_eq!(
            opened[0]["customData"],
            json!({ "planType": "enterprise", "billingCycle": "yearly", "userId": "me@example.com" })
        );
    }

    #[test]
    fn test_plan_session_without_price_is_validation_error() {
        let mut config = PaddleConfig::default();
        config.catalog.pro.yearly.clear();
        let client = client_with(MockDriver::default(), config);
        let plan = PlanDescriptor::Subscription {
            tier: PlanTier::Pro,
            cycle: BillingCycle::Yearly,
        };
        assert!(matches!(
            block_on(client.open_plan_session(&plan, None)),
            Err(CheckoutError::Validation { .. })
        ));
    }

    #[test]
    fn test_watchdog_times_out_and_frees_slot() {
        let config = PaddleConfig {
            session_timeout_ms: Some(30_000),
            ..PaddleConfig::default()
        };
        let client = client_with(MockDriver::default(), config);
        let outcome = block_on(client.open_catalog_session(CatalogSession::new("pri_1")));
        assert_eq!(
            outcome,
            Ok(SessionOutcome::Failed(CheckoutError::Timeout { after_ms: 30_000 }))
        );
        assert!(!client.has_open_session());
        client.driver().emit(json!({ "name": "checkout.completed" }));
        assert!(client.driver().navigations().is_empty());
    }

    #[test]
    fn test_redirect_can_be_disabled() {
        let config = PaddleConfig {
            redirect_on_complete: false,
            ..PaddleConfig::default()
        };
        let client = client_with(MockDriver::default(), config);
        assert!(matches!(
            block_on(client.open_amount_session(5.0, "Donation")),
            Ok(SessionOutcome::Completed(_))
        ));
        assert!(client.driver().navigations().is_empty());
    }
}
