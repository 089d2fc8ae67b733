//! In-memory `CheckoutDriver` for unit tests.

use std::cell::{Cell, RefCell};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::client::{CheckoutDriver, EventHandler};
use crate::error::CheckoutError;
use crate::paddle::{CheckoutOptions, PaddleSetup};

pub(crate) struct MockDriver {
    gated: bool,
    loads: Cell<u32>,
    load_gates: RefCell<Vec<oneshot::Sender<Result<(), CheckoutError>>>>,
    next_load_error: RefCell<Option<CheckoutError>>,
    configure_error: RefCell<Option<CheckoutError>>,
    open_error: RefCell<Option<CheckoutError>>,
    setups: RefCell<Vec<PaddleSetup>>,
    handler: RefCell<Option<EventHandler>>,
    opened: RefCell<Vec<Value>>,
    prompt_answer: Cell<bool>,
    prompts: RefCell<Vec<String>>,
    sleeps: RefCell<Vec<u32>>,
    sleepers: RefCell<Vec<oneshot::Sender<()>>>,
    navigations: RefCell<Vec<String>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            gated: false,
            loads: Cell::new(0),
            load_gates: RefCell::new(Vec::new()),
            next_load_error: RefCell::new(None),
            configure_error: RefCell::new(None),
            open_error: RefCell::new(None),
            setups: RefCell::new(Vec::new()),
            handler: RefCell::new(None),
            opened: RefCell::new(Vec::new()),
            prompt_answer: Cell::new(true),
            prompts: RefCell::new(Vec::new()),
            sleeps: RefCell::new(Vec::new()),
            sleepers: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
        }
    }
}

impl MockDriver {
    /// Script loads and sleeps stay pending until released by the test.
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn finish_loads(&self, result: Result<(), CheckoutError>) {
        for gate in self.load_gates.borrow_mut().drain(..) {
            let _ = gate.send(result.clone());
        }
    }

    pub fn wake_sleepers(&self) {
        for sleeper in self.sleepers.borrow_mut().drain(..) {
            let _ = sleeper.send(());
        }
    }

    pub fn fail_next_load(&self, err: CheckoutError) {
        *self.next_load_error.borrow_mut() = Some(err);
    }

    pub fn fail_configure(&self, err: CheckoutError) {
        *self.configure_error.borrow_mut() = Some(err);
    }

    pub fn fail_open(&self, err: CheckoutError) {
        *self.open_error.borrow_mut() = Some(err);
    }

    pub fn answer_prompts(&self, answer: bool) {
        self.prompt_answer.set(answer);
    }

    /// Deliver a raw payload as Paddle's `eventCallback` would.
    pub fn emit(&self, payload: Value) {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => handler(payload),
            None => panic!("no event handler registered"),
        }
    }

    pub fn script_loads(&self) -> u32 {
        self.loads.get()
    }

    pub fn setups(&self) -> usize {
        self.setups.borrow().len()
    }

    pub fn last_setup(&self) -> Option<PaddleSetup> {
        self.setups.borrow().last().cloned()
    }

    pub fn opened(&self) -> Vec<Value> {
        self.opened.borrow().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn sleeps(&self) -> Vec<u32> {
        self.sleeps.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }
}

impl CheckoutDriver for MockDriver {
    fn load_script(
        &self,
        _src: &str,
        _element_id: &str,
    ) -> LocalBoxFuture<'static, Result<(), CheckoutError>> {
        self.loads.set(self.loads.get() + 1);
        if let Some(err) = self.next_load_error.borrow_mut().take() {
            return future::ready(Err(err)).boxed_local();
        }
        if !self.gated {
            return future::ready(Ok(())).boxed_local();
        }
        let (tx, rx) = oneshot::channel();
        self.load_gates.borrow_mut().push(tx);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(CheckoutError::Initialization("load abandoned".into())))
        }
        .boxed_local()
    }

    fn configure(&self, setup: &PaddleSetup, on_event: EventHandler) -> Result<(), CheckoutError> {
        if let Some(err) = self.configure_error.borrow_mut().take() {
            return Err(err);
        }
        self.setups.borrow_mut().push(setup.clone());
        *self.handler.borrow_mut() = Some(on_event);
        Ok(())
    }

    fn open_checkout(&self, options: &CheckoutOptions) -> Result<(), CheckoutError> {
        if let Some(err) = self.open_error.borrow_mut().take() {
            return Err(err);
        }
        let value = serde_json::to_value(options).expect("checkout options serialize");
        self.opened.borrow_mut().push(value);
        Ok(())
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.prompt_answer.get()
    }

    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()> {
        self.sleeps.borrow_mut().push(millis);
        if !self.gated {
            return future::ready(()).boxed_local();
        }
        let (tx, rx) = oneshot::channel();
        self.sleepers.borrow_mut().push(tx);
        rx.map(|_| ()).boxed_local()
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn origin(&self) -> Option<String> {
        Some("https://app.test".to_string())
    }
}
