//! yew_paddle/src/interop.rs
//!
//! Browser side of the checkout client.
//!
//! # Overview
//! - `load_script()` injects a single
//!   `<script id="paddle-js-sdk" src="https://cdn.paddle.com/paddle/v2/paddle.js" async>`
//!   into `<head>` and resolves on its `load` / `error` event.
//! - `PaddleJs` implements [`CheckoutDriver`] on top of `window`, the script
//!   loader and the raw bindings.
//! - `paddle()` returns the page-wide [`CheckoutClient`]; `install_config()`
//!   may replace the default configuration before first use.
//!
//! # Usage
//! ```rust,ignore
//! use yew_paddle::{install_config, paddle, PaddleConfig};
//!
//! install_config(PaddleConfig::sandbox(1234)).ok();
//! wasm_bindgen_futures::spawn_local(async {
//!     if let Err(err) = paddle().initialize().await {
//!         log::error!("{err}");
//!     }
//! });
//! ```

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use gloo_utils::format::JsValueSerdeExt;
use serde::Serialize;
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::js_sys::{self, Object, Reflect};
use web_sys::HtmlScriptElement;

use crate::bindings;
use crate::client::{CheckoutClient, CheckoutDriver, EventHandler};
use crate::config::PaddleConfig;
use crate::error::CheckoutError;
use crate::paddle::{CheckoutOptions, PaddleSetup};

thread_local! {
    static CLIENT: OnceCell<Rc<CheckoutClient<PaddleJs>>> = const { OnceCell::new() };
}

/// The page-wide checkout client, created with the default configuration
/// unless [`install_config`] ran first.
pub fn paddle() -> Rc<CheckoutClient<PaddleJs>> {
    CLIENT.with(|cell| {
        Rc::clone(cell.get_or_init(|| Rc::new(CheckoutClient::new(PaddleJs, PaddleConfig::default()))))
    })
}

/// Set the configuration of the page-wide client. Fails once the client exists.
pub fn install_config(config: PaddleConfig) -> Result<(), CheckoutError> {
    CLIENT.with(|cell| {
        cell.set(Rc::new(CheckoutClient::new(PaddleJs, config)))
            .map_err(|_| {
                CheckoutError::Initialization(
                    "paddle client already created; configure it before first use".to_string(),
                )
            })
    })
}

/// Turn a thrown JS value into readable text.
fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn init_error(message: impl Into<String>) -> CheckoutError {
    CheckoutError::Initialization(message.into())
}

/// Insert the Paddle.js `<script>` and wait for it to load.
///
/// Returns immediately if `window.Paddle` already exists. A tag left over
/// from an earlier failed attempt is replaced so the browser fetches again.
pub async fn load_script(src: &str, element_id: &str) -> Result<(), CheckoutError> {
    let window = web_sys::window().ok_or_else(|| init_error("no window"))?;
    if Reflect::has(&window, &JsValue::from_str("Paddle")).unwrap_or(false) {
        return Ok(());
    }
    let document = window.document().ok_or_else(|| init_error("no document"))?;
    if let Some(stale) = document.get_element_by_id(element_id) {
        stale.remove();
    }

    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|e| init_error(describe(&e)))?
        .dyn_into()
        .map_err(|_| init_error("created element is not a <script>"))?;
    script.set_id(element_id);
    script.set_src(src);
    script.set_async(true);

    let (tx, rx) = oneshot::channel::<Result<(), CheckoutError>>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let onload = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        })
    };
    let onerror = {
        let src = src.to_string();
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(init_error(format!("Failed to load {src}"))));
            }
        })
    };
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    document
        .head()
        .ok_or_else(|| init_error("document has no <head>"))?
        .append_child(&script)
        .map_err(|e| init_error(describe(&e)))?;

    let result = rx
        .await
        .unwrap_or_else(|_| Err(init_error("script loader dropped")));
    // Detach before the closures go out of scope.
    script.set_onload(None);
    script.set_onerror(None);
    drop((onload, onerror));
    result
}

/// [`CheckoutDriver`] backed by the real browser and Paddle.js.
pub struct PaddleJs;

impl CheckoutDriver for PaddleJs {
    fn load_script(
        &self,
        src: &str,
        element_id: &str,
    ) -> LocalBoxFuture<'static, Result<(), CheckoutError>> {
        let (src, element_id) = (src.to_string(), element_id.to_string());
        async move { load_script(&src, &element_id).await }.boxed_local()
    }

    fn configure(&self, setup: &PaddleSetup, on_event: EventHandler) -> Result<(), CheckoutError> {
        bindings::set_environment(setup.environment.as_str())
            .map_err(|e| init_error(describe(&e)))?;

        let callback = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
            let payload = event
                .into_serde::<serde_json::Value>()
                .unwrap_or(serde_json::Value::Null);
            on_event(payload);
        });
        let options = Object::new();
        Reflect::set(&options, &"seller".into(), &JsValue::from_f64(setup.seller as f64))
            .map_err(|e| init_error(describe(&e)))?;
        Reflect::set(&options, &"eventCallback".into(), callback.as_ref())
            .map_err(|e| init_error(describe(&e)))?;
        bindings::setup(&options).map_err(|e| init_error(describe(&e)))?;

        // Paddle keeps calling it for the lifetime of the page.
        callback.forget();
        Ok(())
    }

    fn open_checkout(&self, options: &CheckoutOptions) -> Result<(), CheckoutError> {
        // Plain objects, not JS `Map`s, for `customData`.
        let options_js = options
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| CheckoutError::rejection(e.to_string()))?;
        bindings::open_checkout(&options_js).map_err(|e| CheckoutError::rejection(describe(&e)))
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        if let Some(window) = web_sys::window() {
            let wake = Closure::once_into_js(move || {
                let _ = tx.send(());
            });
            let timeout = i32::try_from(millis).unwrap_or(i32::MAX);
            if let Err(err) = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(wake.unchecked_ref(), timeout)
            {
                log::warn!("setTimeout failed: {}", describe(&err));
            }
        }
        rx.map(|_| ()).boxed_local()
    }

    fn navigate(&self, url: &str) {
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|window| window.location().set_href(url));
        if let Err(err) = result {
            log::error!("redirect to {url} failed: {}", describe(&err));
        }
    }

    fn origin(&self) -> Option<String> {
        web_sys::window().and_then(|window| window.location().origin().ok())
    }
}
