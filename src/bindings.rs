//! yew_paddle/src/bindings.rs
//!
//! Low-level wasm-bindgen bindings to Paddle.js v2.
//!
//! Only the three globals the checkout needs are bound. Every call is
//! `catch` so a throwing Paddle.js surfaces as `Err(JsValue)` instead of
//! aborting the wasm module. Higher-level wrappers live in `interop.rs`.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `Paddle.Environment.set("sandbox" | "production")`
    #[wasm_bindgen(catch, js_namespace = ["Paddle", "Environment"], js_name = set)]
    pub fn set_environment(environment: &str) -> Result<(), JsValue>;

    /// `Paddle.Setup({ seller, eventCallback })`
    #[wasm_bindgen(catch, js_namespace = Paddle, js_name = Setup)]
    pub fn setup(options: &JsValue) -> Result<(), JsValue>;

    /// `Paddle.Checkout.open({ items, customer, customData, successUrl, settings })`
    #[wasm_bindgen(catch, js_namespace = ["Paddle", "Checkout"], js_name = open)]
    pub fn open_checkout(options: &JsValue) -> Result<(), JsValue>;
}
