//! Paddle.js wire types.
//!
//! This module provides:
//! - `PaddleSetup` for `Paddle.Environment.set` + `Paddle.Setup({ seller, eventCallback })`.
//! - `CheckoutOptions` (with `LineItem` and `Customer`) for `Paddle.Checkout.open(...)`.
//! - `PaddleEvent`, the payload handed to the registered `eventCallback`, and
//!   its mapping onto the three terminal events a session cares about.
//!
//! Nothing here touches the browser; the raw calls live in `bindings.rs`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{DisplaySettings, Environment, PaddleConfig};
use crate::error::CheckoutError;

/// Arguments for the one-time Paddle setup call.
#[derive(Clone, Debug, PartialEq)]
pub struct PaddleSetup {
    pub seller: u64,
    pub environment: Environment,
}

impl From<&PaddleConfig> for PaddleSetup {
    fn from(config: &PaddleConfig) -> Self {
        Self {
            seller: config.seller_id,
            environment: config.environment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub price_id: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Customer {
    pub email: String,
}

/// Options object for `Paddle.Checkout.open(...)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom_data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    pub settings: DisplaySettings,
}

/// Payload of Paddle's `eventCallback`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PaddleEvent {
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Events that end a checkout session.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalEvent {
    Completed { transaction_id: Option<String> },
    Closed,
    Failed(CheckoutError),
}

impl PaddleEvent {
    pub fn parse(payload: Value) -> Result<Self, CheckoutError> {
        serde_json::from_value(payload)
            .map_err(|err| CheckoutError::rejection(format!("malformed checkout event: {err}")))
    }

    /// `None` for the many informational events (`checkout.loaded`, ...).
    pub fn terminal(&self) -> Option<TerminalEvent> {
        match self.name.as_str() {
            "checkout.completed" => Some(TerminalEvent::Completed {
                transaction_id: self.transaction_id(),
            }),
            "checkout.closed" => Some(TerminalEvent::Closed),
            "checkout.error" => Some(TerminalEvent::Failed(self.rejection())),
            _ => None,
        }
    }

    fn transaction_id(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        data.get("transaction_id")
            .or_else(|| data.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn rejection(&self) -> CheckoutError {
        let detail = self
            .error
            .as_ref()
            .or(self.data.as_ref().and_then(|data| data.get("error")));
        let Some(detail) = detail else {
            return CheckoutError::rejection("checkout reported an error");
        };
        let message = ["detail", "message"]
            .iter()
            .find_map(|key| detail.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| detail.as_str().map(str::to_string))
            .unwrap_or_else(|| detail.to_string());
        let code = detail.get("code").and_then(Value::as_str).map(str::to_string);
        CheckoutError::VendorRejection { message, code }
    }
}

/// Decode a raw event payload into the terminal event it represents, if any.
pub fn terminal_event(payload: Value) -> Option<TerminalEvent> {
    match PaddleEvent::parse(payload) {
        Ok(event) => {
            let terminal = event.terminal();
            if terminal.is_none() {
                log::debug!("ignoring paddle event {}", event.name);
            }
            terminal
        }
        Err(err) => Some(TerminalEvent::Failed(err)),
    }
}
