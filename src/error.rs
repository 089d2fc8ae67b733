//! Typed errors for the checkout adapter.
//!
//! Every failure coming out of Paddle.js, the script loader or the amount
//! validation is turned into a [`CheckoutError`] at the adapter boundary.
//! The type is `Clone + PartialEq` so the same value can be handed to every
//! caller of a shared initialization and passed through Yew callbacks.

use thiserror::Error;

use crate::amount::MIN_AMOUNT;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CheckoutError {
    /// Paddle.js could not be loaded or configured. A later attempt may succeed.
    #[error("payment system failed to initialize: {0}")]
    Initialization(String),

    /// Caller-correctable input problem. Never sent to the vendor.
    #[error("{message}")]
    Validation { message: String },

    /// A checkout overlay is already open for this adapter.
    #[error("a checkout session is already open")]
    SessionInProgress,

    /// Paddle reported a failure or sent something we could not decode.
    #[error("payment provider rejected the checkout: {message}")]
    VendorRejection {
        message: String,
        code: Option<String>,
    },

    /// The optional session watchdog fired before any terminal event.
    #[error("checkout session timed out after {after_ms} ms")]
    Timeout { after_ms: u32 },
}

impl CheckoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        CheckoutError::Validation {
            message: message.into(),
        }
    }

    pub fn below_minimum(amount: f64) -> Self {
        CheckoutError::validation(format!(
            "amount {amount:.2} is below the minimum donation of ${MIN_AMOUNT:.2}"
        ))
    }

    pub fn fractional_cents(amount: f64) -> Self {
        CheckoutError::validation(format!(
            "amount {amount} has fractions of a cent; use at most two decimal places"
        ))
    }

    pub fn rejection(message: impl Into<String>) -> Self {
        CheckoutError::VendorRejection {
            message: message.into(),
            code: None,
        }
    }

    /// Returns true if simply trying again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Initialization(_)
                | CheckoutError::SessionInProgress
                | CheckoutError::VendorRejection { .. }
                | CheckoutError::Timeout { .. }
        )
    }

    /// Short stable tag, handy for logs and analytics.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Initialization(_) => "initialization",
            CheckoutError::Validation { .. } => "validation",
            CheckoutError::SessionInProgress => "session_in_progress",
            CheckoutError::VendorRejection { .. } => "vendor_rejection",
            CheckoutError::Timeout { .. } => "timeout",
        }
    }
}
