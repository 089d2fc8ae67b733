//! Contribution amount selection.
//!
//! Holds the preset the user clicked and whatever they typed into the
//! custom amount box, and derives the single amount a donation checkout
//! is opened with.

use crate::error::CheckoutError;
use crate::session::PlanDescriptor;

/// Smallest amount, in major currency units, that may be sent to checkout.
pub const MIN_AMOUNT: f64 = 1.0;

pub const DEFAULT_PRESETS: [f64; 5] = [10.0, 25.0, 50.0, 100.0, 250.0];

pub const DEFAULT_PRESET: f64 = 25.0;

/// Parse user-typed text into an amount that may be charged.
///
/// Returns `None` for non-numeric, non-finite, below-minimum input or
/// input with fractions of a cent.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| validate_amount(*value).is_ok())
}

pub fn validate_amount(amount: f64) -> Result<f64, CheckoutError> {
    if !(amount.is_finite() && amount >= MIN_AMOUNT) {
        return Err(CheckoutError::below_minimum(amount));
    }
    match exact_minor_units(amount) {
        Some(_) => Ok(amount),
        None => Err(CheckoutError::fractional_cents(amount)),
    }
}

/// Minor units for `amount`, or `None` if it does not land on a whole cent.
pub fn exact_minor_units(amount: f64) -> Option<u64> {
    let cents = amount * 100.0;
    let rounded = cents.round();
    (cents.is_finite() && rounded >= 0.0 && (cents - rounded).abs() <= 1e-6)
        .then_some(rounded as u64)
}

pub fn format_usd(amount: f64) -> String {
    format!("${amount:.2}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmountSelection {
    presets: Vec<f64>,
    preset: f64,
    freeform: Option<String>,
}

impl Default for AmountSelection {
    fn default() -> Self {
        Self::new(DEFAULT_PRESETS.to_vec(), DEFAULT_PRESET)
    }
}

impl AmountSelection {
    pub fn new(presets: Vec<f64>, initial: f64) -> Self {
        Self {
            presets,
            preset: initial,
            freeform: None,
        }
    }

    pub fn presets(&self) -> &[f64] {
        &self.presets
    }

    pub fn preset(&self) -> f64 {
        self.preset
    }

    pub fn freeform(&self) -> Option<&str> {
        self.freeform.as_deref()
    }

    /// Activate a preset and drop any custom amount.
    pub fn select_preset(&mut self, value: f64) {
        self.preset = value;
        self.freeform = None;
    }

    /// Store the raw custom amount text. An empty string clears the
    /// override; anything else, whitespace included, replaces the preset.
    pub fn set_freeform(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.freeform = if text.is_empty() { None } else { Some(text) };
    }

    /// The amount a checkout would be opened with; `0.0` means invalid.
    ///
    /// Custom text that fails validation never falls back to the preset, so
    /// the UI can flag it instead of charging an amount the user didn't type.
    pub fn effective_amount(&self) -> f64 {
        match &self.freeform {
            Some(text) => parse_amount(text).unwrap_or(0.0),
            None => self.preset.max(0.0),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.effective_amount() >= MIN_AMOUNT
    }

    pub fn is_preset_active(&self, value: f64) -> bool {
        self.freeform.is_none() && self.preset == value
    }

    /// Inline message for the custom amount box, if its text is unusable.
    pub fn freeform_error(&self) -> Option<String> {
        let text = self.freeform.as_deref()?;
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= MIN_AMOUNT => exact_minor_units(value)
                .is_none()
                .then(|| "Amounts can have at most two decimal places".to_string()),
            Ok(value) if value.is_finite() => {
                Some(format!("Minimum donation amount is {}", format_usd(MIN_AMOUNT)))
            }
            _ => Some("Enter a valid amount".to_string()),
        }
    }

    pub fn to_plan(&self) -> Option<PlanDescriptor> {
        self.is_actionable().then(|| PlanDescriptor::Donation {
            amount: self.effective_amount(),
        })
    }
}
