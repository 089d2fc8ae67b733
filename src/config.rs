//! Runtime configuration for the Paddle checkout.
//!
//! Everything has a default that matches the production setup, so hosts
//! usually only override a few fields:
//!
//! ```rust,ignore
//! let config = PaddleConfig::from_json(r#"{ "environment": "sandbox", "seller_id": 1234 }"#)?;
//! yew_paddle::install_config(config)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::session::{BillingCycle, PlanTier};

pub const PADDLE_SCRIPT_URL: &str = "https://cdn.paddle.com/paddle/v2/paddle.js";
pub const PADDLE_SCRIPT_ID: &str = "paddle-js-sdk";
pub const DEFAULT_SELLER_ID: u64 = 233505;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Inline,
    #[default]
    Overlay,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// `settings` block of `Paddle.Checkout.open`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub display_mode: DisplayMode,
    pub theme: Theme,
    pub locale: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Overlay,
            theme: Theme::Light,
            locale: "en".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclePrices {
    pub monthly: String,
    pub yearly: String,
}

/// Paddle price ids per subscription tier and billing cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceCatalog {
    pub pro: CyclePrices,
    pub enterprise: CyclePrices,
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self {
            // $29/month, $288/year
            pro: CyclePrices {
                monthly: "pri_01jxkfd08h8gwv7mqxw1ah948b".to_string(),
                yearly: "pri_01jxkfsmdcw6tfx7s0wjkdbazr".to_string(),
            },
            // $99/month, $984/year
            enterprise: CyclePrices {
                monthly: "pri_01jxkfk7whgk1q9pjfxdt4kbg6".to_string(),
                yearly: "pri_01jxkfxs04a3gxkrwj32kpzk30".to_string(),
            },
        }
    }
}

impl PriceCatalog {
    /// Price id for a plan, or `None` when that slot is not configured.
    pub fn price_for(&self, tier: PlanTier, cycle: BillingCycle) -> Option<&str> {
        let prices = match tier {
            PlanTier::Pro => &self.pro,
            PlanTier::Enterprise => &self.enterprise,
        };
        let id = match cycle {
            BillingCycle::Monthly => &prices.monthly,
            BillingCycle::Yearly => &prices.yearly,
        };
        Some(id.as_str()).filter(|id| !id.trim().is_empty())
    }
}

/// How free-form donation amounts reach Paddle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DonationStrategy {
    /// Stand-in flow: a browser confirmation followed by a success signal
    /// after `settle_ms`. Nothing is charged.
    SimulatedConfirmation { settle_ms: u32 },
    /// Checkout for a low-denomination price, `quantity = amount / unit_minor`.
    UnitPrice { price_id: String, unit_minor: u32 },
}

impl Default for DonationStrategy {
    fn default() -> Self {
        DonationStrategy::SimulatedConfirmation { settle_ms: 1000 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub seller_id: u64,
    pub environment: Environment,
    pub script_url: String,
    pub script_element_id: String,
    /// Route the page is sent to after a completed checkout.
    pub dashboard_path: String,
    pub redirect_on_complete: bool,
    pub display: DisplaySettings,
    pub catalog: PriceCatalog,
    pub donation: DonationStrategy,
    /// Give up on an open session after this long. Off by default.
    pub session_timeout_ms: Option<u32>,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            seller_id: DEFAULT_SELLER_ID,
            environment: Environment::Production,
            script_url: PADDLE_SCRIPT_URL.to_string(),
            script_element_id: PADDLE_SCRIPT_ID.to_string(),
            dashboard_path: "/dashboard".to_string(),
            redirect_on_complete: true,
            display: DisplaySettings::default(),
            catalog: PriceCatalog::default(),
            donation: DonationStrategy::default(),
            session_timeout_ms: None,
        }
    }
}

impl PaddleConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn sandbox(seller_id: u64) -> Self {
        Self {
            seller_id,
            environment: Environment::Sandbox,
            ..Self::default()
        }
    }
}
