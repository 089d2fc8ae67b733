//! Checkout session requests and outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::amount::{format_usd, validate_amount};
use crate::error::CheckoutError;

pub const DONATION_DESCRIPTION: &str = "Donation";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

/// What the host page wants to sell.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanDescriptor {
    Subscription { tier: PlanTier, cycle: BillingCycle },
    Donation { amount: f64 },
}

impl PlanDescriptor {
    pub fn validate(&self) -> Result<(), CheckoutError> {
        match self {
            PlanDescriptor::Subscription { .. } => Ok(()),
            PlanDescriptor::Donation { amount } => validate_amount(*amount).map(|_| ()),
        }
    }

    pub fn is_donation(&self) -> bool {
        matches!(self, PlanDescriptor::Donation { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanDescriptor::Subscription { tier: PlanTier::Pro, .. } => "Professional Plan",
            PlanDescriptor::Subscription { tier: PlanTier::Enterprise, .. } => "Enterprise Plan",
            PlanDescriptor::Donation { .. } => "Donation",
        }
    }

    /// Price label shown next to the plan name.
    pub fn price_label(&self) -> String {
        match self {
            PlanDescriptor::Subscription { tier, cycle } => {
                let label = match (tier, cycle) {
                    (PlanTier::Pro, BillingCycle::Monthly) => "$29/month",
                    (PlanTier::Pro, BillingCycle::Yearly) => "$288/year",
                    (PlanTier::Enterprise, BillingCycle::Monthly) => "$99/month",
                    (PlanTier::Enterprise, BillingCycle::Yearly) => "$984/year",
                };
                label.to_string()
            }
            PlanDescriptor::Donation { amount } => format_usd(*amount),
        }
    }

    pub fn action_label(&self) -> String {
        match self {
            PlanDescriptor::Subscription { cycle: BillingCycle::Monthly, .. } => {
                "Subscribe Monthly".to_string()
            }
            PlanDescriptor::Subscription { cycle: BillingCycle::Yearly, .. } => {
                "Subscribe Yearly".to_string()
            }
            PlanDescriptor::Donation { .. } => "Donate Now".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionKind {
    Subscription {
        price_id: String,
        quantity: u32,
        plan: Option<(PlanTier, BillingCycle)>,
    },
    Donation {
        amount: f64,
        description: String,
    },
}

/// One checkout attempt. Built per click and dropped once it resolves.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRequest {
    pub kind: SessionKind,
    pub customer_email: Option<String>,
}

#[derive(Serialize)]
struct DashboardQuery<'a> {
    payment: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    billing: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
}

impl SessionRequest {
    pub fn donation(amount: f64, description: impl Into<String>) -> Self {
        Self {
            kind: SessionKind::Donation {
                amount,
                description: description.into(),
            },
            customer_email: None,
        }
    }

    /// Dashboard route with the query string the host router expects after
    /// a successful checkout.
    pub fn dashboard_url(&self, dashboard_path: &str) -> String {
        let query = match &self.kind {
            SessionKind::Donation { amount, .. } => DashboardQuery {
                payment: "success",
                kind: Some("donation"),
                plan: None,
                billing: None,
                amount: Some(amount_param(*amount)),
            },
            SessionKind::Subscription { plan, .. } => DashboardQuery {
                payment: "success",
                kind: None,
                plan: plan.map(|(tier, _)| tier.as_str()),
                billing: plan.map(|(_, cycle)| cycle.as_str()),
                amount: None,
            },
        };
        match serde_urlencoded::to_string(&query) {
            Ok(query) => format!("{dashboard_path}?{query}"),
            Err(err) => {
                log::warn!("could not encode dashboard query: {err}");
                format!("{dashboard_path}?payment=success")
            }
        }
    }
}

/// Whole amounts print without decimals, everything else with cents.
fn amount_param(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

/// Parameters for a fixed-price catalog checkout.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSession {
    pub price_id: String,
    pub quantity: u32,
    pub customer_email: Option<String>,
    pub custom_data: Map<String, Value>,
    pub success_url: Option<String>,
    pub plan: Option<(PlanTier, BillingCycle)>,
}

impl CatalogSession {
    pub fn new(price_id: impl Into<String>) -> Self {
        Self {
            price_id: price_id.into(),
            quantity: 1,
            customer_email: None,
            custom_data: Map::new(),
            success_url: None,
            plan: None,
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn customer_email(mut self, email: Option<impl Into<String>>) -> Self {
        self.customer_email = email.map(Into::into);
        self
    }

    pub fn custom_data(mut self, data: Map<String, Value>) -> Self {
        self.custom_data = data;
        self
    }

    pub fn success_url(mut self, url: Option<String>) -> Self {
        self.success_url = url;
        self
    }

    pub fn plan(mut self, tier: PlanTier, cycle: BillingCycle) -> Self {
        self.plan = Some((tier, cycle));
        self
    }

    pub(crate) fn to_request(&self) -> SessionRequest {
        SessionRequest {
            kind: SessionKind::Subscription {
                price_id: self.price_id.clone(),
                quantity: self.quantity,
                plan: self.plan,
            },
            customer_email: self.customer_email.clone(),
        }
    }
}

/// Details of a checkout Paddle reported as completed.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedCheckout {
    pub session: SessionId,
    pub transaction_id: Option<String>,
    /// Set for the stand-in donation flow, where no payment was captured.
    pub simulated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    Completed(CompletedCheckout),
    /// The user dismissed the overlay.
    Closed,
    Failed(CheckoutError),
}
