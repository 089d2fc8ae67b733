//! State machine behind the `PaddleCheckout` component.
//!
//! Kept free of Yew so every transition can be unit tested. The component
//! feeds it adapter results and emits whatever [`Notice`] it hands back.

use crate::error::CheckoutError;
use crate::session::{CompletedCheckout, PlanDescriptor, SessionOutcome};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Initializing,
    Ready,
    /// Holds the plan captured when the user clicked.
    SessionOpen { plan: PlanDescriptor },
    Succeeded(CompletedCheckout),
    Failed(CheckoutError),
}

/// Callback the view must invoke after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Success(CompletedCheckout),
    Error(CheckoutError),
}

#[derive(Debug, Default)]
pub struct SessionMachine {
    phase: CheckoutPhase,
    initialized: bool,
    cancellations: u32,
    inline_error: Option<String>,
}

impl SessionMachine {
    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// How many times the user closed the overlay. Not capped.
    pub fn cancellations(&self) -> u32 {
        self.cancellations
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn can_begin(&self) -> bool {
        self.initialized && matches!(self.phase, CheckoutPhase::Ready | CheckoutPhase::Failed(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            CheckoutPhase::Initializing | CheckoutPhase::SessionOpen { .. }
        )
    }

    /// Failed before the adapter ever came up; offering a retry makes sense.
    pub fn can_retry_initialize(&self) -> bool {
        !self.initialized && matches!(self.phase, CheckoutPhase::Failed(_))
    }

    /// `Idle → Initializing`. Returns true if the caller should initialize.
    pub fn mount(&mut self) -> bool {
        if self.phase == CheckoutPhase::Idle {
            self.phase = CheckoutPhase::Initializing;
            true
        } else {
            false
        }
    }

    /// `Failed → Initializing`, only if initialization never succeeded.
    pub fn retry_initialize(&mut self) -> bool {
        if self.can_retry_initialize() {
            self.phase = CheckoutPhase::Initializing;
            true
        } else {
            false
        }
    }

    pub fn initialized(&mut self, result: Result<(), CheckoutError>) -> Option<Notice> {
        if self.phase != CheckoutPhase::Initializing {
            return None;
        }
        match result {
            Ok(()) => {
                self.initialized = true;
                self.phase = CheckoutPhase::Ready;
                None
            }
            Err(err) => {
                self.phase = CheckoutPhase::Failed(err.clone());
                Some(Notice::Error(err))
            }
        }
    }

    /// `Ready → SessionOpen`, capturing `plan` as it is right now.
    pub fn begin(&mut self, plan: &PlanDescriptor) -> Result<PlanDescriptor, CheckoutError> {
        match &self.phase {
            CheckoutPhase::SessionOpen { .. } => return Err(CheckoutError::SessionInProgress),
            CheckoutPhase::Succeeded(_) => {
                return Err(CheckoutError::validation("checkout already completed"))
            }
            _ if !self.can_begin() => {
                return Err(CheckoutError::Initialization(
                    "payment system not ready".to_string(),
                ))
            }
            _ => {}
        }
        if let Err(err) = plan.validate() {
            self.inline_error = Some(err.to_string());
            return Err(err);
        }
        self.inline_error = None;
        self.phase = CheckoutPhase::SessionOpen { plan: plan.clone() };
        Ok(plan.clone())
    }

    /// Apply the adapter's answer for the open session. Anything arriving
    /// outside `SessionOpen` is ignored, so each session notifies at most once.
    pub fn settle(&mut self, result: Result<SessionOutcome, CheckoutError>) -> Option<Notice> {
        if !matches!(self.phase, CheckoutPhase::SessionOpen { .. }) {
            return None;
        }
        let err = match result {
            Ok(SessionOutcome::Completed(done)) => {
                self.phase = CheckoutPhase::Succeeded(done.clone());
                return Some(Notice::Success(done));
            }
            Ok(SessionOutcome::Closed) => {
                self.cancellations += 1;
                self.phase = CheckoutPhase::Ready;
                return None;
            }
            Ok(SessionOutcome::Failed(err)) | Err(err) => err,
        };
        if let CheckoutError::Validation { message } = &err {
            self.inline_error = Some(message.clone());
            self.phase = CheckoutPhase::Ready;
            return None;
        }
        self.phase = CheckoutPhase::Failed(err.clone());
        Some(Notice::Error(err))
    }
}
