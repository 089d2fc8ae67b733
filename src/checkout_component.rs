//! A drop-in Yew component for a Paddle checkout.
//!
//! The component loads Paddle.js through the page-wide client, opens the
//! overlay for its plan when the user clicks, and emits typed success or
//! error callbacks to your app. Transitions are delegated to
//! [`SessionMachine`](crate::machine::SessionMachine).

use std::cell::RefCell;
use std::rc::Rc;

use yew::prelude::*;

use crate::error::CheckoutError;
use crate::interop::paddle;
use crate::machine::{CheckoutPhase, Notice, SessionMachine};
use crate::session::{CompletedCheckout, PlanDescriptor};

/// Properties for the [`PaddleCheckout`] component.
///
/// # Fields
///
/// * `plan` – What to sell; read at the moment the button is clicked.
/// * `customer_email` – Prefills the Paddle form and is sent as `userId`.
/// * `on_success` – Invoked once with [`CompletedCheckout`] per successful session.
/// * `on_error` – Invoked once with [`CheckoutError`] per failed initialization or session.
/// * `button_label` – Override the action button text.
/// * `children` – Extra nodes (e.g. plan perks) rendered above the button.
#[derive(Properties, PartialEq, Clone)]
pub struct PaddleCheckoutProps {
    pub plan: PlanDescriptor,
    #[prop_or_default]
    pub customer_email: Option<String>,
    #[prop_or_default]
    pub on_success: Callback<CompletedCheckout>,
    #[prop_or_default]
    pub on_error: Callback<CheckoutError>,
    #[prop_or_default]
    pub button_label: Option<String>,
    #[prop_or_default]
    pub children: Children,
}

/// Host callbacks, refreshed on every render so results that land after a
/// re-render reach the current props.
#[derive(Clone, Default)]
struct Listeners {
    on_success: Callback<CompletedCheckout>,
    on_error: Callback<CheckoutError>,
}

type SharedListeners = Rc<RefCell<Listeners>>;

fn emit(listeners: &SharedListeners, notice: Option<Notice>) {
    // Clone out first; the callback may trigger a render that refreshes the cell.
    let current = listeners.borrow().clone();
    match notice {
        Some(Notice::Success(done)) => current.on_success.emit(done),
        Some(Notice::Error(err)) => current.on_error.emit(err),
        None => {}
    }
}

fn spawn_initialize(
    machine: Rc<RefCell<SessionMachine>>,
    rerender: UseForceUpdateHandle,
    listeners: SharedListeners,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = paddle().initialize().await;
        let notice = machine.borrow_mut().initialized(result);
        rerender.force_update();
        emit(&listeners, notice);
    });
}

/// Yew function component rendering a Paddle checkout button.
///
/// # Example
///
/// ```rust,ignore
/// use yew::prelude::*;
/// use yew_paddle::{BillingCycle, PaddleCheckout, PlanDescriptor, PlanTier};
///
/// #[function_component(Pricing)]
/// fn pricing() -> Html {
///     let plan = PlanDescriptor::Subscription { tier: PlanTier::Pro, cycle: BillingCycle::Yearly };
///     html! {
///         <PaddleCheckout
///             {plan}
///             customer_email={Some("me@example.com".to_string())}
///             on_error={Callback::from(|err: yew_paddle::CheckoutError| log::error!("{err}"))}
///         />
///     }
/// }
/// ```
#[function_component(PaddleCheckout)]
pub fn paddle_checkout(props: &PaddleCheckoutProps) -> Html {
    let machine = use_mut_ref(SessionMachine::default);
    let rerender = use_force_update();
    let listeners = use_mut_ref(Listeners::default);
    *listeners.borrow_mut() = Listeners {
        on_success: props.on_success.clone(),
        on_error: props.on_error.clone(),
    };

    {
        let machine = machine.clone();
        let rerender = rerender.clone();
        let listeners = listeners.clone();
        use_effect_with((), move |_| {
            let mounted = machine.borrow_mut().mount();
            if mounted {
                rerender.force_update();
                spawn_initialize(machine, rerender, listeners);
            }
            || ()
        });
    }

    let on_click = {
        let machine = machine.clone();
        let rerender = rerender.clone();
        let listeners = listeners.clone();
        let plan = props.plan.clone();
        let email = props.customer_email.clone();

        Callback::from(move |_: MouseEvent| {
            let started = machine.borrow_mut().begin(&plan);
            rerender.force_update();
            let plan = match started {
                Ok(plan) => plan,
                Err(err) => {
                    log::warn!("checkout not started: {err}");
                    return;
                }
            };
            let machine = machine.clone();
            let rerender = rerender.clone();
            let listeners = listeners.clone();
            let email = email.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = paddle().open_plan_session(&plan, email.as_deref()).await;
                let notice = machine.borrow_mut().settle(result);
                rerender.force_update();
                emit(&listeners, notice);
            });
        })
    };

    let on_retry = {
        let machine = machine.clone();
        let rerender = rerender.clone();
        let listeners = listeners.clone();
        Callback::from(move |_: MouseEvent| {
            let retrying = machine.borrow_mut().retry_initialize();
            if retrying {
                rerender.force_update();
                spawn_initialize(machine.clone(), rerender.clone(), listeners.clone());
            }
        })
    };

    let (phase, can_begin, can_retry, inline_error) = {
        let state = machine.borrow();
        (
            state.phase().clone(),
            state.can_begin(),
            state.can_retry_initialize(),
            state.inline_error().map(str::to_string),
        )
    };
    let label = match &phase {
        CheckoutPhase::Idle | CheckoutPhase::Initializing => "Loading…".to_string(),
        CheckoutPhase::SessionOpen { .. } => "Processing…".to_string(),
        CheckoutPhase::Succeeded(_) => "Thank you!".to_string(),
        _ => props
            .button_label
            .clone()
            .unwrap_or_else(|| props.plan.action_label()),
    };

    html! {
        <div class="paddle-checkout flex flex-col gap-4 items-center w-full">
            <h3 class="text-2xl font-bold">{ props.plan.name() }</h3>
            <div class="text-3xl font-bold text-blue-600">{ props.plan.price_label() }</div>
            { for props.children.iter() }
            <button
                type="button"
                onclick={on_click}
                disabled={!can_begin}
                class="w-full rounded bg-blue-600 text-white font-semibold px-5 py-3 disabled:opacity-50">
                { label }
            </button>
            {
                if let Some(msg) = inline_error {
                    html!{ <div class="text-red-500 text-sm">{ msg }</div> }
                } else {
                    Html::default()
                }
            }
            {
                match &phase {
                    CheckoutPhase::Failed(err) => html! {
                        <div class="text-red-500 text-sm">
                            { err.to_string() }
                            if can_retry {
                                <button type="button" class="ml-2 underline" onclick={on_retry}>
                                    { "Retry" }
                                </button>
                            }
                        </div>
                    },
                    CheckoutPhase::Succeeded(done) if done.simulated => html! {
                        <div class="text-yellow-600 text-xs">
                            { "Test confirmation only: no payment was captured." }
                        </div>
                    },
                    _ => Html::default(),
                }
            }
            <p class="text-xs text-gray-500">
                { "Secure payment processing by " }
                <a href="https://paddle.com" target="_blank" rel="noopener noreferrer">{ "Paddle.com" }</a>
            </p>
        </div>
    }
}
