// src/lib.rs
use log::LevelFilter;
use wasm_bindgen::prelude::*;
use yew::prelude::*;
use yew_paddle::{
    install_config, logging, BillingCycle, CheckoutError, CompletedCheckout, DonationWidget,
    PaddleCheckout, PaddleConfig, PlanDescriptor, PlanTier,
};

#[wasm_bindgen(start)]
pub fn start() {
    logging::init(LevelFilter::Debug);
    // Sandbox seller; swap for your own before going live.
    if let Err(err) = install_config(PaddleConfig::sandbox(yew_paddle::DEFAULT_SELLER_ID)) {
        log::error!("{err}");
    }
    yew::Renderer::<DonationPage>::new().render();
}

#[function_component(DonationPage)]
fn donation_page() -> Html {
    let last = use_state(|| None::<String>);

    let on_success = {
        let last = last.clone();
        Callback::from(move |done: CompletedCheckout| {
            log::info!("{} completed ({:?})", done.session, done.transaction_id);
            last.set(Some(format!("Completed {}", done.session)));
        })
    };
    let on_error = {
        let last = last.clone();
        Callback::from(move |err: CheckoutError| {
            log::warn!("{} failed: {err}", err.kind());
            last.set(Some(err.to_string()));
        })
    };

    let pro = PlanDescriptor::Subscription {
        tier: PlanTier::Pro,
        cycle: BillingCycle::Monthly,
    };

    html! {
        <main class="grid gap-8 md:grid-cols-2 p-8">
            <DonationWidget
                title={"Support Devmint"}
                on_success={on_success.clone()}
                on_error={on_error.clone()}
            />
            <PaddleCheckout plan={pro} {on_success} {on_error}>
                <ul class="text-sm">
                    <li>{ "Unlimited API calls" }</li>
                    <li>{ "Priority support" }</li>
                </ul>
            </PaddleCheckout>
            if let Some(text) = (*last).clone() {
                <p class="col-span-2 text-sm text-gray-600">{ text }</p>
            }
        </main>
    }
}
