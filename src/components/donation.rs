use yew::prelude::*;

use super::{Button, TextInput};
use crate::amount::{format_usd, AmountSelection, DEFAULT_PRESET, DEFAULT_PRESETS};
use crate::checkout_component::PaddleCheckout;
use crate::error::CheckoutError;
use crate::session::{CompletedCheckout, PlanDescriptor};

/// Properties for [`DonationWidget`].
///
/// # Fields
///
/// * `presets` – Amount buttons, in dollars.
/// * `initial` – Preset selected on first render.
/// * `title` – Heading above the amount picker.
/// * `on_success` / `on_error` – Forwarded from the inner [`PaddleCheckout`].
#[derive(Properties, PartialEq, Clone)]
pub struct DonationWidgetProps {
    #[prop_or_else(|| DEFAULT_PRESETS.to_vec())]
    pub presets: Vec<f64>,
    #[prop_or(DEFAULT_PRESET)]
    pub initial: f64,
    #[prop_or_else(|| "Support us".to_string())]
    pub title: String,
    #[prop_or_default]
    pub on_success: Callback<CompletedCheckout>,
    #[prop_or_default]
    pub on_error: Callback<CheckoutError>,
}

/// Amount picker that hands a donation plan to [`PaddleCheckout`].
///
/// The plan is fixed when "Donate" is clicked; editing the amount afterwards
/// requires going back to the picker.
#[function_component(DonationWidget)]
pub fn donation_widget(props: &DonationWidgetProps) -> Html {
    let selection = {
        let presets = props.presets.clone();
        let initial = props.initial;
        use_state(move || AmountSelection::new(presets, initial))
    };
    let checkout = use_state(|| None::<PlanDescriptor>);
    let message = use_state(|| None::<String>);

    if let Some(plan) = (*checkout).clone() {
        let on_success = {
            let checkout = checkout.clone();
            let message = message.clone();
            let forward = props.on_success.clone();
            Callback::from(move |done: CompletedCheckout| {
                message.set(Some("Thank you for your donation!".to_string()));
                checkout.set(None);
                forward.emit(done);
            })
        };
        let on_error = {
            let checkout = checkout.clone();
            let message = message.clone();
            let forward = props.on_error.clone();
            Callback::from(move |err: CheckoutError| {
                message.set(Some(format!("Donation failed: {err}")));
                checkout.set(None);
                forward.emit(err);
            })
        };
        let on_back = {
            let checkout = checkout.clone();
            Callback::from(move |_: MouseEvent| checkout.set(None))
        };
        return html! {
            <div class="paddle-donation max-w-md mx-auto">
                <PaddleCheckout {plan} {on_success} {on_error} />
                <Button label={"Back to Amount Selection"} onclick={on_back} />
            </div>
        };
    }

    let amount = selection.effective_amount();
    let freeform_error = selection.freeform_error();
    let freeform = selection.freeform().unwrap_or_default().to_string();

    let preset_buttons = selection
        .presets()
        .iter()
        .map(|&value| {
            let active = selection.is_preset_active(value);
            let selection = selection.clone();
            let onclick = Callback::from(move |_: MouseEvent| {
                let mut next = (*selection).clone();
                next.select_preset(value);
                selection.set(next);
            });
            html! {
                <Button
                    label={format!("${value}")}
                    selected={active}
                    {onclick}
                />
            }
        })
        .collect::<Html>();

    let on_freeform = {
        let selection = selection.clone();
        Callback::from(move |text: String| {
            let mut next = (*selection).clone();
            next.set_freeform(text);
            selection.set(next);
        })
    };

    let on_donate = {
        let selection = selection.clone();
        let checkout = checkout.clone();
        let message = message.clone();
        Callback::from(move |_: MouseEvent| match selection.to_plan() {
            Some(plan) => {
                message.set(None);
                checkout.set(Some(plan));
            }
            None => log::warn!("donate clicked without an actionable amount"),
        })
    };

    html! {
        <div class="paddle-donation max-w-md mx-auto">
            <h3 class="text-2xl font-bold">{ props.title.clone() }</h3>
            if let Some(text) = (*message).clone() {
                <div class="paddle-donation__message text-sm">{ text }</div>
            }
            <label class="block text-sm font-medium">{ "Choose an amount:" }</label>
            <div class="grid grid-cols-3 gap-3">{ preset_buttons }</div>
            <label class="block text-sm font-medium">{ "Or enter a custom amount:" }</label>
            <TextInput
                value={freeform}
                oninput={on_freeform}
                placeholder={"Enter amount"}
                invalid={freeform_error.is_some()}
            />
            if let Some(err) = freeform_error {
                <div class="text-red-500 text-sm">{ err }</div>
            }
            <Button
                label={format!("Donate {}", format_usd(amount))}
                disabled={!selection.is_actionable()}
                onclick={on_donate}
            />
            <p class="text-xs text-gray-500 text-center">
                { "Donations are processed securely through Paddle.com" }
            </p>
        </div>
    }
}
