//! Small presentational pieces shared by the checkout widgets.

use web_sys::HtmlInputElement;
use yew::prelude::*;

mod donation;

pub use donation::*;

/// A styled button. `selected` marks the active choice in a group.
#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    /// Button label text
    pub label: String,
    /// Click handler
    pub onclick: Callback<MouseEvent>,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or_default]
    pub selected: bool,
}

#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    let class = classes!(
        "paddle-button",
        props.selected.then_some("paddle-button--selected")
    );
    html! {
        <button
            type="button"
            onclick={props.onclick.clone()}
            disabled={props.disabled}
            aria-pressed={props.selected.to_string()}
            {class}
        >
            { &props.label }
        </button>
    }
}

/// A controlled text input for money amounts.
#[derive(Properties, PartialEq)]
pub struct TextInputProps {
    /// Current value
    pub value: String,
    /// Emits new value on each keystroke
    pub oninput: Callback<String>,
    #[prop_or_default]
    pub placeholder: String,
    /// Renders the error styling and `aria-invalid`.
    #[prop_or_default]
    pub invalid: bool,
}

#[function_component(TextInput)]
pub fn text_input(props: &TextInputProps) -> Html {
    let oninput = props.oninput.clone();
    let class = classes!(
        "paddle-text-input",
        props.invalid.then_some("paddle-text-input--invalid")
    );
    html! {
        <input
            type="text"
            inputmode="decimal"
            {class}
            aria-invalid={props.invalid.to_string()}
            value={props.value.clone()}
            placeholder={props.placeholder.clone()}
            oninput={Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                oninput.emit(input.value());
            })}
        />
    }
}
