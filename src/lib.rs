mod amount;
mod bindings;
mod checkout_component;
mod client;
mod components;
mod config;
mod error;
mod interop;
mod machine;
mod paddle;
mod session;
#[cfg(test)]
mod testing;

pub mod logging;

pub use amount::*;
pub use checkout_component::*;
pub use client::*;
pub use components::*;
pub use config::*;
pub use error::*;
pub use interop::*;
pub use machine::*;
pub use paddle::*;
pub use session::*;
