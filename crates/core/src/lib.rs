//! Core logic of the cinema chat widget: panel state, message log,
//! conversation with the backend, reply interpretation and the hand-off to
//! seat selection.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod auth;
mod backend_client;
pub mod message;
pub mod navigation;
pub mod reply;
mod time;
mod widget;

pub use time::DisplayTimeZone;
pub use widget::{
    ChatWidget, DEFAULT_FAILURE_TEXT, DEFAULT_WELCOME_TEXT, FOCUS_DELAY,
    HISTORY_WINDOW, WidgetBuilder, WidgetSnapshot,
};
