//! An out-of-the-box cinema chat widget wired to the ticketing backend over
//! HTTP.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to embed the widget into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod widget;

pub use widget::{Widget, WidgetBuilder};

/// Re-exports of [`cinebot_core`] crate.
pub mod core {
    pub use cinebot_core::*;
}
