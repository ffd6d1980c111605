//! The contract between the chat widget and the cinema chat backend.
//!
//! This crate describes the two endpoints the widget talks to (history
//! fetch and message send) as plain data types, plus the [`ChatBackend`]
//! trait that transports implement. It's deliberately free of behavior,
//! so the widget can be driven by the real HTTP backend in production
//! and by a scripted one in tests without either side noticing.

#![deny(missing_docs)]

mod backend;
mod credential;
mod error;
mod request;
mod response;

pub use backend::*;
pub use credential::*;
pub use error::*;
pub use request::*;
pub use response::*;
