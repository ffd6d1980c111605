use std::error::Error;

use crate::credential::Credential;
use crate::error::ErrorKind;
use crate::request::ChatRequest;
use crate::response::{ChatResponse, HistoryResponse};

/// The error type for a chat backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the message the backend put in its error payload, if the
    /// failure came with one.
    fn server_message(&self) -> Option<&str> {
        None
    }
}

/// A type that represents the remote chat service.
///
/// Once the backend is created, it should behave like a stateless object.
/// Conversation state lives on the server and in the widget, never in the
/// backend value itself, which may be cloned or dropped at any time.
pub trait ChatBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Fetches the stored conversation of the signed-in user.
    fn fetch_history(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<HistoryResponse, Self::Error>> + Send + 'static;

    /// Sends a user message and waits for the assistant's reply.
    ///
    /// `credential` is attached as a bearer header when present.
    fn send_message(
        &self,
        req: &ChatRequest,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Result<ChatResponse, Self::Error>> + Send + 'static;
}
