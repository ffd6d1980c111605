//! A local fake chat backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cinebot_protocol::{
    BackendError, ChatBackend, ChatRequest, ChatResponse, Credential, ErrorKind,
    HistoryResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
    server_message: Option<String>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }
}

/// A request the backend has received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedRequest {
    /// `GET /chat/history`.
    History {
        /// The bearer credential.
        credential: Credential,
    },
    /// `POST /chat`.
    Send {
        /// The request body.
        request: ChatRequest,
        /// The bearer credential, if one was attached.
        credential: Option<Credential>,
    },
}

#[derive(Default)]
struct Script {
    replies: VecDeque<PresetReply>,
    histories: VecDeque<PresetHistory>,
    received: Vec<RecordedRequest>,
}

/// A local fake backend for testing purpose.
///
/// Before sending requests, queue the answers the backend should give.
/// Sends and history fetches consume their own queues in order. When a
/// queue runs dry, the request fails with a network error.
///
/// Clones share the same script, so a test can keep one clone to inspect
/// [`TestBackend::received`] after handing another to the widget.
#[derive(Clone, Default)]
pub struct TestBackend {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestBackend {
    #[inline]
    pub fn add_reply(&self, preset: PresetReply) {
        self.script().replies.push_back(preset);
    }

    #[inline]
    pub fn add_history(&self, preset: PresetHistory) {
        self.script().histories.push_back(preset);
    }

    /// Delays every answer, so tests can act while a request is in flight.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, oldest first.
    #[inline]
    pub fn received(&self) -> Vec<RecordedRequest> {
        self.script().received.clone()
    }

    /// Returns the bodies of every `POST /chat` received so far.
    pub fn sent_requests(&self) -> Vec<ChatRequest> {
        self.script()
            .received
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::Send { request, .. } => Some(request.clone()),
                RecordedRequest::History { .. } => None,
            })
            .collect()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer<T>(
        &self,
        preset: Option<Preset<T>>,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static
    where
        T: Send + 'static,
    {
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        async move {
            sleep(delay).await;
            match preset {
                Some(Preset::Ok(body)) => Ok(body),
                Some(Preset::Status { code, message }) => Err(Error {
                    message: "preset status",
                    kind: ErrorKind::Status(code),
                    server_message: message,
                }),
                Some(Preset::Network) => Err(Error {
                    message: "preset network failure",
                    kind: ErrorKind::Network,
                    server_message: None,
                }),
                None => Err(Error {
                    message: "no enough presets",
                    kind: ErrorKind::Network,
                    server_message: None,
                }),
            }
        }
    }
}

impl Debug for TestBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestBackend")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl ChatBackend for TestBackend {
    type Error = crate::Error;

    fn fetch_history(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<HistoryResponse, Self::Error>> + Send + 'static
    {
        let preset = {
            let mut script = self.script();
            script.received.push(RecordedRequest::History {
                credential: credential.clone(),
            });
            script.histories.pop_front()
        };
        self.answer(preset)
    }

    fn send_message(
        &self,
        req: &ChatRequest,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Result<ChatResponse, Self::Error>> + Send + 'static
    {
        let preset = {
            let mut script = self.script();
            script.received.push(RecordedRequest::Send {
                request: req.clone(),
                credential: credential.cloned(),
            });
            script.replies.pop_front()
        };
        self.answer(preset)
    }
}
