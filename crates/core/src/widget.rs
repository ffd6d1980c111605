mod builder;
mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cinebot_actor::Actor;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use builder::{DEFAULT_FAILURE_TEXT, DEFAULT_WELCOME_TEXT, WidgetBuilder};
use state::{AuthChanged, Close, Open, Reset, SetInput, Submit, Toggle};

use crate::auth::CredentialSource;
use crate::backend_client::BackendClient;
use crate::message::{Message, MessageId};
use crate::navigation::{Error as NavigationError, ErrorKind, Navigator};
use crate::time::DisplayTimeZone;

/// How many trailing log entries travel with an anonymous request.
pub const HISTORY_WINDOW: usize = 10;

/// How long after a send finishes the input is focused again.
pub const FOCUS_DELAY: Duration = Duration::from_millis(100);

/// Everything a host needs to render the widget.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetSnapshot {
    /// Whether the panel is expanded.
    pub is_open: bool,
    /// The message log, welcome message first.
    pub messages: Vec<Message>,
    /// The input buffer.
    pub input: String,
    /// Whether a send is in flight.
    pub is_composing: bool,
    /// The server-side conversation, for signed-in users.
    pub conversation_id: Option<String>,
}

impl WidgetSnapshot {
    /// Whether the send control should be enabled.
    #[inline]
    pub fn can_submit(&self) -> bool {
        !self.is_composing && !self.input.trim().is_empty()
    }

    /// Looks up a message by id.
    #[inline]
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }
}

/// State owned by the widget's event loop.
///
/// Every field is only touched from message handlers, one at a time, so
/// the log can never be observed half-updated.
pub(crate) struct WidgetState {
    backend: BackendClient,
    credentials: Arc<dyn CredentialSource>,
    navigator: Option<Arc<dyn Navigator>>,
    time_zone: DisplayTimeZone,
    welcome: Message,
    failure_text: String,

    is_open: bool,
    messages: Vec<Message>,
    input: String,
    is_composing: bool,
    conversation_id: Option<String>,

    next_message_seq: u64,
    // Bumped on every reset. Replies from an older session are dropped.
    session_epoch: u64,
    // Bumped on every credential change. Stale history is dropped.
    auth_generation: u64,
    running_tasks: HashMap<u64, JoinHandle<()>>,
    next_task_id: u64,

    snapshot_tx: watch::Sender<WidgetSnapshot>,
    on_focus_input: Option<Box<dyn Fn() + Send + Sync>>,
}

/// A chat widget instance.
///
/// The widget owns the panel state, the message log and the conversation
/// with the backend. Every method only posts an event to the widget's
/// event loop and returns immediately; the outcome is observable through
/// [`ChatWidget::subscribe`] or [`ChatWidget::snapshot`].
///
/// Clones refer to the same widget.
#[derive(Clone)]
pub struct ChatWidget {
    handle: Actor<WidgetState>,
    snapshot_rx: watch::Receiver<WidgetSnapshot>,
}

impl ChatWidget {
    /// Expands the panel.
    #[inline]
    pub fn open(&self) {
        self.post(Open);
    }

    /// Collapses the panel.
    #[inline]
    pub fn close(&self) {
        self.post(Close);
    }

    /// Flips the panel between open and closed.
    #[inline]
    pub fn toggle(&self) {
        self.post(Toggle);
    }

    /// Replaces the input buffer, as typing does.
    #[inline]
    pub fn set_input<S: Into<String>>(&self, input: S) {
        self.post(SetInput(input.into()));
    }

    /// Sends the input buffer.
    ///
    /// Nothing happens when the buffer is blank or a send is in flight.
    #[inline]
    pub fn submit(&self) {
        self.post(Submit);
    }

    /// Types `text` and submits it.
    #[inline]
    pub fn send_message<S: Into<String>>(&self, text: S) {
        self.set_input(text);
        self.submit();
    }

    /// Starts a new conversation.
    #[inline]
    pub fn reset(&self) {
        self.post(Reset);
    }

    /// Re-reads the credential and reloads the conversation accordingly.
    ///
    /// Hosts call this whenever the user signs in or out. It also runs
    /// once when the widget is built.
    #[inline]
    pub fn auth_changed(&self) {
        self.post(AuthChanged);
    }

    /// Hands the showtime attached to message `id` over to the navigator
    /// and closes the panel.
    pub async fn navigate_to_booking(
        &self,
        id: &MessageId,
    ) -> Result<(), NavigationError> {
        let id = id.clone();
        self.handle
            .query(move |state| state.navigate_to_booking(&id))
            .await
            .unwrap_or_else(|_| Err(NavigationError::new(ErrorKind::Detached)))
    }

    /// Returns the current state.
    pub async fn snapshot(&self) -> WidgetSnapshot {
        match self.handle.query(|state| state.snapshot()).await {
            Ok(snapshot) => snapshot,
            // The loop is gone, the last published state is final.
            Err(_) => self.snapshot_rx.borrow().clone(),
        }
    }

    /// Returns a receiver that sees every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stops the widget. In-flight requests are abandoned.
    #[inline]
    pub fn shutdown(&self) {
        self.handle.try_kill();
    }

    fn post<M: cinebot_actor::Message<WidgetState> + 'static>(&self, msg: M) {
        if self.handle.send(msg).is_err() {
            warn!("widget has been shut down, event dropped");
        }
    }
}
