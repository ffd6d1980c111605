use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use cinebot_actor::Actor;
use cinebot_protocol::ChatBackend;
use tokio::sync::watch;

use super::state::AuthChanged;
use super::{ChatWidget, WidgetSnapshot, WidgetState};
use crate::auth::{Anonymous, CredentialSource};
use crate::backend_client::BackendClient;
use crate::message::{Message, MessageId, Sender};
use crate::navigation::Navigator;
use crate::time::DisplayTimeZone;

const WELCOME_ID: &str = "initial-1";

/// Greeting shown at the top of every conversation.
pub const DEFAULT_WELCOME_TEXT: &str = "Hello! 🍿 I'm the cinema assistant. \
    I can look up showtimes or book tickets for you. \
    What would you like to watch today?";

/// Shown in place of a reply when a send fails.
pub const DEFAULT_FAILURE_TEXT: &str =
    "Sorry, something went wrong. Please try again. 🛠️";

/// [`ChatWidget`] builder.
pub struct WidgetBuilder {
    backend: BackendClient,
    credentials: Arc<dyn CredentialSource>,
    navigator: Option<Arc<dyn Navigator>>,
    welcome_text: String,
    failure_text: String,
    time_zone: DisplayTimeZone,
    on_focus_input: Option<Box<dyn Fn() + Send + Sync>>,
}

impl WidgetBuilder {
    /// Creates a new builder talking to the specified backend.
    ///
    /// Until [`WidgetBuilder::with_credentials`] is called, every user is a
    /// guest.
    #[inline]
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            backend: BackendClient::new(backend),
            credentials: Arc::new(Anonymous),
            navigator: None,
            welcome_text: DEFAULT_WELCOME_TEXT.to_owned(),
            failure_text: DEFAULT_FAILURE_TEXT.to_owned(),
            time_zone: DisplayTimeZone::default(),
            on_focus_input: None,
        }
    }

    /// Sets where the signed-in user's credential comes from.
    #[inline]
    pub fn with_credentials<C: CredentialSource>(mut self, source: C) -> Self {
        self.credentials = Arc::new(source);
        self
    }

    /// Attaches the host's router.
    #[inline]
    pub fn with_navigator<N: Navigator>(mut self, navigator: N) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Replaces the greeting.
    #[inline]
    pub fn with_welcome_text<S: Into<String>>(mut self, text: S) -> Self {
        self.welcome_text = text.into();
        self
    }

    /// Replaces the text shown when a send fails.
    #[inline]
    pub fn with_failure_text<S: Into<String>>(mut self, text: S) -> Self {
        self.failure_text = text.into();
        self
    }

    /// Sets the zone used for timestamps without an offset and for
    /// rendering clock times.
    #[inline]
    pub fn with_time_zone(mut self, time_zone: DisplayTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Attaches a callback to be invoked when the input should take focus.
    #[inline]
    pub fn on_focus_input(
        mut self,
        on_focus_input: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_focus_input = Some(Box::new(on_focus_input));
        self
    }

    /// Builds the widget and starts loading the conversation.
    ///
    /// Must be called within a Tokio runtime.
    pub fn build(self) -> ChatWidget {
        let welcome = Message::new(
            MessageId::new(WELCOME_ID),
            self.welcome_text,
            Sender::Assistant,
            Utc::now(),
            None,
        );
        let (snapshot_tx, snapshot_rx) = watch::channel(WidgetSnapshot {
            is_open: false,
            messages: vec![welcome.clone()],
            input: String::new(),
            is_composing: false,
            conversation_id: None,
        });
        let state = WidgetState {
            backend: self.backend,
            credentials: self.credentials,
            navigator: self.navigator,
            time_zone: self.time_zone,
            welcome: welcome.clone(),
            failure_text: self.failure_text,
            is_open: false,
            messages: vec![welcome],
            input: String::new(),
            is_composing: false,
            conversation_id: None,
            next_message_seq: 1,
            session_epoch: 0,
            auth_generation: 0,
            running_tasks: HashMap::new(),
            next_task_id: 0,
            snapshot_tx,
            on_focus_input: self.on_focus_input,
        };

        let handle = Actor::spawn(state, Some("widget"));
        handle.send(AuthChanged).ok();
        ChatWidget {
            handle,
            snapshot_rx,
        }
    }
}
