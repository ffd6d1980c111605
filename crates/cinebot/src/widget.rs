use cinebot_core::auth::{Credential, SharedCredential};
use cinebot_core::message::MessageId;
use cinebot_core::navigation::{Error as NavigationError, Navigator};
use cinebot_core::{ChatWidget, DisplayTimeZone, WidgetSnapshot};
use cinebot_http_backend::{
    HttpBackend, HttpBackendConfig, HttpBackendConfigBuilder,
};
use tokio::sync::watch;

/// A widget builder.
///
/// See [`Widget`].
pub struct WidgetBuilder {
    inner: cinebot_core::WidgetBuilder,
    credential: SharedCredential,
}

impl WidgetBuilder {
    /// Creates a builder talking to the backend at the default base URL.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(HttpBackendConfigBuilder::new().build())
    }

    /// Creates a builder talking to the backend at `base_url`, e.g.
    /// `https://tickets.example.com/api`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self::with_config(
            HttpBackendConfigBuilder::new()
                .with_base_url(base_url)
                .build(),
        )
    }

    /// Creates a builder with a fully specified backend configuration.
    pub fn with_config(config: HttpBackendConfig) -> Self {
        let credential = SharedCredential::default();
        let inner = cinebot_core::WidgetBuilder::with_backend(
            HttpBackend::new(config),
        )
        .with_credentials(credential.clone());
        Self { inner, credential }
    }

    /// Starts with a signed-in user.
    #[inline]
    pub fn with_token<S: Into<String>>(self, token: S) -> Self {
        self.credential.sign_in(Credential::new(token));
        self
    }

    /// Attaches the host's router.
    #[inline]
    pub fn with_navigator<N: Navigator>(mut self, navigator: N) -> Self {
        self.inner = self.inner.with_navigator(navigator);
        self
    }

    /// Sets the zone used for rendering times.
    #[inline]
    pub fn with_time_zone(mut self, time_zone: DisplayTimeZone) -> Self {
        self.inner = self.inner.with_time_zone(time_zone);
        self
    }

    /// Attaches a callback to be invoked when the input should take focus.
    #[inline]
    pub fn on_focus_input(
        mut self,
        on_focus_input: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.inner = self.inner.on_focus_input(on_focus_input);
        self
    }

    /// Builds a new widget.
    pub fn build(self) -> Widget {
        Widget {
            chat: self.inner.build(),
            credential: self.credential,
        }
    }
}

impl Default for WidgetBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// A chat widget talking to the ticketing backend, with the user's session
/// managed alongside.
///
/// It's basically a wrapper around [`ChatWidget`].
pub struct Widget {
    chat: ChatWidget,
    credential: SharedCredential,
}

impl Widget {
    /// Sends a message.
    #[inline]
    pub fn send_message(&self, message: &str) {
        self.chat.send_message(message);
    }

    /// Starts a new conversation.
    #[inline]
    pub fn reset(&self) {
        self.chat.reset();
    }

    /// Signs the user in and loads their stored conversation.
    pub fn sign_in<S: Into<String>>(&self, token: S) {
        self.credential.sign_in(Credential::new(token));
        self.chat.auth_changed();
    }

    /// Signs the user out, which also clears the conversation.
    pub fn sign_out(&self) {
        self.credential.sign_out();
        self.chat.auth_changed();
    }

    /// Continues to seat selection for the showtime suggested in message
    /// `id`.
    #[inline]
    pub async fn navigate_to_booking(
        &self,
        id: &MessageId,
    ) -> Result<(), NavigationError> {
        self.chat.navigate_to_booking(id).await
    }

    /// Returns the current state.
    #[inline]
    pub async fn snapshot(&self) -> WidgetSnapshot {
        self.chat.snapshot().await
    }

    /// Returns a receiver that sees every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.chat.subscribe()
    }

    /// Returns the underlying widget, for the operations not wrapped here.
    #[inline]
    pub fn chat_widget(&self) -> &ChatWidget {
        &self.chat
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.chat.shutdown();
    }
}
