//! Where the widget learns who is signed in.

use std::sync::{Arc, PoisonError, RwLock};

pub use cinebot_protocol::Credential;

/// Supplies the current user's credential.
///
/// The widget asks on every send and every [`crate::ChatWidget::auth_changed`],
/// so implementations should be cheap and always reflect the latest state.
pub trait CredentialSource: Send + Sync + 'static {
    /// Returns the credential of the signed-in user, `None` for guests.
    fn current(&self) -> Option<Credential>;
}

impl<F> CredentialSource for F
where
    F: Fn() -> Option<Credential> + Send + Sync + 'static,
{
    #[inline]
    fn current(&self) -> Option<Credential> {
        self()
    }
}

/// A source for hosts without an authentication layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    #[inline]
    fn current(&self) -> Option<Credential> {
        None
    }
}

/// A credential slot shared between the host and the widget.
///
/// The host signs in and out through its own clone, then tells the
/// widget with [`crate::ChatWidget::auth_changed`].
#[derive(Clone, Debug, Default)]
pub struct SharedCredential(Arc<RwLock<Option<Credential>>>);

impl SharedCredential {
    /// Creates a signed-in slot.
    #[inline]
    pub fn signed_in(credential: Credential) -> Self {
        Self(Arc::new(RwLock::new(Some(credential))))
    }

    /// Stores a credential.
    #[inline]
    pub fn sign_in(&self, credential: Credential) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) =
            Some(credential);
    }

    /// Clears the credential.
    #[inline]
    pub fn sign_out(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialSource for SharedCredential {
    #[inline]
    fn current(&self) -> Option<Credential> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
