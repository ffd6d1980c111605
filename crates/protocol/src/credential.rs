use std::fmt::{self, Debug, Formatter};

/// A bearer credential of a signed-in user.
///
/// The token is never printed, `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential from a bearer token.
    #[inline]
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[inline]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Returns the value for the `Authorization` header.
    #[inline]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<deducted>").finish()
    }
}
