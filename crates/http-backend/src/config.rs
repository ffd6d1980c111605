use std::fmt::Debug;

const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpBackendConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root, e.g. `https://cinema.example/api`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a custom `User-Agent` header.
    #[inline]
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpBackendConfig {
        let mut base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        while base_url.ends_with('/') {
            base_url.pop();
        }
        HttpBackendConfig {
            base_url,
            user_agent: self.user_agent.unwrap_or_else(|| {
                concat!("cinebot/", env!("CARGO_PKG_VERSION")).to_string()
            }),
        }
    }
}

/// Configuration for [`crate::HttpBackend`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
}

impl HttpBackendConfig {
    #[inline]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
