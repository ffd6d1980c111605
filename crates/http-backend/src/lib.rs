//! A chat backend that talks to the cinema chat service over HTTP.

#[macro_use]
extern crate tracing;

mod config;
mod decode;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use cinebot_protocol::{
    BackendError, ChatBackend, ChatRequest, ChatResponse, Credential, ErrorKind,
    HistoryResponse,
};
use reqwest::{Client, RequestBuilder, header};
use serde::de::DeserializeOwned;

pub use config::{HttpBackendConfig, HttpBackendConfigBuilder};

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    server_message: Option<String>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            server_message: None,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
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

/// HTTP chat backend.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpBackendConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn request(
        &self,
        builder: RequestBuilder,
        credential: Option<&Credential>,
    ) -> RequestBuilder {
        let builder = builder
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::ACCEPT, "application/json");
        match credential {
            Some(credential) => {
                builder.header(header::AUTHORIZATION, credential.bearer())
            }
            None => builder,
        }
    }
}

impl ChatBackend for HttpBackend {
    type Error = Error;

    fn fetch_history(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<HistoryResponse, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .request(
                self.client.get(self.config.endpoint("/chat/history")),
                Some(credential),
            )
            .send();
        async move { read_response(resp_fut.await).await }
    }

    fn send_message(
        &self,
        req: &ChatRequest,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Result<ChatResponse, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .request(self.client.post(self.config.endpoint("/chat")), credential)
            .json(req)
            .send();
        async move { read_response(resp_fut.await).await }
    }
}

async fn read_response<T: DeserializeOwned>(
    resp_or_err: reqwest::Result<reqwest::Response>,
) -> Result<T, Error> {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            return Err(Error::new(format!("{err}"), ErrorKind::Network));
        }
    };

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let body = match resp.bytes().await {
        Ok(body) => body,
        Err(err) => {
            return Err(Error::new(format!("{err}"), ErrorKind::Network));
        }
    };
    trace!("got {} bytes with status {status}", body.len());

    if !status.is_success() {
        return Err(decode::status_error(status.as_u16(), &body));
    }
    decode::decode_body(content_type.as_deref(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        HttpBackend::new(
            HttpBackendConfigBuilder::new()
                .with_base_url("http://cinema.test/api/")
                .build(),
        )
    }

    #[test]
    fn test_bearer_only_when_signed_in() {
        let backend = backend();
        let credential = Credential::new("t-1");

        let req = backend
            .request(
                backend.client.get(backend.config.endpoint("/chat/history")),
                Some(&credential),
            )
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "http://cinema.test/api/chat/history");
        assert_eq!(req.headers()[header::AUTHORIZATION], "Bearer t-1");
        assert_eq!(req.headers()[header::ACCEPT], "application/json");

        let post = backend.client.post(backend.config.endpoint("/chat"));
        let req = backend.request(post, None).build().unwrap();
        assert!(req.headers().get(header::AUTHORIZATION).is_none());
        assert!(req.headers().contains_key(header::USER_AGENT));
    }
}
