use cinebot_protocol::{ErrorBody, ErrorKind};
use mime::Mime;
use serde::de::DeserializeOwned;

use crate::Error;

/// Decodes a success body.
///
/// The service is not strict about `Content-Type`, so a missing or
/// unexpected type is only reported, and decoding is attempted anyway.
pub fn decode_body<T: DeserializeOwned>(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, Error> {
    let is_json = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| {
            m.subtype().as_str() == "json"
                || m.suffix().map(|s| s.as_str()) == Some("json")
        })
        .unwrap_or(false);
    if !is_json {
        debug!("unexpected content type: {content_type:?}");
    }

    serde_json::from_slice(body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Decode))
}

/// Builds the error for a non-success status, keeping the server's
/// `message` when the body carries one.
pub fn status_error(status: u16, body: &[u8]) -> Error {
    let server_message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());
    let mut err = Error::new(
        match &server_message {
            Some(message) => format!("server responded {status}: {message}"),
            None => format!("server responded {status}"),
        },
        ErrorKind::Status(status),
    );
    err.server_message = server_message;
    err
}
