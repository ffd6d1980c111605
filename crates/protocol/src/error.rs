use std::fmt::{self, Display};

/// The kind of error that occurred while talking to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be delivered, or the connection dropped.
    Network,
    /// The backend answered with a non-success status code.
    Status(u16),
    /// The response body could not be decoded.
    Decode,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "Network error"),
            ErrorKind::Status(code) => write!(f, "Unexpected status {code}"),
            ErrorKind::Decode => write!(f, "Malformed response"),
        }
    }
}
