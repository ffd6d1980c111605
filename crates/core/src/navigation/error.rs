use std::borrow::Cow;
use std::fmt::{self, Display};

/// The kind of navigation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No message with the given id is in the log.
    UnknownMessage,
    /// The message carries no showtime suggestion.
    NoBooking,
    /// The suggestion lacks a movie or showtime identifier.
    MissingIdentifiers,
    /// The widget has been shut down.
    Detached,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownMessage => write!(f, "Unknown message"),
            ErrorKind::NoBooking => write!(f, "No booking attached"),
            ErrorKind::MissingIdentifiers => {
                write!(f, "Booking is missing movie or showtime identifiers")
            }
            ErrorKind::Detached => write!(f, "Widget is shut down"),
        }
    }
}

/// Describes why a booking hand-off did not happen.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, reason: None }
    }

    /// Attaches a reason to the error.
    #[inline]
    pub(crate) fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}
