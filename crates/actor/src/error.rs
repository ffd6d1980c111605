use std::error::Error;
use std::fmt;

/// Returned when a message is sent to an event loop that has stopped.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ActorDeadError;

impl fmt::Debug for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActorDeadError")
    }
}

impl fmt::Display for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the event loop has stopped")
    }
}

impl Error for ActorDeadError {}
