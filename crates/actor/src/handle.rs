use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::Instrument;

use crate::mailbox::{Mailbox, MailboxParts, Query};
use crate::scheduler::run_actor;
use crate::{ActorDeadError, Message};

/// Handle to an event loop.
///
/// The loop keeps running as long as at least one handle is alive, or
/// until [`Actor::try_kill`] is called.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + 'static> Actor<S> {
    /// Spawns a new event loop owning `state`, with an optional label
    /// for tracing spans.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let MailboxParts {
            mailbox,
            msg_rx,
            kill_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, msg_rx, kill_rx)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Sends a message to the event loop.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.mailbox.send(Box::new(msg))
    }

    /// Sends a message once `delay` has elapsed.
    ///
    /// The pending message does not keep the loop alive. If every handle
    /// is gone by the time it fires, it's dropped silently.
    pub fn send_after<M: Message<S> + 'static>(&self, msg: M, delay: Duration) {
        let mailbox: Weak<Mailbox<S>> = Arc::downgrade(&self.mailbox);
        tokio::spawn(async move {
            sleep(delay).await;
            let Some(mailbox) = mailbox.upgrade() else {
                trace!("loop is gone, drop the delayed message");
                return;
            };
            mailbox.send(Box::new(msg)).ok();
        });
    }

    /// Runs `f` on the loop with the state and returns its result.
    pub async fn query<F, R>(&self, f: F) -> Result<R, ActorDeadError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Query { f, reply_tx })?;
        reply_rx.await.map_err(|_| ActorDeadError)
    }

    /// Attempts to stop the event loop.
    ///
    /// The loop is not guaranteed to stop immediately, but it will not
    /// handle further messages and quits soon. Its state is dropped on
    /// the way out.
    #[inline]
    pub fn try_kill(&self) {
        self.mailbox.try_kill();
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}
