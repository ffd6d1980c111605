use std::sync::Weak;

use tokio::select;
use tokio::sync::{mpsc, watch};

use crate::mailbox::Mailbox;
use crate::{Actor, Message};

pub async fn run_actor<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut msg_rx: mpsc::UnboundedReceiver<Box<dyn Message<S>>>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let msg = select! {
            biased;

            _ = kill_rx.changed() => {
                break;
            }
            msg = msg_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                msg
            }
        };
        trace!("received message: {msg:?}");

        // Handlers receive a strong handle so they can post follow-ups.
        // Once every external handle is gone nobody can observe the
        // state anymore, so there is no point in going on.
        let Some(mailbox) = mailbox.upgrade() else {
            debug!("all handles dropped, discard the message");
            break;
        };
        trace_span!("proc msg").in_scope(|| {
            msg.handle(&mut state, &Actor::from_mailbox(mailbox));
        });
    }
    debug!("will terminate");
    drop(state);
}
