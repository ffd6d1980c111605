//! A single-task event loop for UI-like state machines.
//!
//! State is owned by one tokio task and only touched by messages taken off
//! its mailbox, one at a time. This gives the same guarantees as a browser
//! event loop: handlers never overlap, and asynchronous work reports back
//! by posting another message.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio::time::sleep;

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
        seen: Vec<&'static str>,
    }

    #[derive(Debug)]
    struct Add(u32);

    impl Message<Counter> for Add {
        fn handle(self, state: &mut Counter, _handle: &Actor<Counter>) {
            state.value += self.0;
        }
    }

    #[derive(Debug)]
    struct Mark(&'static str);

    impl Message<Counter> for Mark {
        fn handle(self, state: &mut Counter, _handle: &Actor<Counter>) {
            state.seen.push(self.0);
        }
    }

    #[derive(Debug)]
    struct Get(oneshot::Sender<u32>);

    impl Message<Counter> for Get {
        fn handle(self, state: &mut Counter, _handle: &Actor<Counter>) {
            self.0.send(state.value).unwrap();
        }
    }

    #[tokio::test]
    async fn test_send_message() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send(Add(40)).unwrap();
        actor.send(Add(2)).unwrap();

        let (tx, rx) = oneshot::channel();
        actor.send(Get(tx)).unwrap();
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_query() {
        let actor = Actor::spawn(Counter::default(), Some("query"));
        actor.send(Add(7)).unwrap();
        let value = actor.query(|state| state.value * 2).await.unwrap();
        assert_eq!(value, 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send_after(Mark("late"), Duration::from_millis(100));
        actor.send(Mark("early")).unwrap();

        sleep(Duration::from_millis(50)).await;
        let seen = actor.query(|state| state.seen.clone()).await.unwrap();
        assert_eq!(seen, vec!["early"]);

        sleep(Duration::from_millis(100)).await;
        let seen = actor.query(|state| state.seen.clone()).await.unwrap();
        assert_eq!(seen, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_kill() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.try_kill();
        // The loop quits before answering; the query sees a dead actor.
        sleep(Duration::from_millis(10)).await;
        assert!(actor.query(|state| state.value).await.is_err());
    }
}
