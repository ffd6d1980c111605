use std::fmt::{self, Debug};

use chrono::Utc;
use cinebot_actor::{Actor, Message as ActorMessage};
use cinebot_protocol::{ChatRequest, ChatResponse, HistoryResponse, HistoryTurn};

use super::{FOCUS_DELAY, HISTORY_WINDOW, WidgetSnapshot, WidgetState};
use crate::backend_client::BoxedBackendError;
use crate::message::{BookingPayload, Message, MessageId, Sender};
use crate::navigation::{BookingNavigation, Error as NavigationError, ErrorKind};
use crate::reply::parse_reply;

impl WidgetState {
    pub(super) fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            is_open: self.is_open,
            messages: self.messages.clone(),
            input: self.input.clone(),
            is_composing: self.is_composing,
            conversation_id: self.conversation_id.clone(),
        }
    }

    /// Pushes the current state to subscribers.
    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn next_id(&mut self, prefix: &str) -> MessageId {
        let seq = self.next_message_seq;
        self.next_message_seq += 1;
        MessageId::new(format!("{prefix}-{seq}"))
    }

    fn push_assistant(
        &mut self,
        prefix: &str,
        text: String,
        booking: Option<BookingPayload>,
    ) {
        let id = self.next_id(prefix);
        self.messages.push(Message::new(
            id,
            text,
            Sender::Assistant,
            Utc::now(),
            booking,
        ));
    }

    /// Drops the conversation: welcome message only, no server id, no
    /// pending send.
    fn clear_session(&mut self) {
        self.messages = vec![self.welcome.clone()];
        self.conversation_id = None;
        self.is_composing = false;
        self.session_epoch += 1;
    }

    fn request_focus(&self) {
        if let Some(on_focus_input) = &self.on_focus_input {
            on_focus_input();
        }
    }

    fn bootstrap(&mut self, handle: &Actor<Self>) {
        self.auth_generation += 1;
        let generation = self.auth_generation;

        let Some(credential) = self.credentials.current() else {
            debug!("no credential, starting a fresh conversation");
            self.clear_session();
            return;
        };

        debug!("credential present, loading history");
        let backend = self.backend.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            async move {
                let result = backend.fetch_history(credential).await;
                handle_clone
                    .send(HistoryFetched { generation, result })
                    .ok();
            },
            handle,
        );
    }

    fn apply_history(&mut self, history: HistoryResponse) {
        let loaded_at = Utc::now();
        let records = history.messages.unwrap_or_default();
        if records.is_empty() {
            debug!("no stored conversation");
            self.messages = vec![self.welcome.clone()];
            self.conversation_id = None;
            return;
        }

        let count = records.len();
        let mut messages = Vec::with_capacity(count + 1);
        messages.push(self.welcome.clone());
        messages.extend(records.into_iter().map(|record| {
            Message::from_record(record, &self.time_zone, loaded_at)
        }));
        self.messages = messages;
        self.conversation_id = history.conversation_id;
        info!(
            "loaded {count} messages for conversation {:?}",
            self.conversation_id
        );
    }

    fn submit(&mut self, handle: &Actor<Self>) {
        if self.is_composing {
            trace!("a send is in flight, ignore submit");
            return;
        }
        let text = self.input.trim();
        if text.is_empty() {
            trace!("blank input, ignore submit");
            return;
        }
        let text = text.to_owned();

        // Show the user's message right away.
        let id = self.next_id("user");
        self.messages.push(Message::new(
            id,
            text.clone(),
            Sender::User,
            Utc::now(),
            None,
        ));
        self.input.clear();
        self.is_composing = true;

        let credential = self.credentials.current();
        let authenticated = credential.is_some();
        let request = if authenticated {
            ChatRequest::Authenticated {
                message: text,
                conversation_id: self.conversation_id.clone(),
            }
        } else {
            ChatRequest::Anonymous {
                message: text,
                history: self.history_window(),
            }
        };

        let epoch = self.session_epoch;
        let backend = self.backend.clone();
        let handle_clone = handle.clone();
        self.spawn_task(
            async move {
                let result = backend.send_message(request, credential).await;
                handle_clone
                    .send(SendFinished {
                        epoch,
                        authenticated,
                        result,
                    })
                    .ok();
            },
            handle,
        );
    }

    /// The trailing turns a guest request carries, oldest first. The
    /// welcome message is local decoration and never leaves the widget.
    fn history_window(&self) -> Vec<HistoryTurn> {
        let turns: Vec<_> = self
            .messages
            .iter()
            .filter(|m| m.id() != self.welcome.id())
            .map(|m| HistoryTurn {
                text: m.text().to_owned(),
                sender: m.sender(),
            })
            .collect();
        let skip = turns.len().saturating_sub(HISTORY_WINDOW);
        turns.into_iter().skip(skip).collect()
    }

    fn finish_send(
        &mut self,
        authenticated: bool,
        result: Result<ChatResponse, BoxedBackendError>,
        handle: &Actor<Self>,
    ) {
        self.is_composing = false;
        match result {
            Ok(resp) => {
                if authenticated {
                    if let Some(id) = resp.conversation_id {
                        self.conversation_id = Some(id);
                    }
                }
                let parsed = parse_reply(&resp.reply, &self.time_zone);
                self.push_assistant("bot", parsed.text, parsed.booking);
            }
            Err(err) => {
                error!("chat request failed ({}): {err}", err.kind());
                let text = self.failure_text.clone();
                self.push_assistant("bot-error", text, None);
            }
        }
        handle.send_after(FocusInput, FOCUS_DELAY);
    }

    pub(super) fn navigate_to_booking(
        &mut self,
        id: &MessageId,
    ) -> Result<(), NavigationError> {
        let nav = self
            .messages
            .iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| {
                NavigationError::new(ErrorKind::UnknownMessage)
                    .with_reason(id.to_string())
            })
            .and_then(|m| {
                m.booking().ok_or_else(|| {
                    NavigationError::new(ErrorKind::NoBooking)
                        .with_reason(id.to_string())
                })
            })
            .and_then(BookingNavigation::from_payload)
            .inspect_err(|err| error!("cannot continue to booking: {err}"))?;

        self.is_open = false;
        self.publish();

        match &self.navigator {
            Some(navigator) => navigator.navigate(&nav.route, &nav.state),
            None => warn!("no navigator attached, dropping {}", nav.route),
        }
        Ok(())
    }

    fn spawn_task<Fut>(&mut self, fut: Fut, handle: &Actor<Self>)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let handle = handle.clone();
        let task = tokio::spawn(async move {
            fut.await;
            handle.send(TaskEnded(task_id)).ok();
        });
        self.running_tasks.insert(task_id, task);
    }
}

impl Drop for WidgetState {
    fn drop(&mut self) {
        for (_, task) in self.running_tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Debug)]
pub struct Open;

impl ActorMessage<WidgetState> for Open {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.is_open = true;
        state.publish();
    }
}

#[derive(Debug)]
pub struct Close;

impl ActorMessage<WidgetState> for Close {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.is_open = false;
        state.publish();
    }
}

#[derive(Debug)]
pub struct Toggle;

impl ActorMessage<WidgetState> for Toggle {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.is_open = !state.is_open;
        state.publish();
    }
}

#[derive(Debug)]
pub struct SetInput(pub String);

impl ActorMessage<WidgetState> for SetInput {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.input = self.0;
        state.publish();
    }
}

#[derive(Debug)]
pub struct Submit;

impl ActorMessage<WidgetState> for Submit {
    fn handle(self, state: &mut WidgetState, handle: &Actor<WidgetState>) {
        state.submit(handle);
        state.publish();
    }
}

#[derive(Debug)]
pub struct Reset;

impl ActorMessage<WidgetState> for Reset {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.clear_session();
        state.publish();
        state.request_focus();
    }
}

#[derive(Debug)]
pub struct AuthChanged;

impl ActorMessage<WidgetState> for AuthChanged {
    fn handle(self, state: &mut WidgetState, handle: &Actor<WidgetState>) {
        state.bootstrap(handle);
        state.publish();
    }
}

#[derive(Debug)]
struct FocusInput;

impl ActorMessage<WidgetState> for FocusInput {
    #[inline]
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        state.request_focus();
    }
}

struct HistoryFetched {
    generation: u64,
    result: Result<HistoryResponse, BoxedBackendError>,
}

impl Debug for HistoryFetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryFetched")
            .field("generation", &self.generation)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

impl ActorMessage<WidgetState> for HistoryFetched {
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        if self.generation != state.auth_generation {
            debug!("credential changed meanwhile, discard history");
            return;
        }
        match self.result {
            Ok(history) => {
                state.apply_history(history);
                state.publish();
            }
            Err(err) => {
                // Keep whatever is on screen.
                error!("failed to load chat history: {err}");
            }
        }
    }
}

struct SendFinished {
    epoch: u64,
    authenticated: bool,
    result: Result<ChatResponse, BoxedBackendError>,
}

impl Debug for SendFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendFinished")
            .field("epoch", &self.epoch)
            .field("authenticated", &self.authenticated)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

impl ActorMessage<WidgetState> for SendFinished {
    fn handle(self, state: &mut WidgetState, handle: &Actor<WidgetState>) {
        if self.epoch != state.session_epoch {
            debug!("conversation was reset meanwhile, discard reply");
            return;
        }
        state.finish_send(self.authenticated, self.result, handle);
        state.publish();
    }
}

#[derive(Debug)]
struct TaskEnded(u64);

impl ActorMessage<WidgetState> for TaskEnded {
    #[inline]
    fn handle(self, state: &mut WidgetState, _handle: &Actor<WidgetState>) {
        if state.running_tasks.remove(&self.0).is_none() {
            warn!("unknown task ended: {}", self.0);
        }
    }
}
