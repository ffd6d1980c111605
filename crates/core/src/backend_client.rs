use std::pin::Pin;
use std::sync::Arc;

use cinebot_protocol::{
    BackendError, ChatBackend, ChatRequest, ChatResponse, Credential,
    HistoryResponse,
};
use tracing::Instrument;

pub type BoxedBackendError = Box<dyn BackendError>;
type BoxedFuture<T> =
    Pin<Box<dyn Future<Output = Result<T, BoxedBackendError>> + Send>>;
type HistoryFn =
    Arc<dyn Fn(Credential) -> BoxedFuture<HistoryResponse> + Send + Sync>;
#[rustfmt::skip]
type SendFn = Arc<
    dyn Fn(ChatRequest, Option<Credential>)
        -> BoxedFuture<ChatResponse> + Send + Sync
>;

#[inline]
fn boxed<E: BackendError>(err: E) -> BoxedBackendError {
    Box::new(err)
}

/// A wrapper around a chat backend that provides a type-erased interface
/// for the widget.
#[derive(Clone)]
pub struct BackendClient {
    history_fn: HistoryFn,
    send_fn: SendFn,
}

impl BackendClient {
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        // The widget state has no generic parameter, so `B` is erased
        // here, once.
        let backend = Arc::new(backend);
        let history_fn: HistoryFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move |credential| {
                let fut = backend.fetch_history(&credential);
                Box::pin(
                    async move {
                        trace!("fetching history");
                        fut.await.map_err(boxed)
                    }
                    .instrument(trace_span!("backend history")),
                )
            })
        };
        let send_fn: SendFn = Arc::new(move |req, credential| {
            let fut = backend.send_message(&req, credential.as_ref());
            Box::pin(
                async move {
                    trace!("sending: {req:?}");
                    fut.await.map_err(boxed)
                }
                .instrument(trace_span!("backend send")),
            )
        });
        Self {
            history_fn,
            send_fn,
        }
    }

    /// Fetches the stored conversation.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future drops the request.
    #[inline]
    pub async fn fetch_history(
        &self,
        credential: Credential,
    ) -> Result<HistoryResponse, BoxedBackendError> {
        (self.history_fn)(credential).await
    }

    /// Sends a message and waits for the reply.
    #[inline]
    pub async fn send_message(
        &self,
        req: ChatRequest,
        credential: Option<Credential>,
    ) -> Result<ChatResponse, BoxedBackendError> {
        (self.send_fn)(req, credential).await
    }
}
