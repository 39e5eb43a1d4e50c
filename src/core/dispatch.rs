use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::ChatBackend;
use crate::core::widget::{perform, Completion, Request};

/// Runs requests on background tasks and reports each outcome on a channel.
///
/// A new session start cancels the one still pending, so at most one start
/// reply ever reaches the receiver per supersede chain.
pub struct RequestDispatcher {
    tx: mpsc::UnboundedSender<Completion>,
    backend: Arc<dyn ChatBackend>,
    pending_start: Option<CancellationToken>,
}

impl RequestDispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                backend,
                pending_start: None,
            },
            rx,
        )
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub fn spawn(&mut self, request: Request) {
        let cancel_token = if request.is_start_session() {
            if let Some(previous) = self.pending_start.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            self.pending_start = Some(token.clone());
            token
        } else {
            CancellationToken::new()
        };

        let tx = self.tx.clone();
        let backend = Arc::clone(&self.backend);
        let id = request.id();
        tokio::spawn(async move {
            tokio::select! {
                completion = perform(backend.as_ref(), request) => {
                    let _ = tx.send(completion);
                }
                _ = cancel_token.cancelled() => {
                    debug!(request = %id, "request cancelled");
                }
            }
        });
    }

    /// Cancel the pending session start, if any.
    pub fn cancel_start(&mut self) {
        if let Some(token) = self.pending_start.take() {
            token.cancel();
        }
    }
}

impl Drop for RequestDispatcher {
    fn drop(&mut self) {
        self.cancel_start();
    }
}
