//! Token sink handed to a streaming chat provider.
//!
//! A provider pushes token fragments with [`TokenSink::send_token`] and may
//! close the stream with [`TokenSink::complete`] or [`TokenSink::fail`].
//! Only the first terminal call reaches the receiver; later ones are no-ops.
//! When the receiving side is gone, `send_token` returns
//! [`ProviderError::Cancelled`] so the provider can stop generating.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use omnigate_core::types::StreamEvent;
use omnigate_core::ProviderError;

/// Sending half of one chat stream. Cheap to clone.
#[derive(Clone, Debug)]
pub struct TokenSink {
    tx: mpsc::Sender<StreamEvent>,
    terminated: Arc<AtomicBool>,
}

impl TokenSink {
    /// Create a sink and the receiver its events arrive on.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            Self {
                tx,
                terminated: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Forward one token fragment.
    pub async fn send_token(&self, token: impl Into<String>) -> Result<(), ProviderError> {
        if self.is_terminated() {
            return Err(ProviderError::Cancelled);
        }
        self.tx
            .send(StreamEvent::Token(token.into()))
            .await
            .map_err(|_| ProviderError::Cancelled)
    }

    /// Signal successful completion. Returns `true` if this call ended the stream.
    pub async fn complete(&self) -> bool {
        self.terminate(StreamEvent::Completed).await
    }

    /// Signal failure. Returns `true` if this call ended the stream.
    pub async fn fail(&self, message: impl Into<String>) -> bool {
        self.terminate(StreamEvent::Failed(message.into())).await
    }

    /// Whether a terminal event has already been emitted.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Whether the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn terminate(&self, event: StreamEvent) -> bool {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return false;
        }
        // A gone receiver needs no terminal event.
        let _ = self.tx.send(event).await;
        true
    }
}
