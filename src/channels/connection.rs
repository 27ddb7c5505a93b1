use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// An outbound frame queued towards one socket. Chat travels as text,
/// entity-state packs and world-update notifications as binary.
#[derive(Debug, Clone)]
pub enum Frame {
    Text(Arc<str>),
    Binary(bytes::Bytes),
}

/// Monotonic serial distinguishing connection instances that share a table
/// key across reconnects.
fn next_serial() -> u64 {
    static SERIAL: AtomicU64 = AtomicU64::new(1);
    SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// A live socket handle: an outbound frame queue plus a cancellation token
/// that tears the socket task down. Owned exclusively by the registry slot
/// holding it; closing the slot closes the underlying socket.
#[derive(Debug, Clone)]
pub struct Connection {
    serial: u64,
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
}

impl Connection {
    #[must_use]
    pub fn new(tx: mpsc::Sender<Frame>, cancel: CancellationToken) -> Self {
        Self {
            serial: next_serial(),
            tx,
            cancel,
        }
    }

    /// Identity of this connection instance, stable across clones.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Queue a frame, fire-and-forget. A full or closed queue drops the
    /// frame; the socket task notices closure through its own channel end.
    pub fn send(&self, frame: Frame) {
        if let Err(err) = self.tx.try_send(frame) {
            tracing::debug!(serial = self.serial, error = %err, "Dropping outbound frame");
        }
    }

    /// Request teardown of the socket task. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
