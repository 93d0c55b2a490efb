//! # Change Sinks
//!
//! The write-only broadcast capability the economy reports through.
//!
//! The sink is injected at construction; nothing in this crate reaches for a
//! global emitter. Emission happens after the mutation it describes has fully
//! applied, and a sink can never fail the operation that fed it.

use covey_shared::ChangeEvent;
use crossbeam_channel::Sender;
use parking_lot::Mutex;

/// Receives every change other clients must observe.
///
/// The economy calls `emit` with none of its locks held, so an
/// implementation may read back into the economy that fed it.
pub trait ChangeSink: Send + Sync {
    /// Publishes one event.
    fn emit(&self, event: ChangeEvent);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn emit(&self, _event: ChangeEvent) {}
}

/// Buffers events until the transport drains them.
#[derive(Debug, Default)]
pub struct BufferedSink {
    events: Mutex<Vec<ChangeEvent>>,
}

impl BufferedSink {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.lock().len()
    }
}

impl ChangeSink for BufferedSink {
    fn emit(&self, event: ChangeEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards events to a channel consumer (e.g. the socket task).
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<ChangeEvent>,
}

impl ChannelSink {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub fn new(sender: Sender<ChangeEvent>) -> Self {
        Self { sender }
    }
}

impl ChangeSink for ChannelSink {
    fn emit(&self, event: ChangeEvent) {
        let event_type = event.event_type();
        if self.sender.send(event).is_err() {
            tracing::warn!(?event_type, "change sink receiver disconnected, event dropped");
        }
    }
}
