//! Listener-side signal queue
//!
//! The reference [`ListenerContext`]: signals are pushed from the simulation
//! thread and drained by the script side. A full queue drops the event rather
//! than stall the simulation.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::SignalEvent;
use crate::listeners::{ListenerContext, ListenerId};

/// Bounded queue of pending signals for one listener
pub struct SignalQueue {
    id: ListenerId,
    capacity: usize,
    sender: Sender<SignalEvent>,
    receiver: Receiver<SignalEvent>,
}

impl SignalQueue {
    /// Create a queue holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            id: ListenerId::next(),
            capacity,
            sender,
            receiver,
        }
    }

    /// Take the oldest pending event
    pub fn pop(&self) -> Option<SignalEvent> {
        self.receiver.try_recv().ok()
    }

    /// Take every pending event, up to the queue capacity
    pub fn drain(&self) -> Vec<SignalEvent> {
        self.receiver.try_iter().take(self.capacity).collect()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl ListenerContext for SignalQueue {
    fn id(&self) -> ListenerId {
        self.id
    }

    fn enqueue(&self, event: SignalEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    "Signal queue of {} full, dropping {}",
                    self.id,
                    event.name()
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Signal queue of {} disconnected", self.id);
                false
            }
        }
    }
}

impl std::fmt::Debug for SignalQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalQueue")
            .field("id", &self.id)
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
