#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! Batch event bus for vidcut.
//!
//! The bus provides a typed event enum, sequential identifiers, and replay of
//! recent events for late subscribers. Internally it uses `tokio::broadcast`
//! with a bounded buffer; when the channel overflows, the oldest events are
//! dropped.

mod payloads;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};

pub use payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel uses the same capacity as the replay buffer.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event to the bus, assigning it a sequential identifier.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        // No live subscribers is fine; the replay ring still holds the event.
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying any buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        if let Some(since) = since_id {
            let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            backlog.extend(buffer.iter().filter(|item| item.id > since).cloned());
        }

        let receiver = self.sender.subscribe();
        EventStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.back().map(|event| event.id)
    }

    /// Copy of the buffered events, oldest first.
    #[must_use]
    pub fn backlog(&self) -> Vec<EventEnvelope> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.iter().cloned().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from the
/// live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    fn sample_event(index: usize) -> Event {
        Event::FileStarted {
            batch_id: Uuid::nil(),
            index,
            path: format!("/videos/{index}.mp4"),
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);

        let mut last_id = 0;
        for i in 0..5 {
            last_id = bus.publish(sample_event(i));
        }
        assert_eq!(last_id, 5);
        assert_eq!(bus.last_event_id(), Some(5));

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event.id);
            }
        }
        assert_eq!(received, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn live_subscribers_receive_new_events() {
        let bus = EventBus::with_capacity(4);
        let mut stream = bus.subscribe(None);
        let _ = bus.publish(Event::SelectionReset);

        let received = timeout(Duration::from_secs(1), stream.next()).await;
        let envelope = received.ok().flatten().map(|envelope| envelope.event);
        assert_eq!(envelope, Some(Event::SelectionReset));
    }

    #[test]
    fn replay_ring_drops_oldest_events() {
        let bus = EventBus::with_capacity(2);
        for i in 0..3 {
            let _ = bus.publish(sample_event(i));
        }
        let ids: Vec<EventId> = bus.backlog().iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
