//! Discrete control events queued between ticks.

use heapless::Deque;
use rc_proto::{Action, Options};

/// Number of events that can wait for the next tick.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// A discrete trigger from an action source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// Run the toggle-confirm handshake for an action.
    Action(Action),
    /// Request option toggles on the next frame.
    ToggleOption(Options),
}

/// The queue was full and the event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

impl core::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "event queue full")
    }
}

/// FIFO of pending events, drained once per tick.
#[derive(Default)]
pub struct EventQueue {
    inner: Deque<ControlEvent, EVENT_QUEUE_DEPTH>,
}

impl EventQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Deque::new(),
        }
    }

    /// Append an event.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] when [`EVENT_QUEUE_DEPTH`] events are already waiting.
    pub fn push(&mut self, event: ControlEvent) -> Result<(), QueueFull> {
        self.inner.push_back(event).map_err(|_| {
            warn!("event queue full, dropping {:?}", event);
            QueueFull
        })
    }

    /// Take the oldest event.
    pub fn pop(&mut self) -> Option<ControlEvent> {
        self.inner.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.push(ControlEvent::Action(Action::Stop)).unwrap();
        queue
            .push(ControlEvent::ToggleOption(Options::LIGHTS))
            .unwrap();
        queue.push(ControlEvent::Action(Action::Recenter)).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(ControlEvent::Action(Action::Stop)));
        assert_eq!(
            queue.pop(),
            Some(ControlEvent::ToggleOption(Options::LIGHTS))
        );
        assert_eq!(queue.pop(), Some(ControlEvent::Action(Action::Recenter)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_full_queue_rejects() {
        let mut queue = EventQueue::new();
        for _ in 0..EVENT_QUEUE_DEPTH {
            queue.push(ControlEvent::Action(Action::Stop)).unwrap();
        }
        assert_eq!(
            queue.push(ControlEvent::Action(Action::Recenter)),
            Err(QueueFull)
        );
        assert_eq!(queue.len(), EVENT_QUEUE_DEPTH);
        assert!(queue.is_full());

        queue.pop();
        assert!(!queue.is_full());
    }
}
