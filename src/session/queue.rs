//! Fixed-capacity message queues.
//!
//! Queues are tiny (tens of entries), so lookups are linear scans.

use crate::error::QueueError;

use super::message::{Message, ProcState};

/// Maximum messages held per direction.
pub const QUEUE_DEPTH: usize = 16;

/// Ordered collection of messages with unique ids.
#[derive(Debug, Default)]
pub struct MessageQueue {
    items: heapless::Vec<Message, QUEUE_DEPTH>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Rejects a full queue or an id already present.
    pub fn insert(&mut self, msg: Message) -> Result<(), QueueError> {
        if self.contains(msg.id()) {
            return Err(QueueError::DuplicateId(msg.id()));
        }
        self.items.push(msg).map_err(|_| QueueError::Full)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.items.iter().any(|m| m.id() == id)
    }

    pub fn get(&self, id: u16) -> Option<&Message> {
        self.items.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: u16) -> Option<&mut Message> {
        self.items.iter_mut().find(|m| m.id() == id)
    }

    /// Remove and return the message with `id`, keeping order.
    pub fn remove(&mut self, id: u16) -> Option<Message> {
        let idx = self.items.iter().position(|m| m.id() == id)?;
        Some(self.items.remove(idx))
    }

    /// Remove every message in `state`. Returns how many were removed.
    pub fn remove_in_state(&mut self, state: ProcState) -> usize {
        let before = self.items.len();
        self.items.retain(|m| m.state() != state);
        before - self.items.len()
    }

    /// Drop everything. Returns how many messages were discarded.
    pub fn purge(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Message> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    #[test]
    fn duplicate_ids_rejected() {
        let mut q = MessageQueue::new();
        q.insert(Message::outbound(1, Event::KeepAlive)).unwrap();
        assert_eq!(
            q.insert(Message::outbound(1, Event::Sync)),
            Err(QueueError::DuplicateId(1))
        );
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn capacity_enforced() {
        let mut q = MessageQueue::new();
        for id in 0..QUEUE_DEPTH as u16 {
            q.insert(Message::outbound(id + 1, Event::Sync)).unwrap();
        }
        assert!(q.is_full());
        assert_eq!(
            q.insert(Message::outbound(999, Event::Sync)),
            Err(QueueError::Full)
        );
    }

    #[test]
    fn remove_keeps_order() {
        let mut q = MessageQueue::new();
        for id in [3, 1, 2] {
            q.insert(Message::outbound(id, Event::Sync)).unwrap();
        }
        assert_eq!(q.remove(1).map(|m| m.id()), Some(1));
        assert!(q.remove(1).is_none());
        let ids: Vec<u16> = q.iter().map(Message::id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn remove_in_state_is_selective() {
        let mut q = MessageQueue::new();
        for id in 1..=3 {
            q.insert(Message::outbound(id, Event::Sync)).unwrap();
        }
        q.get_mut(2).unwrap().force_state(ProcState::AwaitingReap);
        assert_eq!(q.remove_in_state(ProcState::AwaitingReap), 1);
        assert_eq!(q.len(), 2);
        assert!(!q.contains(2));
    }

    #[test]
    fn purge_reports_count() {
        let mut q = MessageQueue::new();
        for id in 1..=3 {
            q.insert(Message::outbound(id, Event::Sync)).unwrap();
        }
        assert_eq!(q.purge(), 3);
        assert!(q.is_empty());
        assert_eq!(q.purge(), 0);
    }
}
