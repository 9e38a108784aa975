//=========================================================================
// Message Bus
//=========================================================================
//
// Typed event queues between the session's subsystems.
//
// Architecture:
//   Adapters → push<M>() → HashMap<TypeId, Vec<M>>
//                              ↓
//   Orchestrator ← drain<M>() (in arrival order, once per tick)
//
// Pattern: push → drain → handle → (handlers may push more) → repeat
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::message_queue::MessageQueue;

//=== Public API ==========================================================

/// Marker trait for types that can be sent through the MessageBus.
///
/// Automatically implemented for all types that are Send + 'static.
pub trait Message: Send + 'static {}

impl<T: Send + 'static> Message for T {}

//=========================================================================

/// Per-type event queues drained by the orchestrator each tick.
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    pub fn new() -> Self {
        MessageBus {
            queues: HashMap::new(),
        }
    }

    //--- Message Operations -----------------------------------------------

    /// Pushes a message into the queue for its type.
    pub fn push<M: Message>(&mut self, msg: M) {
        if let Some(queue) = self.queue_mut::<M>(true) {
            queue.push(msg);
        }
    }

    /// Returns a slice of all messages of type M currently queued.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<M>>())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Removes and returns all messages of type M in arrival order.
    ///
    /// The queue keeps its allocation for the next tick.
    pub fn drain<M: Message>(&mut self) -> Vec<M> {
        match self.queue_mut::<M>(false) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    //--- Query API --------------------------------------------------------

    /// Returns true if there are any messages of type M queued.
    pub fn has_messages<M: Message>(&self) -> bool {
        self.count::<M>() > 0
    }

    /// Returns the number of messages of type M currently queued.
    pub fn count<M: Message>(&self) -> usize {
        self.queues
            .get(&TypeId::of::<M>())
            .map(|q| q.len())
            .unwrap_or(0)
    }

    /// Clears all messages of type M, preserving allocated capacity.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queues.get_mut(&TypeId::of::<M>()) {
            queue.clear_queue();
        }
    }

    /// Clears all queues for all message types, preserving capacity.
    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn queue_mut<M: Message>(&mut self, create: bool) -> Option<&mut Vec<M>> {
        let type_id = TypeId::of::<M>();

        if create {
            self.queues
                .entry(type_id)
                .or_insert_with(|| Box::new(Vec::<M>::new()));
        }

        self.queues
            .get_mut(&type_id)
            .and_then(|q| q.as_any_mut().downcast_mut::<Vec<M>>())
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
