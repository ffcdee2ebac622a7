//! Event bus for creature lifecycle notifications.
//!
//! Consumers (UI, audio, quest triggers) drain the bus once per frame; the
//! behavior core only publishes. Publishing never blocks: when the channel
//! is full the event is dropped, which is acceptable for presentation-level
//! signals.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use wildkin_common::{EntityId, ItemTypeId};

use crate::agent::AgentState;

/// Notifications emitted by the creature core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// An agent was added to the world.
    Spawned {
        /// Agent entity ID
        entity_id: EntityId,
    },
    /// An agent changed behavior state.
    StateChanged {
        /// Agent entity ID
        entity_id: EntityId,
        /// State before the transition
        from: AgentState,
        /// State after the transition
        to: AgentState,
    },
    /// An agent took damage.
    Damaged {
        /// Agent entity ID
        entity_id: EntityId,
        /// Damage amount
        amount: f32,
        /// Source entity (if any)
        source: Option<EntityId>,
    },
    /// A Neutral agent turned Aggressive after being attacked.
    Provoked {
        /// Agent entity ID
        entity_id: EntityId,
    },
    /// An agent's attack connected with its target.
    AttackLanded {
        /// Attacking agent
        attacker: EntityId,
        /// Target entity
        target: EntityId,
        /// Damage applied
        damage: f32,
    },
    /// An agent died.
    Died {
        /// Agent entity ID
        entity_id: EntityId,
    },
    /// A death drop was delivered to the killer's inventory.
    LootDropped {
        /// The dead agent
        source: EntityId,
        /// Receiving entity
        recipient: EntityId,
        /// Item delivered
        item: ItemTypeId,
        /// Quantity delivered
        amount: u32,
    },
    /// An agent's corpse was removed from the world.
    Despawned {
        /// Agent entity ID
        entity_id: EntityId,
    },
}

/// Bounded broadcast channel for [`AgentEvent`]s.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<AgentEvent>,
    receiver: Receiver<AgentEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: AgentEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<AgentEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        let id = EntityId::new();

        bus.publish(AgentEvent::Spawned { entity_id: id });
        bus.publish(AgentEvent::Died { entity_id: id });

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);
        let id = EntityId::new();

        bus.publish(AgentEvent::Spawned { entity_id: id });
        bus.publish(AgentEvent::Died { entity_id: id });

        assert_eq!(bus.drain().len(), 1);
    }
}
