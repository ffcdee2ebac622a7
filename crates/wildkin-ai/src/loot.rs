//! Loot resolution on agent death.
//!
//! Drops are lossy by design: no drop configured, no killer to attribute, or
//! a full inventory all end the same way: quietly, with nothing delivered.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wildkin_common::ItemTypeId;

use crate::world::InventoryHolder;

/// What a creature drops on death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTable {
    /// Item to deliver.
    pub item: ItemTypeId,
    /// Minimum quantity (inclusive).
    pub min_amount: u32,
    /// Maximum quantity (inclusive).
    pub max_amount: u32,
}

impl DropTable {
    /// Creates a drop table with an inclusive quantity range.
    #[must_use]
    pub const fn new(item: ItemTypeId, min_amount: u32, max_amount: u32) -> Self {
        Self {
            item,
            min_amount,
            max_amount,
        }
    }

    /// Draws a quantity uniformly from `[min_amount, max_amount]`.
    ///
    /// A degenerate range (min >= max) yields `min_amount`, which makes the
    /// draw deterministic when both bounds agree.
    #[must_use]
    pub fn roll(&self, rng: &mut fastrand::Rng) -> u32 {
        if self.min_amount >= self.max_amount {
            return self.min_amount;
        }
        rng.u32(self.min_amount..=self.max_amount)
    }
}

/// Computes and delivers the randomized drop when an agent dies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LootResolver;

impl LootResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolves a death: rolls the drop quantity and offers it to the
    /// killer's inventory.
    ///
    /// Returns what was actually delivered, or `None` when no drop is
    /// configured, no recipient exists, or the inventory refused the items.
    /// Refusal discards the drop; there is no retry and no partial delivery.
    pub fn resolve_death<R: InventoryHolder + ?Sized>(
        &self,
        rng: &mut fastrand::Rng,
        drop: Option<&DropTable>,
        recipient: Option<&mut R>,
    ) -> Option<(ItemTypeId, u32)> {
        let drop = drop?;
        let recipient = recipient?;

        let amount = drop.roll(rng);
        if recipient.add_item(drop.item, amount) {
            debug!(item = drop.item.raw(), amount, "loot delivered");
            Some((drop.item, amount))
        } else {
            debug!(item = drop.item.raw(), amount, "loot discarded, inventory refused");
            None
        }
    }
}
