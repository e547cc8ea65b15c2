//! Player resource stockpile with all-or-nothing deductions.

use std::collections::BTreeMap;

use rampart_core::{ResourceCost, ResourceKind, ResourceLedger, SpendError};

/// Resources held by the local player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stockpile {
    amounts: BTreeMap<ResourceKind, u32>,
}

impl Stockpile {
    /// Adds every amount of `cost`, saturating at `u32::MAX`.
    pub(crate) fn grant(&mut self, cost: &ResourceCost) {
        for (kind, amount) in cost.iter() {
            let entry = self.amounts.entry(kind).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    /// Deducts `cost` atomically: either every amount is removed or nothing is.
    pub(crate) fn spend(&mut self, cost: &ResourceCost) -> Result<(), SpendError> {
        for (kind, requested) in cost.iter() {
            let available = self.resource(kind);
            if available < requested {
                return Err(SpendError {
                    kind,
                    requested,
                    available,
                });
            }
        }

        for (kind, requested) in cost.iter() {
            if let Some(entry) = self.amounts.get_mut(&kind) {
                *entry -= requested;
            }
        }
        Ok(())
    }
}

impl ResourceLedger for Stockpile {
    fn can_afford(&self, cost: &ResourceCost) -> bool {
        cost.iter()
            .all(|(kind, requested)| self.resource(kind) >= requested)
    }

    fn resource(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }
}
