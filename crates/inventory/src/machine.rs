use serde::{Deserialize, Serialize};

use vendnet_core::{Entity, MachineId};

/// A vending machine and its current stock level.
///
/// Stock is unsigned, so a negative level is unrepresentable. Outside this
/// crate the level is read-only; it only changes through sale/refill handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    id: MachineId,
    stock_level: u32,
}

impl Machine {
    pub fn new(id: MachineId, stock_level: u32) -> Self {
        Self { id, stock_level }
    }

    pub fn stock_level(&self) -> u32 {
        self.stock_level
    }

    pub(crate) fn set_stock_level(&mut self, stock_level: u32) {
        self.stock_level = stock_level;
    }
}

impl Entity for Machine {
    type Id = MachineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
