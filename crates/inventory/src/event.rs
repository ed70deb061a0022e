use serde::{Deserialize, Serialize};

use vendnet_core::MachineId;
use vendnet_events::Event;

/// Routing key for vending events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Sale,
    Refill,
    LowStock,
    StockOk,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Sale,
        EventKind::Refill,
        EventKind::LowStock,
        EventKind::StockOk,
    ];
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            EventKind::Sale => "SALE",
            EventKind::Refill => "REFILL",
            EventKind::LowStock => "LOW_STOCK",
            EventKind::StockOk => "STOCK_OK",
        })
    }
}

/// Event: Sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub machine_id: MachineId,
    pub sold_quantity: u32,
}

/// Event: Refill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refill {
    pub machine_id: MachineId,
    pub refill_quantity: u32,
}

/// Derived event: stock dropped below the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockWarning {
    pub machine_id: MachineId,
}

/// Derived event: stock climbed back to the threshold or above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOk {
    pub machine_id: MachineId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendingEvent {
    Sale(Sale),
    Refill(Refill),
    LowStockWarning(LowStockWarning),
    StockOk(StockOk),
}

impl VendingEvent {
    pub fn sale(machine_id: MachineId, sold_quantity: u32) -> Self {
        VendingEvent::Sale(Sale {
            machine_id,
            sold_quantity,
        })
    }

    pub fn refill(machine_id: MachineId, refill_quantity: u32) -> Self {
        VendingEvent::Refill(Refill {
            machine_id,
            refill_quantity,
        })
    }

    pub fn low_stock(machine_id: MachineId) -> Self {
        VendingEvent::LowStockWarning(LowStockWarning { machine_id })
    }

    pub fn stock_ok(machine_id: MachineId) -> Self {
        VendingEvent::StockOk(StockOk { machine_id })
    }

    pub fn machine_id(&self) -> &MachineId {
        match self {
            VendingEvent::Sale(e) => &e.machine_id,
            VendingEvent::Refill(e) => &e.machine_id,
            VendingEvent::LowStockWarning(e) => &e.machine_id,
            VendingEvent::StockOk(e) => &e.machine_id,
        }
    }
}

impl Event for VendingEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            VendingEvent::Sale(_) => EventKind::Sale,
            VendingEvent::Refill(_) => EventKind::Refill,
            VendingEvent::LowStockWarning(_) => EventKind::LowStock,
            VendingEvent::StockOk(_) => EventKind::StockOk,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            VendingEvent::Sale(_) => "vending.sale",
            VendingEvent::Refill(_) => "vending.refill",
            VendingEvent::LowStockWarning(_) => "vending.low_stock",
            VendingEvent::StockOk(_) => "vending.stock_ok",
        }
    }
}
