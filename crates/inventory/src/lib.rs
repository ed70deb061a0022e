//! Vending fleet stock module.
//!
//! Sales and refills arrive as events on a [`VendingDispatcher`]. The stock
//! handlers mutate machines through a [`MachineRepository`] and, when a machine
//! crosses the low-stock threshold, publish a derived [`VendingEvent`] back into
//! the same dispatcher before the original `publish` returns.

pub mod config;
pub mod dispatch;
pub mod event;
pub mod fleet;
pub mod machine;
pub mod notify;
pub mod repository;
pub mod stock;

pub use config::{MissingMachinePolicy, StockConfig};
pub use dispatch::VendingDispatcher;
pub use event::{EventKind, LowStockWarning, Refill, Sale, StockOk, VendingEvent};
pub use fleet::{Fleet, StockSubscriptions};
pub use machine::Machine;
pub use notify::{LowStockNotifier, StockOkNotifier};
pub use repository::{InMemoryMachineRepository, MachineRepository, RepositoryError};
pub use stock::{
    RefillHandler, SaleHandler, StockChange, StockKeeper, ThresholdSignal, Transition,
    TransitionError, evaluate,
};
