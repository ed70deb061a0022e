//! Stock state machine.
//!
//! [`evaluate`] is the pure transition: given the current level, a change and
//! the threshold, it either yields the new level (plus a threshold signal) or
//! rejects the change. Nothing is mutated until a transition has been accepted,
//! so there is never anything to roll back.
//!
//! [`StockKeeper`] applies accepted transitions to the repository, and the
//! [`SaleHandler`] / [`RefillHandler`] subscribers publish the derived event
//! re-entrantly once the commit is done.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use vendnet_core::{DomainError, DomainResult, Entity, MachineId};
use vendnet_events::{Dispatcher, Subscriber};
use vendnet_observability::NotificationSink;

use crate::{Machine, MachineRepository, MissingMachinePolicy, StockConfig, VendingEvent};

/// A requested stock change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockChange {
    Sale(u32),
    Refill(u32),
}

/// Threshold crossing detected by a transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ThresholdSignal {
    /// Level after a sale is below the threshold.
    Low,
    /// A refill lifted the level from below the threshold to at/above it.
    Restored,
}

impl ThresholdSignal {
    pub fn into_event(self, machine_id: MachineId) -> VendingEvent {
        match self {
            ThresholdSignal::Low => VendingEvent::low_stock(machine_id),
            ThresholdSignal::Restored => VendingEvent::stock_ok(machine_id),
        }
    }
}

/// An accepted stock transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub before: u32,
    pub after: u32,
    pub signal: Option<ThresholdSignal>,
}

/// A rejected stock transition. State stays at `level`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Stock level cannot be negative")]
    NegativeStock { level: u32, requested: u32 },

    #[error("Stock level cannot exceed {}", u32::MAX)]
    Overflow { level: u32, requested: u32 },
}

impl TransitionError {
    /// Level the machine keeps after the rejection.
    pub fn level(&self) -> u32 {
        match self {
            TransitionError::NegativeStock { level, .. }
            | TransitionError::Overflow { level, .. } => *level,
        }
    }
}

/// Compute the outcome of applying `change` to a machine at level `before`.
///
/// - Sales below zero are rejected whole (no partial decrement).
/// - Any accepted sale leaving the level below `threshold` signals [`ThresholdSignal::Low`].
/// - A refill signals [`ThresholdSignal::Restored`] only when it crosses the
///   threshold upwards.
pub fn evaluate(
    before: u32,
    change: StockChange,
    threshold: u32,
) -> Result<Transition, TransitionError> {
    match change {
        StockChange::Sale(quantity) => {
            let after = before
                .checked_sub(quantity)
                .ok_or(TransitionError::NegativeStock {
                    level: before,
                    requested: quantity,
                })?;
            Ok(Transition {
                before,
                after,
                signal: (after < threshold).then_some(ThresholdSignal::Low),
            })
        }
        StockChange::Refill(quantity) => {
            let after = before
                .checked_add(quantity)
                .ok_or(TransitionError::Overflow {
                    level: before,
                    requested: quantity,
                })?;
            Ok(Transition {
                before,
                after,
                signal: (before < threshold && after >= threshold)
                    .then_some(ThresholdSignal::Restored),
            })
        }
    }
}

/// Applies stock transitions to machines held in a repository.
///
/// Read, evaluate and commit happen under one lock, so concurrent publishers
/// cannot interleave on a machine's level. The lock is released before any
/// derived event is published.
pub struct StockKeeper<R> {
    repo: R,
    config: StockConfig,
    sink: Arc<dyn NotificationSink>,
    transition_lock: Mutex<()>,
}

impl<R> StockKeeper<R>
where
    R: MachineRepository,
{
    pub fn new(repo: R, config: StockConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            repo,
            config,
            sink,
            transition_lock: Mutex::new(()),
        }
    }

    /// Apply `change` to `machine_id` and return the derived event to publish, if any.
    ///
    /// A rejected transition is reported on the sink's error channel and is not
    /// an `Err`: only missing machines (under [`MissingMachinePolicy::Reject`])
    /// and repository failures are.
    pub fn apply(
        &self,
        machine_id: &MachineId,
        change: StockChange,
    ) -> DomainResult<Option<VendingEvent>> {
        let _guard = self.transition_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut machine) = self.repo.find_by_id(machine_id) else {
            return self.missing_machine(machine_id, change);
        };

        let transition = match evaluate(machine.stock_level(), change, self.config.threshold) {
            Ok(t) => t,
            Err(err) => {
                self.sink.error(&err.to_string());
                self.sink.info(&format!(
                    "Rolled back stock level of machine {machine_id} to {}",
                    err.level()
                ));
                tracing::warn!(
                    %machine_id,
                    ?change,
                    level = err.level(),
                    "stock transition rejected"
                );
                return Ok(None);
            }
        };

        machine.set_stock_level(transition.after);
        self.repo.update(machine)?;
        tracing::debug!(
            %machine_id,
            ?change,
            before = transition.before,
            after = transition.after,
            "stock level committed"
        );

        Ok(transition.signal.map(|s| s.into_event(machine_id.clone())))
    }

    fn missing_machine(
        &self,
        machine_id: &MachineId,
        change: StockChange,
    ) -> DomainResult<Option<VendingEvent>> {
        match self.config.missing_machine {
            MissingMachinePolicy::Reject => {
                Err(DomainError::not_found(format!("machine {machine_id}")))
            }
            MissingMachinePolicy::Ignore => {
                tracing::warn!(%machine_id, ?change, "ignoring stock change for unknown machine");
                Ok(None)
            }
        }
    }

    /// Current stock of `machine_id`, if the machine exists.
    pub fn stock_level(&self, machine_id: &MachineId) -> Option<u32> {
        self.repo.find_by_id(machine_id).map(|m| m.stock_level())
    }

    /// Provision a machine stocked with the configured initial level.
    pub fn provision(&self, machine_id: MachineId) -> DomainResult<Machine> {
        let machine = Machine::new(machine_id, self.config.initial_stock);
        self.repo.save(machine.clone())?;
        tracing::info!(
            machine_id = %machine.id(),
            stock_level = machine.stock_level(),
            "machine provisioned"
        );
        Ok(machine)
    }

    pub fn machines(&self) -> Vec<Machine> {
        self.repo.find_all()
    }
}

/// Decreases stock on `SALE`; publishes `LOW_STOCK` when the result is below threshold.
pub struct SaleHandler<R> {
    keeper: Arc<StockKeeper<R>>,
}

impl<R> SaleHandler<R> {
    pub fn new(keeper: Arc<StockKeeper<R>>) -> Self {
        Self { keeper }
    }
}

impl<R> Subscriber<VendingEvent> for SaleHandler<R>
where
    R: MachineRepository,
{
    fn handle(
        &self,
        event: &VendingEvent,
        dispatcher: &Dispatcher<VendingEvent>,
    ) -> DomainResult<()> {
        let VendingEvent::Sale(sale) = event else {
            return Ok(());
        };
        let derived = self
            .keeper
            .apply(&sale.machine_id, StockChange::Sale(sale.sold_quantity))?;
        if let Some(derived) = derived {
            dispatcher.publish(derived)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sale-handler"
    }
}

/// Increases stock on `REFILL`; publishes `STOCK_OK` when the threshold is crossed upwards.
pub struct RefillHandler<R> {
    keeper: Arc<StockKeeper<R>>,
}

impl<R> RefillHandler<R> {
    pub fn new(keeper: Arc<StockKeeper<R>>) -> Self {
        Self { keeper }
    }
}

impl<R> Subscriber<VendingEvent> for RefillHandler<R>
where
    R: MachineRepository,
{
    fn handle(
        &self,
        event: &VendingEvent,
        dispatcher: &Dispatcher<VendingEvent>,
    ) -> DomainResult<()> {
        let VendingEvent::Refill(refill) = event else {
            return Ok(());
        };
        let derived = self
            .keeper
            .apply(&refill.machine_id, StockChange::Refill(refill.refill_quantity))?;
        if let Some(derived) = derived {
            dispatcher.publish(derived)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "refill-handler"
    }
}
