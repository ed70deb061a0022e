//! Fleet wiring: one dispatcher, one repository, the four stock subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use vendnet_core::{DomainResult, MachineId};
use vendnet_events::{DispatchError, SharedSubscriber};
use vendnet_observability::NotificationSink;

use crate::{
    EventKind, LowStockNotifier, Machine, MachineRepository, RefillHandler, SaleHandler,
    StockConfig, StockKeeper, StockOkNotifier, VendingDispatcher, VendingEvent,
};

/// Handles of the subscribers a [`Fleet`] registered.
///
/// Keep these to unsubscribe (or re-subscribe) individual handlers later.
#[derive(Clone)]
pub struct StockSubscriptions {
    pub sale: SharedSubscriber<VendingEvent>,
    pub refill: SharedSubscriber<VendingEvent>,
    pub low_stock: SharedSubscriber<VendingEvent>,
    pub stock_ok: SharedSubscriber<VendingEvent>,
}

impl StockSubscriptions {
    fn entries(&self) -> [(EventKind, &SharedSubscriber<VendingEvent>); 4] {
        [
            (EventKind::Sale, &self.sale),
            (EventKind::Refill, &self.refill),
            (EventKind::LowStock, &self.low_stock),
            (EventKind::StockOk, &self.stock_ok),
        ]
    }

    pub fn attach(&self, dispatcher: &VendingDispatcher) {
        for (kind, subscriber) in self.entries() {
            dispatcher.subscribe(kind, subscriber.clone());
        }
    }

    pub fn detach(&self, dispatcher: &VendingDispatcher) {
        for (kind, subscriber) in self.entries() {
            dispatcher.unsubscribe(kind, subscriber);
        }
    }
}

/// A fleet of vending machines sharing one dispatcher.
pub struct Fleet<R> {
    dispatcher: Arc<VendingDispatcher>,
    keeper: Arc<StockKeeper<R>>,
    subscriptions: StockSubscriptions,
    holds_global: AtomicBool,
}

impl<R> Fleet<R>
where
    R: MachineRepository + 'static,
{
    fn wire(
        dispatcher: Arc<VendingDispatcher>,
        holds_global: bool,
        repo: R,
        config: StockConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let keeper = Arc::new(StockKeeper::new(repo, config, sink.clone()));
        let subscriptions = StockSubscriptions {
            sale: Arc::new(SaleHandler::new(keeper.clone())),
            refill: Arc::new(RefillHandler::new(keeper.clone())),
            low_stock: Arc::new(LowStockNotifier::new(sink.clone())),
            stock_ok: Arc::new(StockOkNotifier::new(sink)),
        };
        subscriptions.attach(&dispatcher);
        tracing::debug!(?config, "fleet wired");

        Self {
            dispatcher,
            keeper,
            subscriptions,
            holds_global: AtomicBool::new(holds_global),
        }
    }

    /// Wire into a fresh dispatcher that nothing else shares.
    pub fn isolated(repo: R, config: StockConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self::wire(Arc::new(VendingDispatcher::new()), false, repo, config, sink)
    }

    /// Wire into the process-wide dispatcher.
    ///
    /// Only one fleet may be attached there at a time; a second call fails with
    /// `DomainError::Conflict` until the first fleet is detached.
    pub fn global(
        repo: R,
        config: StockConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> DomainResult<Self> {
        let dispatcher = crate::dispatch::claim_global()?;
        Ok(Self::wire(dispatcher, true, repo, config, sink))
    }

    pub fn dispatcher(&self) -> &Arc<VendingDispatcher> {
        &self.dispatcher
    }

    pub fn subscriptions(&self) -> &StockSubscriptions {
        &self.subscriptions
    }

    /// Add a machine with the configured initial stock.
    pub fn provision(&self, machine_id: MachineId) -> DomainResult<Machine> {
        self.keeper.provision(machine_id)
    }

    /// Publish a `SALE` event.
    pub fn sell(&self, machine_id: &MachineId, quantity: u32) -> Result<(), DispatchError> {
        self.dispatcher
            .publish(VendingEvent::sale(machine_id.clone(), quantity))
    }

    /// Publish a `REFILL` event.
    pub fn refill(&self, machine_id: &MachineId, quantity: u32) -> Result<(), DispatchError> {
        self.dispatcher
            .publish(VendingEvent::refill(machine_id.clone(), quantity))
    }

    pub fn stock_level(&self, machine_id: &MachineId) -> Option<u32> {
        self.keeper.stock_level(machine_id)
    }

    pub fn machines(&self) -> Vec<Machine> {
        self.keeper.machines()
    }

    /// Unregister this fleet's subscribers from its dispatcher.
    ///
    /// A global fleet also gives up its claim, so another one can attach.
    pub fn detach(&self) {
        self.subscriptions.detach(&self.dispatcher);
        if self.holds_global.swap(false, Ordering::AcqRel) {
            crate::dispatch::release_global();
        }
    }
}
