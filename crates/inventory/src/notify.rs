//! Side-effect-only observers of derived stock events.

use std::sync::Arc;

use vendnet_core::DomainResult;
use vendnet_events::{Dispatcher, Subscriber};
use vendnet_observability::NotificationSink;

use crate::VendingEvent;

/// Reports `LOW_STOCK` on the sink's info channel.
pub struct LowStockNotifier {
    sink: Arc<dyn NotificationSink>,
}

impl LowStockNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

impl Subscriber<VendingEvent> for LowStockNotifier {
    fn handle(&self, event: &VendingEvent, _: &Dispatcher<VendingEvent>) -> DomainResult<()> {
        if let VendingEvent::LowStockWarning(e) = event {
            self.sink
                .info(&format!("Low stock warning: machine {} is running low", e.machine_id));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "low-stock-notifier"
    }
}

/// Reports `STOCK_OK` on the sink's info channel.
pub struct StockOkNotifier {
    sink: Arc<dyn NotificationSink>,
}

impl StockOkNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

impl Subscriber<VendingEvent> for StockOkNotifier {
    fn handle(&self, event: &VendingEvent, _: &Dispatcher<VendingEvent>) -> DomainResult<()> {
        if let VendingEvent::StockOk(e) = event {
            self.sink
                .info(&format!("Stock OK: machine {} is back above threshold", e.machine_id));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stock-ok-notifier"
    }
}
