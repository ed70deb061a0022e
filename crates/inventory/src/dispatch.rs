//! Vending dispatcher and its process-wide instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use vendnet_core::{DomainError, DomainResult};
use vendnet_events::Dispatcher;

use crate::VendingEvent;

pub type VendingDispatcher = Dispatcher<VendingEvent>;

static GLOBAL: OnceLock<Arc<VendingDispatcher>> = OnceLock::new();

/// Set while a fleet's stock handlers are attached to the global dispatcher.
static GLOBAL_WIRED: AtomicBool = AtomicBool::new(false);

/// The process-wide dispatcher, created on first access.
///
/// Lives for the rest of the process. Use [`Dispatcher::new`] instead when an
/// isolated registry is wanted (tests, embedded sessions).
pub fn global() -> Arc<VendingDispatcher> {
    GLOBAL
        .get_or_init(|| Arc::new(VendingDispatcher::new()))
        .clone()
}

/// Reserve the global dispatcher for one fleet's stock handlers.
///
/// Two sets of sale/refill handlers over different repositories would each
/// see the other's machines as missing.
pub(crate) fn claim_global() -> DomainResult<Arc<VendingDispatcher>> {
    GLOBAL_WIRED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map_err(|_| DomainError::conflict("global dispatcher already has a fleet attached"))?;
    Ok(global())
}

pub(crate) fn release_global() {
    GLOBAL_WIRED.store(false, Ordering::Release);
}
