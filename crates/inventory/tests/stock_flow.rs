//! End-to-end stock flows through the dispatcher.
//!
//! Sale/Refill → stock handlers → repository → derived LowStock/StockOk → notifiers.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use vendnet_core::{DomainError, DomainResult, MachineId};
use vendnet_events::{DispatchError, from_fn};
use vendnet_inventory::{
    EventKind, Fleet, InMemoryMachineRepository, MissingMachinePolicy, StockConfig,
    VendingDispatcher, VendingEvent,
};
use vendnet_observability::{Channel, RecordingSink};

const LOW_001: &str = "Low stock warning: machine 001 is running low";
const OK_001: &str = "Stock OK: machine 001 is back above threshold";
const NEGATIVE: &str = "Stock level cannot be negative";

fn id(raw: &str) -> MachineId {
    MachineId::new(raw).unwrap()
}

fn setup(config: StockConfig) -> (Fleet<InMemoryMachineRepository>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let fleet = Fleet::isolated(InMemoryMachineRepository::new(), config, sink.clone());
    fleet.provision(id("001")).unwrap();
    (fleet, sink)
}

fn info(sink: &RecordingSink) -> Vec<String> {
    sink.messages(Channel::Info)
}

fn errors(sink: &RecordingSink) -> Vec<String> {
    sink.messages(Channel::Error)
}

#[test]
fn small_sale_stays_above_threshold() {
    let (fleet, sink) = setup(StockConfig::default());

    fleet.sell(&id("001"), 2).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(8));
    assert!(sink.lines().is_empty());
}

#[test]
fn reference_scenarios_run_in_sequence() {
    let (fleet, sink) = setup(StockConfig::default());
    let m = id("001");
    assert_eq!(fleet.stock_level(&m), Some(10));

    // Sale(8): 10 -> 2, below threshold.
    fleet.sell(&m, 8).unwrap();
    assert_eq!(fleet.stock_level(&m), Some(2));
    assert_eq!(info(&sink), vec![LOW_001.to_string()]);
    sink.clear();

    // Refill(3): 2 -> 5 crosses the threshold.
    fleet.refill(&m, 3).unwrap();
    assert_eq!(fleet.stock_level(&m), Some(5));
    assert_eq!(info(&sink), vec![OK_001.to_string()]);
    sink.clear();

    // Refill(5): 5 -> 10, already healthy.
    fleet.refill(&m, 5).unwrap();
    assert_eq!(fleet.stock_level(&m), Some(10));
    assert!(sink.lines().is_empty());

    // Sale(11) from 10 is rejected whole.
    fleet.sell(&m, 11).unwrap();
    assert_eq!(fleet.stock_level(&m), Some(10));
    assert_eq!(errors(&sink), vec![NEGATIVE.to_string()]);
    assert!(!info(&sink).iter().any(|l| l.starts_with("Low stock")));
    sink.clear();

    // Without the low-stock notifier, Sale(8) drops to 2 silently.
    fleet
        .dispatcher()
        .unsubscribe(EventKind::LowStock, &fleet.subscriptions().low_stock);
    fleet.sell(&m, 8).unwrap();
    assert_eq!(fleet.stock_level(&m), Some(2));
    assert!(sink.lines().is_empty());
}

#[test]
fn sale_that_zeroes_stock_is_accepted_and_warns() {
    let (fleet, sink) = setup(StockConfig::default());

    fleet.sell(&id("001"), 10).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(0));
    assert_eq!(info(&sink), vec![LOW_001.to_string()]);
    assert!(errors(&sink).is_empty());
}

#[test]
fn oversell_emits_one_error_and_no_warning() {
    let (fleet, sink) = setup(StockConfig::default());

    fleet.sell(&id("001"), 11).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(10));
    assert_eq!(errors(&sink), vec![NEGATIVE.to_string()]);
    assert_eq!(
        info(&sink),
        vec!["Rolled back stock level of machine 001 to 10".to_string()]
    );
}

#[test]
fn refill_below_threshold_stays_quiet() {
    let (fleet, sink) = setup(StockConfig::default());
    fleet.sell(&id("001"), 10).unwrap();
    sink.clear();

    fleet.refill(&id("001"), 2).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(2));
    assert!(sink.lines().is_empty());
}

#[test]
fn unsubscribed_low_stock_notifier_stays_silent_until_resubscribed() {
    let (fleet, sink) = setup(StockConfig::default());
    let m = id("001");
    let low_stock = fleet.subscriptions().low_stock.clone();

    fleet.dispatcher().unsubscribe(EventKind::LowStock, &low_stock);
    fleet.sell(&m, 8).unwrap();

    assert_eq!(fleet.stock_level(&m), Some(2));
    assert!(sink.lines().is_empty());

    // Other kinds keep their subscribers.
    fleet.refill(&m, 8).unwrap();
    assert_eq!(info(&sink), vec![OK_001.to_string()]);
    sink.clear();

    fleet.dispatcher().subscribe(EventKind::LowStock, low_stock);
    fleet.sell(&m, 8).unwrap();
    assert_eq!(info(&sink), vec![LOW_001.to_string()]);
}

#[test]
fn derived_event_is_handled_before_outer_publish_continues() {
    let (fleet, _sink) = setup(StockConfig::default());
    let trace: Arc<Mutex<Vec<String>>> = Arc::default();

    let t = trace.clone();
    fleet.dispatcher().subscribe(
        EventKind::LowStock,
        from_fn("trace-low", move |e: &VendingEvent, _: &VendingDispatcher| {
            t.lock().unwrap().push(format!("low:{}", e.machine_id()));
            Ok(())
        }),
    );
    let t = trace.clone();
    fleet.dispatcher().subscribe(
        EventKind::Sale,
        from_fn("trace-sale", move |e: &VendingEvent, _: &VendingDispatcher| {
            t.lock().unwrap().push(format!("sale:{}", e.machine_id()));
            Ok(())
        }),
    );

    fleet.sell(&id("001"), 9).unwrap();

    assert_eq!(*trace.lock().unwrap(), vec!["low:001", "sale:001"]);
}

#[test]
fn publish_without_subscribers_has_no_effect() {
    let (fleet, sink) = setup(StockConfig::default());
    fleet.detach();

    fleet.sell(&id("001"), 9).unwrap();
    fleet.dispatcher().publish(VendingEvent::low_stock(id("001"))).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(10));
    assert!(sink.lines().is_empty());
}

#[test]
fn missing_machine_is_rejected_for_sale_and_refill_alike() {
    let (fleet, sink) = setup(StockConfig::default());

    for result in [fleet.sell(&id("404"), 1), fleet.refill(&id("404"), 1)] {
        let err = result.unwrap_err();
        assert_eq!(err.domain_error(), &DomainError::not_found("machine 404"));
    }
    assert!(matches!(
        fleet.sell(&id("404"), 1),
        Err(DispatchError::Subscriber { subscriber: "sale-handler", .. })
    ));
    assert!(sink.lines().is_empty());
}

#[test]
fn missing_machine_can_be_ignored() {
    let (fleet, sink) =
        setup(StockConfig::default().with_missing_machine(MissingMachinePolicy::Ignore));

    fleet.sell(&id("404"), 1).unwrap();
    fleet.refill(&id("404"), 1).unwrap();

    assert_eq!(fleet.stock_level(&id("404")), None);
    assert_eq!(fleet.machines().len(), 1);
    assert!(sink.lines().is_empty());
}

#[test]
fn threshold_is_configurable() {
    let (fleet, sink) = setup(StockConfig::default().with_threshold(6));

    fleet.sell(&id("001"), 5).unwrap();

    assert_eq!(info(&sink), vec![LOW_001.to_string()]);
}

#[test]
fn machines_are_independent() {
    let (fleet, sink) = setup(StockConfig::default());
    fleet.provision(id("002")).unwrap();

    fleet.sell(&id("002"), 9).unwrap();

    assert_eq!(fleet.stock_level(&id("001")), Some(10));
    assert_eq!(fleet.stock_level(&id("002")), Some(1));
    assert_eq!(
        info(&sink),
        vec!["Low stock warning: machine 002 is running low".to_string()]
    );
}

#[test]
fn concurrent_sales_never_oversell() {
    let (fleet, sink) = setup(StockConfig::default().with_initial_stock(10));

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..5 {
                    fleet.sell(&id("001"), 1).unwrap();
                }
            });
        }
    });

    assert_eq!(fleet.stock_level(&id("001")), Some(0));
    assert_eq!(errors(&sink).len(), 30);
}

fn global_fleet(sink: &Arc<RecordingSink>) -> DomainResult<Fleet<InMemoryMachineRepository>> {
    Fleet::global(InMemoryMachineRepository::new(), StockConfig::default(), sink.clone())
}

// Every use of the process-wide dispatcher in this binary lives in this one
// test, so parallel tests cannot race on the global claim.
#[test]
fn global_dispatcher_takes_one_fleet_at_a_time() {
    let sink = Arc::new(RecordingSink::new());
    let fleet = global_fleet(&sink).unwrap();

    let second = global_fleet(&Arc::new(RecordingSink::new()));
    assert!(matches!(second, Err(DomainError::Conflict(_))));

    fleet.provision(id("g-001")).unwrap();
    fleet.sell(&id("g-001"), 2).unwrap();
    vendnet_inventory::dispatch::global()
        .publish(VendingEvent::sale(id("g-001"), 7))
        .unwrap();

    assert_eq!(fleet.stock_level(&id("g-001")), Some(1));
    assert_eq!(
        info(&sink),
        vec!["Low stock warning: machine g-001 is running low".to_string()]
    );

    fleet.detach();
    fleet.detach();
    let replacement = global_fleet(&sink).unwrap();
    replacement.provision(id("g-002")).unwrap();
    replacement.sell(&id("g-002"), 1).unwrap();

    assert_eq!(replacement.stock_level(&id("g-002")), Some(9));
    assert_eq!(fleet.stock_level(&id("g-001")), Some(1));
    replacement.detach();
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Sell(u32),
    Refill(u32),
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u32..8).prop_map(Op::Sell), (0u32..8).prop_map(Op::Refill)]
}

proptest! {
    /// Property: notifications match a reference model of the stock state machine.
    #[test]
    fn notifications_follow_reference_model(ops in proptest::collection::vec(any_op(), 0..40)) {
        let (fleet, sink) = setup(StockConfig::default());
        let mut level: u32 = 10;
        let (mut lows, mut oks, mut rejects) = (0usize, 0usize, 0usize);

        for op in ops {
            match op {
                Op::Sell(q) => {
                    fleet.sell(&id("001"), q).unwrap();
                    if q > level {
                        rejects += 1;
                    } else {
                        level -= q;
                        if level < 3 {
                            lows += 1;
                        }
                    }
                }
                Op::Refill(q) => {
                    fleet.refill(&id("001"), q).unwrap();
                    if level < 3 && level + q >= 3 {
                        oks += 1;
                    }
                    level += q;
                }
            }
            prop_assert_eq!(fleet.stock_level(&id("001")), Some(level));
        }

        let lines = info(&sink);
        prop_assert_eq!(lines.iter().filter(|l| l.as_str() == LOW_001).count(), lows);
        prop_assert_eq!(lines.iter().filter(|l| l.as_str() == OK_001).count(), oks);
        prop_assert_eq!(errors(&sink).len(), rejects);
    }
}
