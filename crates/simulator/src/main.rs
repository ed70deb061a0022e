//! Replays a short day of trading against the process-wide dispatcher.

use std::sync::Arc;

use anyhow::Context;

use vendnet_core::MachineId;
use vendnet_inventory::{Fleet, InMemoryMachineRepository, StockConfig, VendingEvent};
use vendnet_observability::TracingSink;

const MACHINES: [&str; 3] = ["001", "002", "003"];

fn scenario() -> anyhow::Result<Vec<VendingEvent>> {
    let m = |raw: &str| MachineId::new(raw).with_context(|| format!("bad machine id `{raw}`"));
    Ok(vec![
        VendingEvent::sale(m("001")?, 2),
        VendingEvent::sale(m("001")?, 6),
        VendingEvent::refill(m("001")?, 3),
        VendingEvent::refill(m("001")?, 5),
        VendingEvent::sale(m("001")?, 11),
        VendingEvent::sale(m("002")?, 10),
        VendingEvent::refill(m("002")?, 1),
        VendingEvent::refill(m("002")?, 4),
        VendingEvent::sale(m("003")?, 4),
    ])
}

fn main() -> anyhow::Result<()> {
    vendnet_observability::init();

    let config = StockConfig::from_env().context("loading stock configuration")?;
    let fleet = Fleet::global(InMemoryMachineRepository::new(), config, Arc::new(TracingSink))
        .context("attaching fleet to the global dispatcher")?;

    for raw in MACHINES {
        fleet.provision(MachineId::new(raw)?)?;
    }

    for event in scenario()? {
        tracing::info!(?event, "publishing");
        fleet
            .dispatcher()
            .publish(event)
            .context("publishing scenario event")?;
    }

    let snapshot = serde_json::to_string(&fleet.machines()).context("serializing fleet snapshot")?;
    tracing::info!(%snapshot, "final stock levels");
    Ok(())
}
