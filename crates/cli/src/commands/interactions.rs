//! `clinmesh interactions` — Comprehensive medication safety check.

use clinmesh_knowledge::DrugDatabase;
use clinmesh_safety::InteractionChecker;
use std::sync::Arc;
use tracing::info;

pub fn run(
    meds: &[String],
    conditions: &[String],
    allergies: &[String],
    pregnant: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let checker = InteractionChecker::new(Arc::new(DrugDatabase::default()));
    info!(medications = meds.len(), "Running comprehensive safety check");
    let check = checker.comprehensive(meds, conditions, allergies, pregnant);
    println!("{}", check.format_report());
    Ok(())
}
