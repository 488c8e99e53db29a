//! Solving one scenario at several aggregation factors and demand modes.
//!
//! Every point gets its own formulation and its own solver call on its own thread, nothing is shared
//! between points except the read-only base scenario and the backend.

use std::sync::mpsc;

use log::{info, trace};

use crate::error::Result;
use crate::formulation::Formulation;
use crate::periods::DemandMode;
use crate::problem::Scenario;
use crate::report::CostBreakdown;
use crate::solver::{Outcome, SolverBackend};

/// One point of a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub aggregation: usize,
    pub demand_mode: DemandMode,
    pub outcome: Outcome<CostBreakdown>,
}

/// Solve `base` once for every `(aggregation, demand mode)` pair. Results are in input order.
pub fn sweep(
    base: &Scenario,
    points: &[(usize, DemandMode)],
    backend: &dyn SolverBackend,
) -> Result<Vec<SweepPoint>> {
    info!("Sweeping {} scenarios with {}", points.len(), backend.name());
    let (tx, rx) = mpsc::channel::<(usize, Result<SweepPoint>)>();

    std::thread::scope(|scope| {
        for (index, (aggregation, demand_mode)) in points.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let point = solve_point(base, *aggregation, demand_mode.clone(), backend);
                // the receiver outlives the scope
                let _ = tx.send((index, point));
            });
        }
    });
    drop(tx);

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, point)| point).collect()
}

fn solve_point(
    base: &Scenario,
    aggregation: usize,
    demand_mode: DemandMode,
    backend: &dyn SolverBackend,
) -> Result<SweepPoint> {
    let scenario = base.with_aggregation(aggregation, demand_mode.clone());
    let formulation = Formulation::build(&scenario)?;
    let outcome = formulation.solve(backend)?.map(|plan| plan.breakdown);
    trace!("m = {aggregation}, {demand_mode:?}: {outcome:?}");

    Ok(SweepPoint {
        aggregation,
        demand_mode,
        outcome,
    })
}
