use good_lp::solvers::microlp::microlp;
use good_lp::{Solution, SolverModel};
use log::{info, warn};

use super::{unsolved, Outcome, SolverBackend};
use crate::error::Result;
use crate::lp::{Assignment, Model, Problem};

/// The pure Rust simplex and branch-and-bound solver behind `good_lp`'s `microlp` feature
#[derive(Debug, Clone, Default)]
pub struct MicroLp {
    time_limit: Option<f64>,
}

impl MicroLp {
    pub fn new(time_limit: Option<f64>) -> MicroLp {
        MicroLp { time_limit }
    }
}

impl SolverBackend for MicroLp {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model) -> Result<Outcome<Assignment>> {
        info!(
            "Solving {} with microlp: {} variables ({} binary), {} constraints",
            model.name(),
            model.num_vars(),
            model.num_binaries(),
            model.num_constrs()
        );
        if let Some(limit) = self.time_limit {
            warn!("microlp has no time limit, ignoring limit of {limit} s");
        }

        let Problem {
            variables,
            handles,
            objective,
            constraints,
        } = model.to_problem();
        let mut problem = variables.minimise(objective).using(microlp);
        for constraint in constraints {
            problem = problem.with(constraint);
        }

        match problem.solve() {
            Ok(solution) => {
                let assignment = model.assignment(&handles, |v| solution.value(v));
                info!("Finished optimizing {}, objective {}", model.name(), assignment.objective);
                Ok(Outcome::Optimal(assignment))
            }
            Err(err) => unsolved(self.name(), model, err),
        }
    }
}
