use good_lp::solvers::highs::highs;
use good_lp::{Solution, SolverModel};
use log::info;

use super::{unsolved, Outcome, SolverBackend};
use crate::error::Result;
use crate::lp::{Assignment, Model, Problem};

/// HiGHS through `good_lp`'s `highs` feature
#[derive(Debug, Clone, Default)]
pub struct Highs {
    time_limit: Option<f64>,
    verbose: bool,
}

impl Highs {
    pub fn new(time_limit: Option<f64>, verbose: bool) -> Highs {
        Highs {
            time_limit,
            verbose,
        }
    }
}

impl SolverBackend for Highs {
    fn name(&self) -> &str {
        "highs"
    }

    fn solve(&self, model: &Model) -> Result<Outcome<Assignment>> {
        info!(
            "Solving {} with highs: {} variables ({} binary), {} constraints",
            model.name(),
            model.num_vars(),
            model.num_binaries(),
            model.num_constrs()
        );

        let Problem {
            variables,
            handles,
            objective,
            constraints,
        } = model.to_problem();
        let mut problem = variables
            .minimise(objective)
            .using(highs)
            .set_verbose(self.verbose);
        if let Some(limit) = self.time_limit {
            problem = problem.set_time_limit(limit);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::{self, VarKind};

    #[test]
    fn small_milp() {
        let mut model = Model::new("small");
        let x = model.add_var("x", VarKind::Continuous, 0.0, 4.0).unwrap();
        let b = model.add_var("b", VarKind::Binary, 0.0, 1.0).unwrap();
        model.add_constr("cover", lp::geq(x + b * 5.0, 7.0)).unwrap();
        model.set_objective(x + b * 10.0).unwrap();

        let assignment = Highs::default().solve(&model).unwrap().optimal().unwrap();
        assert_eq!(assignment.value(b), 1.0);
        assert!((assignment.objective - 12.0).abs() < 1e-6);
    }
}
