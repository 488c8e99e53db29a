//! The MILP of one planning scenario.
//!
//! Every formulator adds its variables and constraints to one shared [`Model`] and exposes
//! its cost as a linear expression. [`CostTerms`] sums those into the objective.

pub mod flow;
pub mod freight;
pub mod objective;
pub mod procurement;
pub mod production;
pub mod sets_and_parameters;

use log::info;

use self::flow::FlowVars;
use self::freight::FreightVars;
use self::objective::CostTerms;
use self::procurement::ProcurementVars;
use self::production::ProductionVars;
use self::sets_and_parameters::{Parameters, Sets};
use crate::error::Result;
use crate::lp::{Assignment, Model, Violation};
use crate::periods::PeriodGrid;
use crate::problem::Scenario;
use crate::report::SolvedPlan;
use crate::solver::{Outcome, SolverBackend};
use crate::topology::Topology;

/// A complete formulation: the model together with the variables of every formulator
#[derive(Debug)]
pub struct Formulation {
    pub scenario: Scenario,
    pub topology: Topology,
    pub grid: PeriodGrid,
    pub sets: Sets,
    pub parameters: Parameters,
    pub model: Model,
    pub procurement: ProcurementVars,
    pub production: ProductionVars,
    pub flow: FlowVars,
    pub freight: FreightVars,
    pub costs: CostTerms,
}

impl Formulation {
    /// Validate the scenario and build its model. Configuration errors are raised before any variable exists.
    pub fn build(scenario: &Scenario) -> Result<Formulation> {
        scenario.validate()?;
        let topology = Topology::new(scenario.stages, scenario.aggregation)?;
        let grid = PeriodGrid::new(scenario.base_periods, scenario.aggregation)?;
        let sets = Sets::new(scenario, &topology, &grid);
        let parameters = Parameters::new(scenario, &topology, &grid)?;

        info!(
            "Building supply chain model: {} stages, {} base periods, m = {}",
            scenario.stages, scenario.base_periods, scenario.aggregation
        );
        let mut model = Model::new(&format!(
            "supply_chain_k{}_m{}",
            scenario.stages, scenario.aggregation
        ));

        let procurement = ProcurementVars::formulate(&mut model, &sets, &parameters)?;
        let production = ProductionVars::formulate(&mut model, &sets, &parameters)?;
        let flow = FlowVars::formulate(
            &mut model,
            &sets,
            &parameters,
            &topology,
            &procurement,
            &production,
        )?;
        let freight = FreightVars::formulate(&mut model, &sets, &parameters, &flow)?;

        let costs = CostTerms::assemble(
            &sets,
            &parameters,
            &procurement,
            &production,
            &flow,
            &freight,
        );
        model.set_objective(costs.total())?;

        info!(
            "Successfully built supply chain model: {} variables ({} binary), {} constraints",
            model.num_vars(),
            model.num_binaries(),
            model.num_constrs()
        );

        Ok(Formulation {
            scenario: scenario.clone(),
            topology,
            grid,
            sets,
            parameters,
            model,
            procurement,
            production,
            flow,
            freight,
            costs,
        })
    }

    /// Solve the model with `backend` and read the plan out of the optimum
    pub fn solve(&self, backend: &dyn SolverBackend) -> Result<Outcome<SolvedPlan>> {
        match backend.solve(&self.model)? {
            Outcome::Optimal(assignment) => {
                self.model.check_assignment(&assignment)?;
                Ok(Outcome::Optimal(SolvedPlan::new(self, assignment)))
            }
            Outcome::Infeasible => Ok(Outcome::Infeasible),
            Outcome::Unbounded => Ok(Outcome::Unbounded),
        }
    }

    /// Every constraint and bound `assignment` breaks by more than `tol`
    pub fn violations(&self, assignment: &Assignment, tol: f64) -> Result<Vec<Violation>> {
        self.model.violations(assignment, tol)
    }
}
