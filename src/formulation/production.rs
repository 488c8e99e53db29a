use itertools::iproduct;
use log::debug;

use super::sets_and_parameters::{Parameters, Sets};
use crate::error::Result;
use good_lp::{Expression, Variable};

use crate::lp::{self, AddVars, Model};
use crate::problem::SiteIndex;

/// Lot-sizing of every production site. Setups are decided per block and shared by its sub-periods.
#[derive(Debug, Clone)]
pub struct ProductionVars {
    /// output of site s in sub-period t
    pub x: Vec<Vec<Variable>>,
    /// 1 if site s produces in sub-period t
    pub w: Vec<Vec<Variable>>,
    /// 1 if site s is set up in block b
    pub w_group: Vec<Vec<Variable>>,
}

impl ProductionVars {
    pub fn formulate(
        model: &mut Model,
        sets: &Sets,
        parameters: &Parameters,
    ) -> Result<ProductionVars> {
        let sites = sets.S.len();
        let x = (sites, sets.T.len()).cont(model, "x")?;
        let w = (sites, sets.T.len()).binary(model, "w")?;
        let w_group = (sites, sets.B.len()).binary(model, "w_group")?;

        for (s, b) in iproduct!(&sets.S, &sets.B) {
            let capacity = parameters.P_cap[*s][*b];
            let block = &sets.T_b[*b];

            // production requires the sub-period setup, and the setup requires the block setup
            for t in block {
                model.add_constr(
                    &format!("production_setup_{s}_{t}"),
                    lp::leq(x[*s][*t], w[*s][*t] * capacity),
                )?;
                model.add_constr(
                    &format!("group_setup_{s}_{t}"),
                    lp::leq(w[*s][*t], w_group[*s][*b]),
                )?;
            }

            // the capacity of a base period is shared by its sub-periods
            model.add_constr(
                &format!("block_capacity_{s}_{b}"),
                lp::leq(block.iter().map(|t| x[*s][*t]).sum::<Expression>(), capacity),
            )?;
            model.add_constr(
                &format!("block_setups_{s}_{b}"),
                lp::leq(
                    block.iter().map(|t| w[*s][*t]).sum::<Expression>(),
                    w_group[*s][*b] * parameters.m as f64,
                ),
            )?;
        }

        debug!("production: {} sites, {} blocks", sites, sets.B.len());

        Ok(ProductionVars { x, w, w_group })
    }

    /// Setup and unit cost of site `s`. The setup is billed once per block.
    pub fn site_cost(&self, s: SiteIndex, sets: &Sets, parameters: &Parameters) -> Expression {
        let fixed = sets
            .B
            .iter()
            .map(|b| self.w_group[s][*b] * parameters.c_fixed[s][*b])
            .sum::<Expression>();
        let variable = sets
            .T
            .iter()
            .map(|t| self.x[s][*t] * parameters.c_unit[s][*t])
            .sum::<Expression>();
        fixed + variable
    }

    pub fn cost(&self, sets: &Sets, parameters: &Parameters) -> Expression {
        sets.S
            .iter()
            .map(|s| self.site_cost(*s, sets, parameters))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::TOLERANCE;
    use crate::periods::PeriodGrid;
    use crate::problem::tests::small_scenario;
    use crate::topology::Topology;

    fn formulate(aggregation: usize) -> (Model, Sets, Parameters, ProductionVars) {
        let mut scenario = small_scenario();
        scenario.aggregation = aggregation;
        let topology = Topology::new(scenario.stages, aggregation).unwrap();
        let grid = PeriodGrid::new(scenario.base_periods, aggregation).unwrap();
        let sets = Sets::new(&scenario, &topology, &grid);
        let parameters = Parameters::new(&scenario, &topology, &grid).unwrap();
        let mut model = Model::new("production");
        let vars = ProductionVars::formulate(&mut model, &sets, &parameters).unwrap();
        (model, sets, parameters, vars)
    }

    #[test]
    fn capacity_is_shared_within_a_block() {
        let (model, _, _, vars) = formulate(2);
        let mut values = model.zeros();
        for t in [0, 1] {
            values.set(vars.x[0][t], 120.0);
            values.set(vars.w[0][t], 1.0);
        }
        values.set(vars.w_group[0][0], 1.0);

        let broken = model
            .violations(&values, TOLERANCE)
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(broken, vec!["block_capacity_0_0"]);

        values.set(vars.x[0][1], 80.0);
        assert!(model.violations(&values, TOLERANCE).unwrap().is_empty());
    }

    #[test]
    fn setup_is_billed_once_per_block() {
        let (model, sets, parameters, vars) = formulate(3);
        let mut values = model.zeros();
        for t in 0..3 {
            values.set(vars.x[0][t], 10.0);
            values.set(vars.w[0][t], 1.0);
        }
        values.set(vars.w_group[0][0], 1.0);

        assert!(model.violations(&values, TOLERANCE).unwrap().is_empty());
        // one setup of 500 and 30 units at 2
        assert_eq!(vars.cost(&sets, &parameters).eval_with(&values.values), 560.0);
    }

    #[test]
    fn production_needs_the_group_setup() {
        let (model, _, _, vars) = formulate(2);
        let mut values = model.zeros();
        values.set(vars.x[0][2], 10.0);
        values.set(vars.w[0][2], 1.0);

        let broken = model
            .violations(&values, TOLERANCE)
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(broken, vec!["group_setup_0_2", "block_setups_0_1"]);
    }
}
