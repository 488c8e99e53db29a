use derive_more::Constructor;
use itertools::iproduct;
use log::debug;

use super::procurement::ProcurementVars;
use super::production::ProductionVars;
use super::sets_and_parameters::{Parameters, Sets};
use crate::error::Result;
use good_lp::{Expression, Variable};

use crate::lp::{self, AddVars, Model};
use crate::problem::{LegIndex, TimeIndex};
use crate::topology::{LegKind, StageKind, Topology};

/// Inventory at every stage and the material moving along every leg
#[derive(Debug, Clone, Constructor)]
pub struct FlowVars {
    /// inventory at stage k at the end of sub-period t
    pub i: Vec<Vec<Variable>>,
    /// quantity shipped on leg l in sub-period t, only for shipment legs
    pub y: Vec<Option<Vec<Variable>>>,
    /// 1 if leg l ships in sub-period t, only for shipment legs
    pub v: Vec<Option<Vec<Variable>>>,
    /// the variable carried by leg l in sub-period t: the shipment, or the producing site's output on direct legs
    pub flow: Vec<Vec<Variable>>,
}

impl FlowVars {
    pub fn formulate(
        model: &mut Model,
        sets: &Sets,
        parameters: &Parameters,
        topology: &Topology,
        procurement: &ProcurementVars,
        production: &ProductionVars,
    ) -> Result<FlowVars> {
        let periods = sets.T.len();
        let i = (sets.K.len(), periods).bounded(model, "i", &(0.0..parameters.I_cap))?;

        let mut y = Vec::with_capacity(topology.legs().len());
        let mut v = Vec::with_capacity(topology.legs().len());
        let mut flow = Vec::with_capacity(topology.legs().len());
        for leg in topology.legs() {
            let l = leg.from;
            match leg.kind {
                LegKind::Shipment => {
                    let y_l = periods.cont(model, &format!("y_{l}"))?;
                    let v_l = periods.binary(model, &format!("v_{l}"))?;
                    flow.push(y_l.clone());
                    y.push(Some(y_l));
                    v.push(Some(v_l));
                }
                LegKind::Direct => {
                    // a direct leg only leaves a factory, and carries its output
                    let site = topology.site_at(leg.from).unwrap_or_default();
                    flow.push(production.x[site].clone());
                    y.push(None);
                    v.push(None);
                }
            }
        }

        // shipments are capacitated, and need the shipping flag
        for (l, t) in iproduct!(&sets.L_ship, &sets.T) {
            if let (Some(y_l), Some(v_l)) = (&y[*l], &v[*l]) {
                model.add_constr(
                    &format!("ship_capacity_{l}_{t}"),
                    lp::leq(y_l[*t], v_l[*t] * parameters.C_trans[*t]),
                )?;
            }
        }

        // a site ships exactly what it produces
        for (l, t) in iproduct!(&sets.L_ship, &sets.T) {
            if let (Some(s), Some(y_l)) = (topology.site_at(*l), &y[*l]) {
                model.add_constr(
                    &format!("site_output_{l}_{t}"),
                    lp::eq(y_l[*t], production.x[s][*t]),
                )?;
            }
        }

        let vars = FlowVars::new(i, y, v, flow);

        // conservation of flow: inflow + previous inventory == outflow + inventory
        for (k, t) in iproduct!(&sets.K, &sets.T) {
            let previous = match *t {
                0 => Expression::from(parameters.I_init[*k]),
                t => Expression::from(vars.i[*k][t - 1]),
            };
            let inflow = match topology.inbound(*k) {
                None => sets.J.iter().map(|j| procurement.q[*j][*t]).sum(),
                Some(leg) => vars.arrival(leg.from, *t, parameters),
            };
            let outflow = match topology.stages()[*k] {
                StageKind::Factory(s) => Expression::from(production.x[s][*t]),
                StageKind::Market => Expression::from(parameters.D[*t]),
                StageKind::Warehouse => match topology.outbound(*k) {
                    Some(leg) => Expression::from(vars.flow[leg.from][*t]),
                    None => Expression::default(),
                },
            };

            model.add_constr(
                &format!("conservation_{k}_{t}"),
                lp::eq(inflow + previous, outflow + vars.i[*k][*t]),
            )?;
        }

        // nothing is left behind at the end of the horizon, except the buffer at the last stage
        if let Some(last) = sets.T.last() {
            for k in &sets.K {
                let target = if *k == topology.last_stage() {
                    parameters.I_end
                } else {
                    0.0
                };
                model.add_constr(
                    &format!("ending_inventory_{k}"),
                    lp::eq(vars.i[*k][*last], target),
                )?;
            }
        }

        debug!(
            "flow: {} stages, {} shipment legs, {} sub-periods",
            sets.K.len(),
            sets.L_ship.len(),
            periods
        );

        Ok(vars)
    }

    /// Material arriving through leg `l` in sub-period `t`, empty before the lead time has passed
    pub fn arrival(&self, l: LegIndex, t: TimeIndex, parameters: &Parameters) -> Expression {
        match t.checked_sub(parameters.lead[l]) {
            Some(departure) => Expression::from(self.flow[l][departure]),
            None => Expression::default(),
        }
    }

    /// Holding cost of stock at every stage, plus material in transit on the legs that pay for it.
    /// A unit in transit pays one sub-period of holding for every sub-period of lead time.
    pub fn holding_cost(&self, sets: &Sets, parameters: &Parameters) -> Expression {
        let stock = iproduct!(&sets.K, &sets.T)
            .map(|(k, t)| self.i[*k][*t] * parameters.h[*t])
            .sum::<Expression>();
        let in_transit = iproduct!(&sets.L_transit, &sets.T)
            .map(|(l, t)| self.flow[*l][*t] * (parameters.h[*t] * parameters.lead[*l] as f64))
            .sum::<Expression>();
        stock + in_transit
    }
}

#[cfg(test)]
mod tests {
    use good_lp::IntoAffineExpression;

    use super::*;
    use crate::periods::PeriodGrid;
    use crate::problem::tests::small_scenario;
    use crate::problem::Scenario;

    struct Built {
        model: Model,
        parameters: Parameters,
        production: ProductionVars,
        procurement: ProcurementVars,
        flow: FlowVars,
    }

    fn formulate(scenario: &Scenario) -> Built {
        let topology = Topology::new(scenario.stages, scenario.aggregation).unwrap();
        let grid = PeriodGrid::new(scenario.base_periods, scenario.aggregation).unwrap();
        let sets = Sets::new(scenario, &topology, &grid);
        let parameters = Parameters::new(scenario, &topology, &grid).unwrap();
        let mut model = Model::new("flow");
        let procurement = ProcurementVars::formulate(&mut model, &sets, &parameters).unwrap();
        let production = ProductionVars::formulate(&mut model, &sets, &parameters).unwrap();
        let flow = FlowVars::formulate(
            &mut model,
            &sets,
            &parameters,
            &topology,
            &procurement,
            &production,
        )
        .unwrap();
        Built {
            model,
            parameters,
            production,
            procurement,
            flow,
        }
    }

    #[test]
    fn lead_time_delays_arrival() {
        let mut scenario = small_scenario();
        scenario.aggregation = 2;
        let built = formulate(&scenario);
        let flow = &built.flow;
        let y = flow.y[1].as_ref().unwrap();

        // stage 2 receives through leg 1 with a lead of two sub-periods
        for t in 0..2 {
            let row = built.model.constraint(&format!("conservation_2_{t}")).unwrap();
            assert!(y.iter().all(|y_t| row.coeff(*y_t) == 0.0));
        }
        let row = built.model.constraint("conservation_2_3").unwrap();
        assert_eq!(row.coeff(y[1]), 1.0);
        assert_eq!(row.coeff(flow.i[2][2]), 1.0);
        assert_eq!(row.coeff(flow.i[2][3]), -1.0);
        // demand moves to the right-hand side
        assert_eq!(row.rhs(), 100.0);
        let arrival = flow.arrival(1, 1, &built.parameters);
        assert_eq!(arrival.linear_coefficients().count(), 0);
    }

    #[test]
    fn first_stage_is_fed_by_purchases() {
        let built = formulate(&small_scenario());
        let row = built.model.constraint("conservation_0_0").unwrap();
        assert_eq!(row.coeff(built.procurement.q[0][0]), 1.0);
        assert_eq!(row.coeff(built.production.x[0][0]), -1.0);
        assert_eq!(row.coeff(built.flow.i[0][0]), -1.0);
        assert_eq!(row.rhs(), 0.0);

        // the direct leg hands production to the warehouse in the same period
        let row = built.model.constraint("conservation_1_1").unwrap();
        assert_eq!(row.coeff(built.production.x[0][1]), 1.0);
        assert_eq!(built.flow.flow[0], built.production.x[0]);
    }

    #[test]
    fn ending_inventory_is_pinned() {
        let mut scenario = small_scenario();
        scenario.inventory.ending_buffer = 25.0;
        let built = formulate(&scenario);
        assert_eq!(built.model.constraint("ending_inventory_0").unwrap().rhs(), 0.0);
        assert_eq!(built.model.constraint("ending_inventory_1").unwrap().rhs(), 0.0);
        let row = built.model.constraint("ending_inventory_2").unwrap();
        assert_eq!(row.rhs(), 25.0);
        assert_eq!(row.coeff(built.flow.i[2][1]), 1.0);
    }

    #[test]
    fn second_site_ships_its_own_output() {
        let mut scenario = small_scenario();
        scenario.stages = 5;
        scenario.inventory.initial = vec![0.0; 5];
        scenario.sites.push(scenario.sites[0].clone());
        let built = formulate(&scenario);

        let y = built.flow.y[2].as_ref().unwrap();
        for t in 0..2 {
            let row = built.model.constraint(&format!("site_output_2_{t}")).unwrap();
            assert_eq!(row.coeff(y[t]), 1.0);
            assert_eq!(row.coeff(built.production.x[1][t]), -1.0);
            assert_eq!(row.sense, lp::Sense::Eq);
        }
        // the second site consumes what arrives at its stage
        let row = built.model.constraint("conservation_2_1").unwrap();
        assert_eq!(row.coeff(built.production.x[1][1]), -1.0);
        assert!(built.model.constraint("site_output_1_0").is_none());
    }
}
