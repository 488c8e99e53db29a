use crate::error::ConfigurationError;
use crate::periods::PeriodGrid;
use crate::problem::{
    BandIndex, BlockIndex, Cost, IntervalIndex, LegIndex, Quantity, Scenario, SiteIndex,
    StageIndex, SupplierIndex, TimeIndex,
};
use crate::topology::Topology;

/// Sets of the supply chain model
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Sets {
    /// Set of stages
    pub K: Vec<StageIndex>,
    /// Set of sub-periods
    pub T: Vec<TimeIndex>,
    /// Set of base periods (blocks of sub-periods)
    pub B: Vec<BlockIndex>,
    /// Sub-periods of block b
    pub T_b: Vec<Vec<TimeIndex>>,
    /// Set of suppliers
    pub J: Vec<SupplierIndex>,
    /// Price intervals of every supplier
    pub G: Vec<Vec<IntervalIndex>>,
    /// Set of production sites
    pub S: Vec<SiteIndex>,
    /// Set of freight bands
    pub E: Vec<BandIndex>,
    /// Legs with a shipment variable
    pub L_ship: Vec<LegIndex>,
    /// Legs priced by the freight tariff
    pub L_freight: Vec<LegIndex>,
    /// Legs paying holding cost on material in transit
    pub L_transit: Vec<LegIndex>,
}

impl Sets {
    pub fn new(scenario: &Scenario, topology: &Topology, grid: &PeriodGrid) -> Sets {
        Sets {
            K: (0..topology.len()).collect(),
            T: (0..grid.periods()).collect(),
            B: (0..grid.base_periods()).collect(),
            T_b: (0..grid.base_periods())
                .map(|b| grid.block(b).collect())
                .collect(),
            J: (0..scenario.suppliers.len()).collect(),
            G: scenario
                .suppliers
                .iter()
                .map(|s| (0..s.price_breaks.len()).collect())
                .collect(),
            S: (0..topology.sites()).collect(),
            E: (0..scenario.freight.len()).collect(),
            L_ship: topology.shipment_legs().collect(),
            L_freight: topology.freight_legs().collect(),
            L_transit: topology.in_transit_legs().collect(),
        }
    }
}

/// Parameters of the supply chain model, all in sub-period terms
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Number of sub-periods per base period
    pub m: usize,
    /// Demand at the last stage in sub-period t
    pub D: Vec<Quantity>,
    /// Holding cost per unit in sub-period t
    pub h: Vec<Cost>,
    /// Transport capacity of a shipment leg in sub-period t
    pub C_trans: Vec<Quantity>,
    /// Cumulative capacity of supplier j up to sub-period t
    pub C_cum: Vec<Vec<Quantity>>,
    /// true if supplier j may receive an order in sub-period t
    pub open: Vec<Vec<bool>>,
    /// Minimum order of supplier j
    pub Q_min: Vec<Quantity>,
    /// Maximum order of supplier j
    pub Q_max: Vec<Quantity>,
    /// One-time ordering cost of supplier j
    pub c_primary: Vec<Cost>,
    /// Per-order cost of supplier j
    pub c_secondary: Vec<Cost>,
    /// Lower end of price interval g of supplier j
    pub lower: Vec<Vec<Quantity>>,
    /// Width of price interval g of supplier j
    pub width: Vec<Vec<Quantity>>,
    /// Marginal price inside interval g of supplier j
    pub price: Vec<Vec<Cost>>,
    /// Cost of completely filling the intervals below interval g of supplier j
    pub base_cost: Vec<Vec<Cost>>,
    /// Setup cost of site s in block b
    pub c_fixed: Vec<Vec<Cost>>,
    /// Unit production cost of site s in sub-period t
    pub c_unit: Vec<Vec<Cost>>,
    /// Production capacity of site s in block b
    pub P_cap: Vec<Vec<Quantity>>,
    /// Smallest quantity of freight band e
    pub F_min: Vec<Quantity>,
    /// Largest quantity of freight band e
    pub F_max: Vec<Quantity>,
    /// Fixed cost of freight band e
    pub F_fixed: Vec<Cost>,
    /// Unit cost of freight band e
    pub F_unit: Vec<Cost>,
    /// Lead time of leg l in sub-periods
    pub lead: Vec<usize>,
    /// Inventory capacity shared by all stages
    pub I_cap: Quantity,
    /// Initial inventory at stage k
    pub I_init: Vec<Quantity>,
    /// Required inventory at the last stage at the end of the horizon
    pub I_end: Quantity,
}

impl Parameters {
    #[allow(non_snake_case)]
    pub fn new(
        scenario: &Scenario,
        topology: &Topology,
        grid: &PeriodGrid,
    ) -> Result<Parameters, ConfigurationError> {
        let suppliers = &scenario.suppliers;

        let C_cum: Vec<Vec<Quantity>> = suppliers
            .iter()
            .map(|s| grid.expand(&s.cumulative_capacity))
            .collect();

        // capacity grows in sub-period t
        let open = C_cum
            .iter()
            .map(|cum| {
                (0..cum.len())
                    .map(|t| {
                        let released = if t == 0 { cum[0] } else { cum[t] - cum[t - 1] };
                        !scenario.procurement.restrict_to_release_periods || released > 0.0
                    })
                    .collect()
            })
            .collect();

        let Q_max = suppliers
            .iter()
            .map(|s| {
                s.max_order
                    .or(scenario.procurement.max_order)
                    .unwrap_or_else(|| s.total_capacity())
            })
            .collect();

        let mut lower = Vec::with_capacity(suppliers.len());
        let mut width = Vec::with_capacity(suppliers.len());
        let mut price = Vec::with_capacity(suppliers.len());
        let mut base_cost = Vec::with_capacity(suppliers.len());
        for supplier in suppliers {
            let (mut lo, mut wi, mut pr, mut bc) = (vec![], vec![], vec![], vec![]);
            let (mut prev, mut filled) = (0.0, 0.0);
            for pb in &supplier.price_breaks {
                lo.push(prev);
                wi.push(pb.upper - prev);
                pr.push(pb.price);
                bc.push(filled);
                filled += (pb.upper - prev) * pb.price;
                prev = pb.upper;
            }
            lower.push(lo);
            width.push(wi);
            price.push(pr);
            base_cost.push(bc);
        }

        Ok(Parameters {
            m: grid.aggregation(),
            D: grid.distribute(&scenario.demand, &scenario.demand_mode)?,
            h: grid.split(&scenario.holding_cost),
            C_trans: grid.split(&scenario.transport_capacity),
            C_cum,
            open,
            Q_min: suppliers.iter().map(|s| s.min_order).collect(),
            Q_max,
            c_primary: suppliers.iter().map(|s| s.primary_cost).collect(),
            c_secondary: suppliers.iter().map(|s| s.secondary_cost).collect(),
            lower,
            width,
            price,
            base_cost,
            c_fixed: scenario.sites.iter().map(|s| s.fixed_cost.clone()).collect(),
            c_unit: scenario
                .sites
                .iter()
                .map(|s| grid.expand(&s.unit_cost))
                .collect(),
            P_cap: scenario.sites.iter().map(|s| s.capacity.clone()).collect(),
            F_min: scenario.freight.iter().map(|f| f.min).collect(),
            F_max: scenario.freight.iter().map(|f| f.max).collect(),
            F_fixed: scenario.freight.iter().map(|f| f.fixed_cost).collect(),
            F_unit: scenario.freight.iter().map(|f| f.unit_cost).collect(),
            lead: topology.legs().iter().map(|l| l.lead).collect(),
            I_cap: scenario.inventory.capacity,
            I_init: scenario.inventory.initial.clone(),
            I_end: scenario.inventory.ending_buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::tests::small_scenario;

    fn build(scenario: &Scenario) -> (Sets, Parameters) {
        let topology = Topology::new(scenario.stages, scenario.aggregation).unwrap();
        let grid = PeriodGrid::new(scenario.base_periods, scenario.aggregation).unwrap();
        (
            Sets::new(scenario, &topology, &grid),
            Parameters::new(scenario, &topology, &grid).unwrap(),
        )
    }

    #[test]
    fn price_intervals() {
        let (sets, parameters) = build(&small_scenario());
        assert_eq!(sets.G, vec![vec![0, 1]]);
        assert_eq!(parameters.lower[0], vec![0.0, 60.0]);
        assert_eq!(parameters.width[0], vec![60.0, 140.0]);
        assert_eq!(parameters.base_cost[0], vec![0.0, 600.0]);
    }

    #[test]
    fn sub_period_scaling() {
        let mut scenario = small_scenario();
        scenario.aggregation = 2;
        let (sets, parameters) = build(&scenario);

        assert_eq!(sets.T.len(), 4);
        assert_eq!(sets.B.len(), 2);
        assert_eq!(sets.T_b, vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(parameters.h, vec![0.5, 0.5, 0.5, 0.5]);
        assert_eq!(parameters.C_trans, vec![75.0; 4]);
        assert_eq!(parameters.C_cum[0], vec![200.0; 4]);
        assert_eq!(parameters.c_unit[0], vec![2.0; 4]);
        assert_eq!(parameters.c_fixed[0], vec![500.0, 500.0]);
        assert_eq!(parameters.P_cap[0], vec![200.0, 200.0]);
        assert_eq!(parameters.lead, vec![0, 2]);
        assert_eq!(parameters.D, vec![0.0, 50.0, 0.0, 100.0]);
    }

    #[test]
    fn release_periods() {
        let mut scenario = small_scenario();
        scenario.suppliers[0].cumulative_capacity = vec![0.0, 200.0];
        scenario.procurement.restrict_to_release_periods = true;
        scenario.aggregation = 2;
        let (_, parameters) = build(&scenario);
        assert_eq!(parameters.open[0], vec![false, false, true, false]);

        scenario.procurement.restrict_to_release_periods = false;
        let (_, parameters) = build(&scenario);
        assert!(parameters.open[0].iter().all(|open| *open));
    }

    #[test]
    fn order_limit_falls_back_to_total_capacity() {
        let mut scenario = small_scenario();
        scenario.suppliers[0].max_order = None;
        let (_, parameters) = build(&scenario);
        assert_eq!(parameters.Q_max, vec![200.0]);

        scenario.procurement.max_order = Some(120.0);
        let (_, parameters) = build(&scenario);
        assert_eq!(parameters.Q_max, vec![120.0]);
    }
}
