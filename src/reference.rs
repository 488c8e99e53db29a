//! The five-period reference instance: demand 100/200/250/300/200, four supplier offers
//! with incremental discounts and a seven band freight tariff.

use crate::periods::DemandMode;
use crate::problem::{
    FreightBand, InventoryPolicy, PriceBreak, ProcurementPolicy, ProductionSite, Scenario,
    SupplierOffer,
};

fn offer(
    name: &str,
    cumulative_capacity: [f64; 5],
    primary_cost: f64,
    secondary_cost: f64,
    breaks: &[(f64, f64)],
) -> SupplierOffer {
    SupplierOffer {
        name: name.to_string(),
        cumulative_capacity: cumulative_capacity.to_vec(),
        primary_cost,
        secondary_cost,
        min_order: 50.0,
        max_order: None,
        price_breaks: breaks
            .iter()
            .map(|(upper, price)| PriceBreak {
                upper: *upper,
                price: *price,
            })
            .collect(),
    }
}

fn band(min: f64, max: f64, fixed_cost: f64, unit_cost: f64) -> FreightBand {
    FreightBand {
        min,
        max,
        fixed_cost,
        unit_cost,
    }
}

/// The supplier offers of the reference instance
pub fn suppliers() -> Vec<SupplierOffer> {
    vec![
        offer(
            "Sup1_Offer1",
            [300.0, 450.0, 450.0, 450.0, 450.0],
            550.0,
            1000.0,
            &[(50.0, 95.0), (150.0, 80.0), (300.0, 70.0), (450.0, 60.0)],
        ),
        // only released from the third period on
        offer(
            "Sup1_Offer2",
            [0.0, 0.0, 50.0, 150.0, 400.0],
            550.0,
            1000.0,
            &[(150.0, 95.0), (250.0, 80.0), (400.0, 70.0)],
        ),
        offer(
            "Sup2",
            [200.0, 400.0, 650.0, 900.0, 1200.0],
            500.0,
            1000.0,
            &[
                (200.0, 120.0),
                (400.0, 100.0),
                (650.0, 85.0),
                (900.0, 70.0),
                (1200.0, 60.0),
            ],
        ),
        offer(
            "Sup3",
            [100.0, 100.0, 400.0, 400.0, 1000.0],
            600.0,
            1050.0,
            &[(100.0, 110.0), (400.0, 80.0), (1000.0, 60.0)],
        ),
    ]
}

/// The freight tariff of the reference instance
pub fn freight() -> Vec<FreightBand> {
    vec![
        band(1.0, 31.0, 519.0, 0.0),
        band(32.0, 48.0, 0.0, 16.2),
        band(49.0, 62.0, 789.0, 0.0),
        band(63.0, 112.0, 0.0, 12.5),
        band(113.0, 124.0, 1411.0, 0.0),
        band(125.0, 254.0, 0.0, 11.3),
        band(255.0, 312.0, 2780.0, 0.0),
    ]
}

/// The reference instance on a chain of `stages` stages, with `aggregation` sub-periods per period.
///
/// The five stage chain adds a second, cheaper finishing site in the middle of the chain.
pub fn scenario(stages: usize, aggregation: usize, demand_mode: DemandMode) -> Scenario {
    let mut sites = vec![ProductionSite {
        name: "Site1".to_string(),
        fixed_cost: vec![2500.0, 2500.0, 3000.0, 3000.0, 3500.0],
        unit_cost: vec![10.0, 10.0, 12.0, 12.0, 13.0],
        capacity: vec![270.0; 5],
    }];
    if stages == 5 {
        sites.push(ProductionSite {
            name: "Site2".to_string(),
            fixed_cost: vec![1500.0, 1500.0, 1800.0, 1800.0, 2000.0],
            unit_cost: vec![4.0, 4.0, 5.0, 5.0, 5.0],
            capacity: vec![270.0; 5],
        });
    }

    let mut initial = vec![0.0; stages];
    if let Some(market) = initial.last_mut() {
        *market = 100.0;
    }

    Scenario {
        stages,
        base_periods: 5,
        aggregation,
        demand_mode,
        demand: vec![100.0, 200.0, 250.0, 300.0, 200.0],
        holding_cost: vec![5.0, 5.0, 5.0, 6.0, 6.0],
        transport_capacity: vec![300.0; 5],
        suppliers: suppliers(),
        procurement: ProcurementPolicy {
            max_order: Some(500.0),
            restrict_to_release_periods: false,
        },
        freight: freight(),
        sites,
        inventory: InventoryPolicy {
            capacity: 200.0,
            initial,
            ending_buffer: 100.0,
        },
    }
}

/// Slightly front-loaded weights, close to uniform but not equal
pub fn skewed_weights(aggregation: usize) -> Vec<f64> {
    let m = aggregation as f64;
    let weights = match aggregation {
        1 => vec![1.0],
        2 => vec![0.6, 0.4],
        3 => vec![0.4, 0.35, 0.25],
        4 => vec![0.28, 0.26, 0.24, 0.22],
        _ => (0..aggregation)
            .map(|i| 1.0 / m + (m - i as f64 - m / 2.0) * 0.01)
            .collect(),
    };
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
