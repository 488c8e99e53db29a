use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::periods::DemandMode;
use crate::topology::Topology;

/// The type used for material quantities
pub type Quantity = f64;
/// The type used for cost.
pub type Cost = f64;

pub type StageIndex = usize;
pub type LegIndex = usize;
pub type TimeIndex = usize;
pub type BlockIndex = usize;
pub type SupplierIndex = usize;
pub type IntervalIndex = usize;
pub type SiteIndex = usize;
pub type BandIndex = usize;

/// One planning instance: a topology, a period grid and the raw cost and capacity data.
///
/// Every per-period vector is given per **base period**. The formulation derives the
/// sub-period values from the aggregation factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Number of stages in the chain (3, 4 or 5)
    pub stages: usize,
    /// Length of the base horizon
    pub base_periods: usize,
    /// Number of sub-periods each base period is split into
    pub aggregation: usize,
    /// How base-period demand is spread over sub-periods
    pub demand_mode: DemandMode,
    /// External demand at the last stage, per base period
    pub demand: Vec<Quantity>,
    /// Holding cost per unit and base period
    pub holding_cost: Vec<Cost>,
    /// Transport capacity of every shipment leg, per base period
    pub transport_capacity: Vec<Quantity>,
    pub suppliers: Vec<SupplierOffer>,
    #[serde(default)]
    pub procurement: ProcurementPolicy,
    /// All-units freight tariff applied on every freight leg
    pub freight: Vec<FreightBand>,
    /// Production sites, in stage order
    pub sites: Vec<ProductionSite>,
    pub inventory: InventoryPolicy,
}

/// An upper bound of an incremental price interval together with the marginal price inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreak {
    /// Cumulative quantity where the interval ends
    pub upper: Quantity,
    /// Price per unit bought inside the interval
    pub price: Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub name: String,
    /// Total quantity purchasable up to and including each base period
    pub cumulative_capacity: Vec<Quantity>,
    /// Charged once if anything is bought from the supplier over the horizon
    pub primary_cost: Cost,
    /// Charged for every sub-period an order is placed
    pub secondary_cost: Cost,
    /// Smallest quantity of a single order
    pub min_order: Quantity,
    /// Largest quantity of a single order, falls back to the procurement policy
    #[serde(default)]
    pub max_order: Option<Quantity>,
    /// Incremental discount schedule with strictly increasing upper bounds
    pub price_breaks: Vec<PriceBreak>,
}

impl SupplierOffer {
    /// Total quantity available over the whole horizon
    pub fn total_capacity(&self) -> Quantity {
        self.cumulative_capacity.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcurementPolicy {
    /// Largest single order for suppliers without their own limit. Without any limit
    /// an order is bounded by the supplier's total capacity.
    #[serde(default)]
    pub max_order: Option<Quantity>,
    /// Only allow orders in sub-periods where a supplier's cumulative capacity grows
    #[serde(default)]
    pub restrict_to_release_periods: bool,
}

/// A band of the all-units freight tariff. Bands are listed in increasing order and may not
/// share a quantity, so `min` lies strictly above the `max` of the band before.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreightBand {
    pub min: Quantity,
    pub max: Quantity,
    pub fixed_cost: Cost,
    pub unit_cost: Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSite {
    pub name: String,
    /// Setup cost of a production block, per base period
    pub fixed_cost: Vec<Cost>,
    /// Variable cost per unit, per base period
    pub unit_cost: Vec<Cost>,
    /// Output ceiling of a base period, shared by its sub-periods
    pub capacity: Vec<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPolicy {
    /// Inventory ceiling shared by all stages
    pub capacity: Quantity,
    /// Inventory at the start of the horizon, one value per stage
    pub initial: Vec<Quantity>,
    /// Inventory required at the last stage at the end of the horizon
    pub ending_buffer: Quantity,
}

impl Scenario {
    /// Parse a scenario from a JSON document and validate it
    pub fn from_json(document: &str) -> Result<Scenario> {
        let scenario: Scenario = serde_json::from_str(document)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check that the scenario describes a well-formed instance. Nothing about feasibility is decided here.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let topology = Topology::new(self.stages, self.aggregation.max(1))?;
        if self.aggregation == 0 {
            return Err(ConfigurationError::ZeroAggregation);
        }
        if self.base_periods == 0 {
            return Err(ConfigurationError::EmptyHorizon);
        }

        let periods = self.base_periods;
        check_series("demand", &self.demand, periods)?;
        check_series("holding_cost", &self.holding_cost, periods)?;
        check_series("transport_capacity", &self.transport_capacity, periods)?;

        for supplier in &self.suppliers {
            check_supplier(supplier, periods)?;
        }
        if let Some(max) = self.procurement.max_order {
            check_value("procurement.max_order", max)?;
        }

        for (e, band) in self.freight.iter().enumerate() {
            check_value(&format!("freight[{e}].min"), band.min)?;
            check_value(&format!("freight[{e}].max"), band.max)?;
            check_value(&format!("freight[{e}].fixed_cost"), band.fixed_cost)?;
            check_value(&format!("freight[{e}].unit_cost"), band.unit_cost)?;
            if band.min > band.max {
                return Err(ConfigurationError::InvertedFreightBand {
                    index: e,
                    min: band.min,
                    max: band.max,
                });
            }
            if e > 0 && band.min <= self.freight[e - 1].max {
                return Err(ConfigurationError::OverlappingFreightBands { index: e });
            }
        }

        if self.sites.len() != topology.sites() {
            return Err(ConfigurationError::SiteCountMismatch {
                stages: self.stages,
                expected: topology.sites(),
                actual: self.sites.len(),
            });
        }
        for site in &self.sites {
            check_series(&format!("{}.fixed_cost", site.name), &site.fixed_cost, periods)?;
            check_series(&format!("{}.unit_cost", site.name), &site.unit_cost, periods)?;
            check_series(&format!("{}.capacity", site.name), &site.capacity, periods)?;
        }

        check_value("inventory.capacity", self.inventory.capacity)?;
        check_value("inventory.ending_buffer", self.inventory.ending_buffer)?;
        check_series("inventory.initial", &self.inventory.initial, self.stages)?;

        if let DemandMode::Weighted(weights) = &self.demand_mode {
            let valid = weights.len() == self.aggregation
                && weights.iter().all(|w| w.is_finite() && *w >= 0.0)
                && weights.iter().sum::<f64>() > 0.0;
            if !valid {
                return Err(ConfigurationError::InvalidDemandWeights {
                    expected: self.aggregation,
                });
            }
        }

        Ok(())
    }

    /// The same scenario with another aggregation factor and demand mode
    pub fn with_aggregation(&self, aggregation: usize, demand_mode: DemandMode) -> Scenario {
        Scenario {
            aggregation,
            demand_mode,
            ..self.clone()
        }
    }
}

fn check_value(field: &str, value: f64) -> std::result::Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
        })
    }
}

fn check_series(
    field: &str,
    values: &[f64],
    expected: usize,
) -> std::result::Result<(), ConfigurationError> {
    if values.len() != expected {
        return Err(ConfigurationError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual: values.len(),
        });
    }
    for (t, v) in values.iter().enumerate() {
        check_value(&format!("{field}[{t}]"), *v)?;
    }
    Ok(())
}

fn check_supplier(
    supplier: &SupplierOffer,
    periods: usize,
) -> std::result::Result<(), ConfigurationError> {
    let name = &supplier.name;
    check_series(
        &format!("{name}.cumulative_capacity"),
        &supplier.cumulative_capacity,
        periods,
    )?;
    if let Some(period) = supplier
        .cumulative_capacity
        .windows(2)
        .position(|w| w[1] < w[0])
    {
        return Err(ConfigurationError::NonMonotonicCapacity {
            supplier: name.clone(),
            period: period + 1,
        });
    }

    check_value(&format!("{name}.primary_cost"), supplier.primary_cost)?;
    check_value(&format!("{name}.secondary_cost"), supplier.secondary_cost)?;
    check_value(&format!("{name}.min_order"), supplier.min_order)?;
    if let Some(max) = supplier.max_order {
        check_value(&format!("{name}.max_order"), max)?;
        if supplier.min_order > max {
            return Err(ConfigurationError::InvertedOrderBounds {
                supplier: name.clone(),
                min: supplier.min_order,
                max,
            });
        }
    }

    if supplier.price_breaks.is_empty() {
        return Err(ConfigurationError::NoPriceBreaks(name.clone()));
    }
    let mut lower = 0.0;
    for (g, PriceBreak { upper, price }) in supplier.price_breaks.iter().enumerate() {
        check_value(&format!("{name}.price_breaks[{g}].upper"), *upper)?;
        check_value(&format!("{name}.price_breaks[{g}].price"), *price)?;
        if *upper <= lower {
            return Err(ConfigurationError::NonMonotonicPriceBreaks {
                supplier: name.clone(),
                index: g,
            });
        }
        lower = *upper;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three stages, two base periods, one supplier with two price intervals
    pub fn small_scenario() -> Scenario {
        Scenario {
            stages: 3,
            base_periods: 2,
            aggregation: 1,
            demand_mode: DemandMode::EndLoaded,
            demand: vec![50.0, 100.0],
            holding_cost: vec![1.0, 1.0],
            transport_capacity: vec![150.0, 150.0],
            suppliers: vec![SupplierOffer {
                name: "A".to_string(),
                cumulative_capacity: vec![200.0, 200.0],
                primary_cost: 300.0,
                secondary_cost: 100.0,
                min_order: 10.0,
                max_order: Some(500.0),
                price_breaks: vec![
                    PriceBreak {
                        upper: 60.0,
                        price: 10.0,
                    },
                    PriceBreak {
                        upper: 200.0,
                        price: 8.0,
                    },
                ],
            }],
            procurement: ProcurementPolicy::default(),
            freight: vec![
                FreightBand {
                    min: 1.0,
                    max: 80.0,
                    fixed_cost: 300.0,
                    unit_cost: 0.0,
                },
                FreightBand {
                    min: 81.0,
                    max: 200.0,
                    fixed_cost: 0.0,
                    unit_cost: 4.0,
                },
            ],
            sites: vec![ProductionSite {
                name: "plant".to_string(),
                fixed_cost: vec![500.0, 500.0],
                unit_cost: vec![2.0, 2.0],
                capacity: vec![200.0, 200.0],
            }],
            inventory: InventoryPolicy {
                capacity: 500.0,
                initial: vec![0.0, 0.0, 50.0],
                ending_buffer: 0.0,
            },
        }
    }

    #[test]
    fn valid_scenario_passes() {
        assert_eq!(small_scenario().validate(), Ok(()));
    }

    #[test]
    fn unsupported_stage_count() {
        let mut scenario = small_scenario();
        scenario.stages = 6;
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::UnsupportedStageCount(6))
        );
    }

    #[test]
    fn wrong_series_length() {
        let mut scenario = small_scenario();
        scenario.demand.push(10.0);
        assert!(matches!(
            scenario.validate(),
            Err(ConfigurationError::LengthMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn price_breaks_must_increase() {
        let mut scenario = small_scenario();
        scenario.suppliers[0].price_breaks[1].upper = 60.0;
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::NonMonotonicPriceBreaks {
                supplier: "A".to_string(),
                index: 1
            })
        );

        scenario.suppliers[0].price_breaks.clear();
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::NoPriceBreaks("A".to_string()))
        );
    }

    #[test]
    fn capacity_must_not_shrink() {
        let mut scenario = small_scenario();
        scenario.suppliers[0].cumulative_capacity = vec![200.0, 150.0];
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::NonMonotonicCapacity {
                supplier: "A".to_string(),
                period: 1
            })
        );
    }

    #[test]
    fn freight_bands_must_be_ordered() {
        let mut scenario = small_scenario();
        scenario.freight[1].min = 50.0;
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::OverlappingFreightBands { index: 1 })
        );

        // touching bands share their bound
        scenario.freight[1].min = 80.0;
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::OverlappingFreightBands { index: 1 })
        );
        scenario.freight[1].min = 80.5;
        assert_eq!(scenario.validate(), Ok(()));

        scenario.freight[1].min = 300.0;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigurationError::InvertedFreightBand { index: 1, .. })
        ));
    }

    #[test]
    fn site_count_follows_topology() {
        let mut scenario = small_scenario();
        scenario.stages = 5;
        scenario.inventory.initial = vec![0.0; 5];
        assert_eq!(
            scenario.validate(),
            Err(ConfigurationError::SiteCountMismatch {
                stages: 5,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut scenario = small_scenario();
        scenario.holding_cost[0] = -1.0;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        let mut scenario = small_scenario();
        scenario.suppliers[0].min_order = 600.0;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigurationError::InvertedOrderBounds { .. })
        ));
    }

    #[test]
    fn json_round_trip() {
        let scenario = small_scenario();
        let document = serde_json::to_string(&scenario).unwrap();
        assert_eq!(Scenario::from_json(&document).unwrap(), scenario);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Scenario::from_json("{\"stages\": 3"),
            Err(crate::error::Error::Json(_))
        ));
    }
}
