use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::problem::{BlockIndex, Quantity, TimeIndex};

/// How the demand of a base period is spread over its sub-periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandMode {
    /// The whole base-period demand lands on the last sub-period of the block
    EndLoaded,
    /// The base-period demand is divided evenly across the block
    Uniform,
    /// The base-period demand is divided by the given weights, one per sub-period.
    /// Weights are normalised, so only their ratios matter.
    Weighted(Vec<f64>),
}

/// A base horizon of `base_periods` periods, each split into `aggregation` sub-periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodGrid {
    base_periods: usize,
    aggregation: usize,
}

impl PeriodGrid {
    pub fn new(base_periods: usize, aggregation: usize) -> Result<PeriodGrid, ConfigurationError> {
        if base_periods == 0 {
            return Err(ConfigurationError::EmptyHorizon);
        }
        if aggregation == 0 {
            return Err(ConfigurationError::ZeroAggregation);
        }
        Ok(PeriodGrid {
            base_periods,
            aggregation,
        })
    }

    /// Number of base periods (blocks)
    pub fn base_periods(&self) -> usize {
        self.base_periods
    }

    /// The aggregation factor *m*
    pub fn aggregation(&self) -> usize {
        self.aggregation
    }

    /// Number of sub-periods, `base_periods * m`
    pub fn periods(&self) -> usize {
        self.base_periods * self.aggregation
    }

    /// The block (base period) containing sub-period `t`
    pub fn block_of(&self, t: TimeIndex) -> BlockIndex {
        t / self.aggregation
    }

    /// The sub-periods of block `b`
    pub fn block(&self, b: BlockIndex) -> Range<TimeIndex> {
        b * self.aggregation..(b + 1) * self.aggregation
    }

    /// The first sub-period of block `b`
    pub fn first_of(&self, b: BlockIndex) -> TimeIndex {
        b * self.aggregation
    }

    /// Repeat every base-period value once per sub-period
    pub fn expand<T: Clone>(&self, values: &[T]) -> Vec<T> {
        values
            .iter()
            .flat_map(|v| std::iter::repeat(v.clone()).take(self.aggregation))
            .collect()
    }

    /// Divide every base-period value evenly over its sub-periods
    pub fn split(&self, values: &[f64]) -> Vec<f64> {
        let m = self.aggregation as f64;
        values
            .iter()
            .flat_map(|v| std::iter::repeat(v / m).take(self.aggregation))
            .collect()
    }

    /// Spread base-period demand over sub-periods.
    ///
    /// The last sub-period of each block receives the exact remainder of the
    /// running sum, so the sub-period demands of a block always add up to the
    /// base-period value.
    pub fn distribute(
        &self,
        demand: &[Quantity],
        mode: &DemandMode,
    ) -> Result<Vec<Quantity>, ConfigurationError> {
        let m = self.aggregation;
        let weights = match mode {
            DemandMode::EndLoaded => {
                let mut w = vec![0.0; m];
                w[m - 1] = 1.0;
                w
            }
            DemandMode::Uniform => vec![1.0 / m as f64; m],
            DemandMode::Weighted(weights) => {
                let total: f64 = weights.iter().sum();
                let valid = weights.len() == m
                    && weights.iter().all(|w| w.is_finite() && *w >= 0.0)
                    && total > 0.0;
                if !valid {
                    return Err(ConfigurationError::InvalidDemandWeights { expected: m });
                }
                weights.iter().map(|w| w / total).collect()
            }
        };

        let mut out = Vec::with_capacity(self.periods());
        for &value in demand {
            let mut assigned = 0.0;
            for w in &weights[..m - 1] {
                let share = match mode {
                    DemandMode::Uniform => value / m as f64,
                    _ => value * w,
                };
                out.push(share);
                assigned += share;
            }
            out.push(value - assigned);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_arithmetic() {
        let grid = PeriodGrid::new(5, 3).unwrap();
        assert_eq!(grid.periods(), 15);
        assert_eq!(grid.block_of(0), 0);
        assert_eq!(grid.block_of(5), 1);
        assert_eq!(grid.block_of(14), 4);
        assert_eq!(grid.block(2), 6..9);
        assert_eq!(grid.first_of(4), 12);
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert_eq!(
            PeriodGrid::new(0, 2),
            Err(ConfigurationError::EmptyHorizon)
        );
        assert_eq!(
            PeriodGrid::new(5, 0),
            Err(ConfigurationError::ZeroAggregation)
        );
    }

    #[test]
    fn block_sums_are_exact() {
        let demand = [100.0, 200.0, 250.0, 300.0, 200.0, 1.0 / 3.0, 7.1];
        for m in 1..=12 {
            let grid = PeriodGrid::new(demand.len(), m).unwrap();
            for mode in [DemandMode::EndLoaded, DemandMode::Uniform] {
                let spread = grid.distribute(&demand, &mode).unwrap();
                assert_eq!(spread.len(), grid.periods());
                for (b, base) in demand.iter().enumerate() {
                    let sum: f64 = spread[grid.block(b)].iter().sum();
                    assert_eq!(sum, *base, "m = {m}, mode = {mode:?}, block {b}");
                }
            }
        }
    }

    #[test]
    fn end_loaded_puts_demand_last() {
        let grid = PeriodGrid::new(2, 3).unwrap();
        let spread = grid
            .distribute(&[30.0, 60.0], &DemandMode::EndLoaded)
            .unwrap();
        assert_eq!(spread, vec![0.0, 0.0, 30.0, 0.0, 0.0, 60.0]);
    }

    #[test]
    fn weighted_is_normalised() {
        let grid = PeriodGrid::new(1, 2).unwrap();
        let spread = grid
            .distribute(&[100.0], &DemandMode::Weighted(vec![3.0, 2.0]))
            .unwrap();
        assert!((spread[0] - 60.0).abs() < 1e-9);
        assert!((spread[1] - 40.0).abs() < 1e-9);

        let bad = grid.distribute(&[100.0], &DemandMode::Weighted(vec![1.0]));
        assert_eq!(
            bad,
            Err(ConfigurationError::InvalidDemandWeights { expected: 2 })
        );
    }

    #[test]
    fn expand_and_split() {
        let grid = PeriodGrid::new(2, 2).unwrap();
        assert_eq!(grid.expand(&[1, 2]), vec![1, 1, 2, 2]);
        assert_eq!(grid.split(&[300.0, 100.0]), vec![150.0, 150.0, 50.0, 50.0]);
    }
}
