use derive_more::Constructor;
use itertools::iproduct;
use log::debug;

use super::flow::FlowVars;
use super::sets_and_parameters::{Parameters, Sets};
use crate::error::Result;
use good_lp::{Expression, Variable};

use crate::lp::{self, AddVars, Model};
use crate::problem::{Cost, FreightBand, LegIndex, Quantity};

/// All-units freight tariff on the freight legs. Indices run over `legs`, not over all legs.
#[derive(Debug, Clone, Constructor)]
pub struct FreightVars {
    /// the freight legs, in the order of the first index of `f` and `yf`
    pub legs: Vec<LegIndex>,
    /// 1 if band e prices the shipment on freight leg n in sub-period t
    pub f: Vec<Vec<Vec<Variable>>>,
    /// quantity shipped on freight leg n in sub-period t priced by band e
    pub yf: Vec<Vec<Vec<Variable>>>,
}

impl FreightVars {
    pub fn formulate(
        model: &mut Model,
        sets: &Sets,
        parameters: &Parameters,
        flow: &FlowVars,
    ) -> Result<FreightVars> {
        let legs = sets.L_freight.clone();
        let size = (legs.len(), sets.T.len(), sets.E.len());
        let f = size.binary(model, "f")?;
        let yf = size.cont(model, "yf")?;

        for ((n, l), t) in iproduct!(legs.iter().enumerate(), &sets.T) {
            // the banded quantities make up the shipment, and at most one band is used
            model.add_constr(
                &format!("banded_flow_{l}_{t}"),
                lp::eq(yf[n][*t].iter().copied().sum::<Expression>(), flow.flow[*l][*t]),
            )?;
            model.add_constr(
                &format!("one_band_{l}_{t}"),
                lp::leq(f[n][*t].iter().copied().sum::<Expression>(), 1.0),
            )?;

            for e in &sets.E {
                model.add_constr(
                    &format!("band_min_{l}_{t}_{e}"),
                    lp::leq(f[n][*t][*e] * parameters.F_min[*e], yf[n][*t][*e]),
                )?;
                model.add_constr(
                    &format!("band_max_{l}_{t}_{e}"),
                    lp::leq(yf[n][*t][*e], f[n][*t][*e] * parameters.F_max[*e]),
                )?;
            }
        }

        debug!("freight: {} legs, {} bands", legs.len(), sets.E.len());

        Ok(FreightVars::new(legs, f, yf))
    }

    /// Fixed and unit cost of every band in use
    pub fn cost(&self, sets: &Sets, parameters: &Parameters) -> Expression {
        iproduct!(0..self.legs.len(), &sets.T, &sets.E)
            .map(|(n, t, e)| {
                self.f[n][*t][*e] * parameters.F_fixed[*e]
                    + self.yf[n][*t][*e] * parameters.F_unit[*e]
            })
            .sum()
    }
}

/// All-units freight cost of shipping `quantity`: the first band containing it prices the whole shipment.
///
/// Shipping nothing is free. Returns `None` if no band contains `quantity`.
pub fn all_units_cost(bands: &[FreightBand], quantity: Quantity) -> Option<Cost> {
    if quantity == 0.0 {
        return Some(0.0);
    }
    bands
        .iter()
        .find(|band| band.min <= quantity && quantity <= band.max)
        .map(|band| band.fixed_cost + band.unit_cost * quantity)
}
