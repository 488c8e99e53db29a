use itertools::iproduct;
use log::debug;

use super::sets_and_parameters::{Parameters, Sets};
use crate::error::Result;
use good_lp::{Expression, Variable};

use crate::lp::{self, AddVars, Model, VarKind};
use crate::problem::{Cost, PriceBreak, Quantity, SupplierIndex};

/// Purchasing decisions and the incremental discount linearization
#[derive(Debug, Clone)]
pub struct ProcurementVars {
    /// quantity bought from supplier j in sub-period t
    pub q: Vec<Vec<Variable>>,
    /// 1 if an order is placed with supplier j in sub-period t
    pub z: Vec<Vec<Variable>>,
    /// 1 if price interval g contains the horizon total of supplier j
    pub select: Vec<Vec<Variable>>,
    /// quantity bought inside the selected interval g of supplier j
    pub remainder: Vec<Vec<Variable>>,
}

impl ProcurementVars {
    pub fn formulate(
        model: &mut Model,
        sets: &Sets,
        parameters: &Parameters,
    ) -> Result<ProcurementVars> {
        let (suppliers, periods) = (sets.J.len(), sets.T.len());
        let q = (suppliers, periods).cont(model, "q")?;
        let z = (suppliers, periods).binary(model, "z")?;

        let mut select = Vec::with_capacity(suppliers);
        let mut remainder = Vec::with_capacity(suppliers);
        for j in &sets.J {
            let intervals = sets.G[*j].len();
            select.push(intervals.binary(model, &format!("select_{j}"))?);
            remainder.push(
                (0..intervals)
                    .map(|g| {
                        model.add_var(
                            &format!("remainder_{j}_{g}"),
                            VarKind::Continuous,
                            0.0,
                            parameters.width[*j][g],
                        )
                    })
                    .collect::<Result<Vec<_>>>()?,
            );
        }

        // an order must respect the order size limits, and is only possible with the order flag set
        for (j, t) in iproduct!(&sets.J, &sets.T) {
            model.add_constr(
                &format!("order_min_{j}_{t}"),
                lp::leq(z[*j][*t] * parameters.Q_min[*j], q[*j][*t]),
            )?;
            model.add_constr(
                &format!("order_max_{j}_{t}"),
                lp::leq(q[*j][*t], z[*j][*t] * parameters.Q_max[*j]),
            )?;
            if !parameters.open[*j][*t] {
                model.add_constr(&format!("closed_{j}_{t}"), lp::leq(q[*j][*t], 0.0))?;
            }
        }

        // cumulative purchases may never exceed the cumulative capacity
        for j in &sets.J {
            let mut bought = Expression::default();
            for t in &sets.T {
                bought += q[*j][*t];
                model.add_constr(
                    &format!("cumulative_capacity_{j}_{t}"),
                    lp::leq(bought.clone(), parameters.C_cum[*j][*t]),
                )?;
            }
        }

        // incremental discount: the total sits in exactly one selected interval
        for j in &sets.J {
            for g in &sets.G[*j] {
                model.add_constr(
                    &format!("active_interval_{j}_{g}"),
                    lp::leq(remainder[*j][*g], select[*j][*g] * parameters.width[*j][*g]),
                )?;
            }

            model.add_constr(
                &format!("one_interval_{j}"),
                lp::leq(select[*j].iter().copied().sum::<Expression>(), 1.0),
            )?;

            let total = sets.T.iter().map(|t| q[*j][*t]).sum::<Expression>();
            let linearized = sets.G[*j]
                .iter()
                .map(|g| select[*j][*g] * parameters.lower[*j][*g] + remainder[*j][*g])
                .sum::<Expression>();
            model.add_constr(&format!("total_purchase_{j}"), lp::eq(total, linearized))?;
        }

        debug!(
            "procurement: {} suppliers, {} price intervals",
            suppliers,
            sets.G.iter().map(|g| g.len()).sum::<usize>()
        );

        Ok(ProcurementVars {
            q,
            z,
            select,
            remainder,
        })
    }

    /// Linearized incremental price of everything bought from supplier `j`
    pub fn price(&self, j: SupplierIndex, sets: &Sets, parameters: &Parameters) -> Expression {
        sets.G[j]
            .iter()
            .map(|g| {
                self.select[j][*g] * parameters.base_cost[j][*g]
                    + self.remainder[j][*g] * parameters.price[j][*g]
            })
            .sum()
    }

    /// Price plus ordering costs of supplier `j`
    pub fn supplier_cost(
        &self,
        j: SupplierIndex,
        sets: &Sets,
        parameters: &Parameters,
    ) -> Expression {
        let primary = self.select[j].iter().copied().sum::<Expression>() * parameters.c_primary[j];
        let secondary = self.z[j].iter().copied().sum::<Expression>() * parameters.c_secondary[j];
        self.price(j, sets, parameters) + primary + secondary
    }

    /// Total procurement cost
    pub fn cost(&self, sets: &Sets, parameters: &Parameters) -> Expression {
        sets.J
            .iter()
            .map(|j| self.supplier_cost(*j, sets, parameters))
            .sum()
    }
}

/// Incremental discount price of buying `quantity` in total. Every interval below the one
/// containing `quantity` is charged in full at its own price.
///
/// Returns `None` if `quantity` lies beyond the last break.
pub fn incremental_cost(breaks: &[PriceBreak], quantity: Quantity) -> Option<Cost> {
    let last = breaks.last().map(|b| b.upper).unwrap_or(0.0);
    if quantity < 0.0 || quantity > last {
        return None;
    }

    let mut lower = 0.0;
    let mut cost = 0.0;
    for PriceBreak { upper, price } in breaks {
        if quantity <= lower {
            break;
        }
        cost += (quantity.min(*upper) - lower) * price;
        lower = *upper;
    }
    Some(cost)
}
