//! Read-only views over a solved formulation.

use serde::{Deserialize, Serialize};

use crate::formulation::Formulation;
use crate::lp::{Assignment, ConvertVars};
use crate::problem::{BandIndex, Cost, Quantity, SupplierIndex, TimeIndex};

/// Total cost split by category. Every entry is the value of the same linear expression
/// the objective was assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub procurement: Cost,
    pub production: Cost,
    /// production cost of every site, in site order
    pub production_by_site: Vec<Cost>,
    pub holding: Cost,
    pub transport: Cost,
    pub total: Cost,
}

/// Quantity bought from every supplier in every sub-period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasingPlan {
    pub suppliers: Vec<String>,
    /// `quantities[t][j]` is bought from supplier j in sub-period t
    pub quantities: Vec<Vec<Quantity>>,
}

impl PurchasingPlan {
    /// Purchases of sub-period `t`, one entry per supplier
    pub fn period(&self, t: TimeIndex) -> &[Quantity] {
        &self.quantities[t]
    }

    /// Everything bought from supplier `j` over the horizon
    pub fn supplier_total(&self, j: SupplierIndex) -> Quantity {
        self.quantities.iter().map(|period| period[j]).sum()
    }

    pub fn total(&self) -> Quantity {
        self.quantities.iter().flatten().sum()
    }
}

/// The optimal plan of one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedPlan {
    pub assignment: Assignment,
    pub breakdown: CostBreakdown,
    pub purchases: PurchasingPlan,
    /// output of site s in sub-period t
    pub production: Vec<Vec<Quantity>>,
    /// inventory at stage k at the end of sub-period t
    pub inventory: Vec<Vec<Quantity>>,
    /// material leaving on leg l in sub-period t
    pub shipments: Vec<Vec<Quantity>>,
    /// band pricing each freight leg in each sub-period, `None` when nothing ships
    pub freight_bands: Vec<Vec<Option<BandIndex>>>,
}

impl SolvedPlan {
    /// `assignment` must hold one value per variable of the formulation's model
    pub fn new(formulation: &Formulation, assignment: Assignment) -> SolvedPlan {
        let costs = &formulation.costs;

        let production_by_site = costs
            .production
            .iter()
            .map(|expr| assignment.eval(expr))
            .collect::<Vec<_>>();
        let breakdown = CostBreakdown {
            procurement: assignment.eval(&costs.procurement),
            production: production_by_site.iter().sum(),
            production_by_site,
            holding: assignment.eval(&costs.holding),
            transport: assignment.eval(&costs.transport),
            total: assignment.objective,
        };

        let bought = formulation.procurement.q.convert(&assignment);
        let purchases = PurchasingPlan {
            suppliers: formulation
                .scenario
                .suppliers
                .iter()
                .map(|s| s.name.clone())
                .collect(),
            quantities: formulation
                .sets
                .T
                .iter()
                .map(|t| bought.iter().map(|q| q[*t]).collect())
                .collect(),
        };

        let freight_bands = formulation
            .freight
            .f
            .convert(&assignment)
            .into_iter()
            .map(|leg| {
                leg.into_iter()
                    .map(|bands| bands.iter().position(|f| *f > 0.5))
                    .collect()
            })
            .collect();

        SolvedPlan {
            production: formulation.production.x.convert(&assignment),
            inventory: formulation.flow.i.convert(&assignment),
            shipments: formulation.flow.flow.convert(&assignment),
            freight_bands,
            breakdown,
            purchases,
            assignment,
        }
    }

    pub fn total_cost(&self) -> Cost {
        self.breakdown.total
    }
}
