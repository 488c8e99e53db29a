use std::fmt;

use derive_more::Constructor;

use super::flow::FlowVars;
use super::freight::FreightVars;
use super::procurement::ProcurementVars;
use super::production::ProductionVars;
use super::sets_and_parameters::{Parameters, Sets};
use good_lp::Expression;

/// The linear cost of every category, kept apart so a solved plan can be broken down
/// with exactly the expressions the objective is made of.
#[derive(Clone, Constructor)]
pub struct CostTerms {
    pub procurement: Expression,
    /// production cost of every site
    pub production: Vec<Expression>,
    /// stock at every stage plus material in transit
    pub holding: Expression,
    pub transport: Expression,
}

impl fmt::Debug for CostTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostTerms")
            .field("procurement", &"<Expression>")
            .field("production", &format!("[{} sites]", self.production.len()))
            .field("holding", &"<Expression>")
            .field("transport", &"<Expression>")
            .finish()
    }
}

impl CostTerms {
    /// Collect the cost of every formulator. Each category covers exactly the stages,
    /// legs and sites its formulator created variables for.
    pub fn assemble(
        sets: &Sets,
        parameters: &Parameters,
        procurement: &ProcurementVars,
        production: &ProductionVars,
        flow: &FlowVars,
        freight: &FreightVars,
    ) -> CostTerms {
        CostTerms::new(
            procurement.cost(sets, parameters),
            sets.S
                .iter()
                .map(|s| production.site_cost(*s, sets, parameters))
                .collect(),
            flow.holding_cost(sets, parameters),
            freight.cost(sets, parameters),
        )
    }

    pub fn production_total(&self) -> Expression {
        self.production.iter().cloned().sum()
    }

    /// The minimization objective
    pub fn total(&self) -> Expression {
        self.procurement.clone()
            + self.production_total()
            + self.holding.clone()
            + self.transport.clone()
    }
}

#[cfg(test)]
mod tests {
    use good_lp::{variable, ProblemVariables};

    use super::*;
    use crate::lp::{coefficient, Assignment};

    #[test]
    fn total_is_the_sum_of_all_categories() {
        let mut problem = ProblemVariables::new();
        let (a, b, c) = (
            problem.add(variable()),
            problem.add(variable()),
            problem.add(variable()),
        );
        let terms = CostTerms::new(
            a * 2.0 + 10.0,
            vec![b * 3.0, b + c * 4.0],
            Expression::from(c),
            a * 0.5,
        );
        let total = terms.total();
        assert_eq!(coefficient(&total, a), 2.5);
        assert_eq!(coefficient(&total, b), 4.0);
        assert_eq!(coefficient(&total, c), 5.0);

        let values = Assignment::from_values([(a, 0.0), (b, 1.0), (c, 1.0)]);
        assert_eq!(values.eval(&total), 19.0);
        assert_eq!(values.eval(&terms.production_total()), 8.0);
    }
}
