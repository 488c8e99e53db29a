use good_lp::IntoAffineExpression;
use grb::prelude::*;
use log::info;

use super::{Outcome, SolverBackend};
use crate::error::{Error, Result};
use crate::lp::{self, Assignment, Sense, VarKind};

/// `expr` over the Gurobi variables, without its constant
fn linear(model: &lp::Model, vars: &[Var], expr: &good_lp::Expression) -> Expr {
    expr.linear_coefficients()
        .filter_map(|(v, coeff)| model.position(v).map(|i| coeff * vars[i]))
        .grb_sum()
}

/// Gurobi through the `grb` bindings
#[derive(Debug, Clone, Default)]
pub struct Gurobi {
    time_limit: Option<f64>,
    verbose: bool,
}

impl Gurobi {
    pub fn new(time_limit: Option<f64>, verbose: bool) -> Gurobi {
        Gurobi {
            time_limit,
            verbose,
        }
    }

    fn build(&self, model: &lp::Model) -> grb::Result<(Model, Vec<Var>)> {
        let mut grb_model = Model::new(model.name())?;
        grb_model.set_param(param::OutputFlag, self.verbose as i32)?;
        if let Some(limit) = self.time_limit {
            grb_model.set_param(param::TimeLimit, limit)?;
        }

        let vars = model
            .vars()
            .iter()
            .map(|var| {
                let vtype = match var.kind {
                    VarKind::Binary => VarType::Binary,
                    VarKind::Continuous => VarType::Continuous,
                };
                grb_model.add_var(&var.name, vtype, 0.0, var.lb, var.ub, std::iter::empty())
            })
            .collect::<grb::Result<Vec<_>>>()?;

        for constraint in model.constraints() {
            let lhs = linear(model, &vars, &constraint.expr);
            let rhs = constraint.rhs();
            let constr = match constraint.sense {
                Sense::Le => c!(lhs <= rhs),
                Sense::Ge => c!(lhs >= rhs),
                Sense::Eq => c!(lhs == rhs),
            };
            grb_model.add_constr(&constraint.name, constr)?;
        }

        let objective = linear(model, &vars, model.objective());
        grb_model.set_objective(objective, Minimize)?;
        grb_model.update()?;

        Ok((grb_model, vars))
    }
}

/// The model's own variables, in definition order
fn handles(model: &lp::Model) -> Vec<good_lp::Variable> {
    model.vars().iter().map(|def| def.var).collect()
}

impl SolverBackend for Gurobi {
    fn name(&self) -> &str {
        "gurobi"
    }

    fn solve(&self, model: &lp::Model) -> Result<Outcome<Assignment>> {
        info!(
            "Solving {} with gurobi: {} variables ({} binary), {} constraints",
            model.name(),
            model.num_vars(),
            model.num_binaries(),
            model.num_constrs()
        );

        let (mut grb_model, vars) = self.build(model)?;
        grb_model.optimize()?;

        match grb_model.status()? {
            Status::Optimal => (),
            Status::Infeasible | Status::InfOrUnbd => return Ok(Outcome::Infeasible),
            Status::Unbounded => return Ok(Outcome::Unbounded),
            status => {
                return Err(Error::Backend {
                    backend: "gurobi".to_string(),
                    message: format!("no proven optimum, status {:?}", status),
                })
            }
        }

        let values = vars
            .iter()
            .map(|var| grb_model.get_obj_attr(attr::X, var))
            .collect::<grb::Result<Vec<f64>>>()?;
        let assignment = model.assignment(&handles(model), |v| {
            model.position(v).map(|i| values[i]).unwrap_or(0.0)
        });

        info!("Finished optimizing {}, objective {}", model.name(), assignment.objective);
        Ok(Outcome::Optimal(assignment))
    }
}
