//! Named rows over `good_lp` variables and expressions.
//!
//! The formulation mints its variables through a [`Model`] and adds every constraint under a
//! name, so that a solved or hand-made assignment can be audited row by row. Backends solve a
//! fresh `good_lp` problem built by [`Model::to_problem`], which leaves the model reusable.

pub mod utils;

pub use utils::{AddVars, ConvertVars};

use std::collections::HashMap;
use std::fmt;

use good_lp::{variable, Expression, IntoAffineExpression, ProblemVariables, Variable};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Absolute tolerance used when rounding binaries and auditing solutions
pub const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Continuous,
    Binary,
}

/// The definition a variable was created with
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lb: f64,
    pub ub: f64,
    pub var: Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// `expr (<=|>=|==) 0`
#[derive(Clone)]
pub struct Row {
    pub expr: Expression,
    pub sense: Sense,
}

pub fn leq(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Row {
    Row {
        expr: lhs.into() - rhs.into(),
        sense: Sense::Le,
    }
}

pub fn geq(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Row {
    Row {
        expr: lhs.into() - rhs.into(),
        sense: Sense::Ge,
    }
}

pub fn eq(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Row {
    Row {
        expr: lhs.into() - rhs.into(),
        sense: Sense::Eq,
    }
}

/// Coefficient of `var` in `expr`, zero if it does not appear
pub fn coefficient(expr: &Expression, var: Variable) -> f64 {
    expr.linear_coefficients()
        .filter(|(v, _)| *v == var)
        .map(|(_, coeff)| coeff)
        .sum()
}

/// A named row of the model
#[derive(Clone)]
pub struct Constraint {
    pub name: String,
    pub expr: Expression,
    pub sense: Sense,
}

impl Constraint {
    /// Coefficient of `var`, with the right-hand side moved to the left
    pub fn coeff(&self, var: Variable) -> f64 {
        coefficient(&self.expr, var)
    }

    /// The constant part, written as a right-hand side
    pub fn rhs(&self) -> f64 {
        -self.expr.constant()
    }

    /// How far `values` are from satisfying the row, zero when satisfied
    pub fn violation(&self, values: &HashMap<Variable, f64>) -> f64 {
        let lhs = self.expr.clone().eval_with(values);
        match self.sense {
            Sense::Le => lhs.max(0.0),
            Sense::Ge => (-lhs).max(0.0),
            Sense::Eq => lhs.abs(),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("sense", &self.sense)
            .field("rhs", &self.rhs())
            .finish()
    }
}

/// A value for every variable of a model, as returned by a solver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub values: HashMap<Variable, f64>,
    pub objective: f64,
}

impl Assignment {
    /// Value of `var`, zero when the assignment does not mention it
    pub fn value(&self, var: Variable) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }

    /// An assignment of `values`, with the objective left at zero
    pub fn from_values<I: IntoIterator<Item = (Variable, f64)>>(values: I) -> Assignment {
        Assignment {
            values: values.into_iter().collect(),
            objective: 0.0,
        }
    }

    pub fn set(&mut self, var: Variable, value: f64) {
        self.values.insert(var, value);
    }

    pub fn eval(&self, expr: &Expression) -> f64 {
        expr.eval_with(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A row or bound broken by an assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub name: String,
    pub amount: f64,
}

/// A `good_lp` problem equivalent to a [`Model`], ready for any `good_lp` solver
pub struct Problem {
    pub variables: ProblemVariables,
    /// `handles[i]` stands for the model's `i`-th variable
    pub handles: Vec<Variable>,
    pub objective: Expression,
    pub constraints: Vec<good_lp::Constraint>,
}

/// Minimization MILP: typed variables with bounds, named rows and one objective
pub struct Model {
    name: String,
    problem: ProblemVariables,
    vars: Vec<VarDef>,
    index: HashMap<Variable, usize>,
    constraints: Vec<Constraint>,
    objective: Expression,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("vars", &format!("[{} variables]", self.vars.len()))
            .field("constraints", &format!("[{} rows]", self.constraints.len()))
            .finish()
    }
}

impl Model {
    pub fn new(name: &str) -> Model {
        Model {
            name: name.to_string(),
            problem: ProblemVariables::new(),
            vars: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            objective: Expression::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_var(&mut self, name: &str, kind: VarKind, lb: f64, ub: f64) -> Result<Variable> {
        if lb.is_nan() || ub.is_nan() || lb == f64::INFINITY || ub == f64::NEG_INFINITY {
            return Err(Error::NonFinite {
                name: name.to_string(),
            });
        }
        if lb > ub {
            return Err(Error::InvalidBounds {
                name: name.to_string(),
                lb,
                ub,
            });
        }
        let (lb, ub) = match kind {
            VarKind::Binary => (lb.max(0.0), ub.min(1.0)),
            VarKind::Continuous => (lb, ub),
        };

        let var = self.problem.add(definition(name, kind, lb, ub));
        self.index.insert(var, self.vars.len());
        self.vars.push(VarDef {
            name: name.to_string(),
            kind,
            lb,
            ub,
            var,
        });
        Ok(var)
    }

    /// Add `row` under `name`
    pub fn add_constr(&mut self, name: &str, row: Row) -> Result<()> {
        self.check_expr(name, &row.expr)?;

        trace!("{name}: {:?} {}", row.sense, -row.expr.constant());
        self.constraints.push(Constraint {
            name: name.to_string(),
            expr: row.expr,
            sense: row.sense,
        });
        Ok(())
    }

    pub fn set_objective(&mut self, expr: impl Into<Expression>) -> Result<()> {
        let expr = expr.into();
        self.check_expr("objective", &expr)?;
        self.objective = expr;
        Ok(())
    }

    fn check_expr(&self, name: &str, expr: &Expression) -> Result<()> {
        if !expr.constant().is_finite() {
            return Err(Error::NonFinite {
                name: name.to_string(),
            });
        }
        for (var, coeff) in expr.linear_coefficients() {
            if !self.index.contains_key(&var) {
                return Err(Error::UnknownVariable(name.to_string()));
            }
            if !coeff.is_finite() {
                return Err(Error::NonFinite {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn var(&self, var: Variable) -> Option<&VarDef> {
        self.index.get(&var).map(|i| &self.vars[*i])
    }

    /// Position of `var` in [`Model::vars`]
    pub fn position(&self, var: Variable) -> Option<usize> {
        self.index.get(&var).copied()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.vars
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    /// An assignment with every variable at zero
    pub fn zeros(&self) -> Assignment {
        Assignment {
            values: self.vars.iter().map(|v| (v.var, 0.0)).collect(),
            objective: 0.0,
        }
    }

    /// Fails unless `assignment` has exactly one entry per variable of this model
    pub fn check_assignment(&self, assignment: &Assignment) -> Result<()> {
        let values = &assignment.values;
        if values.len() != self.vars.len() || values.keys().any(|v| !self.index.contains_key(v))
        {
            return Err(Error::AssignmentSize {
                expected: self.vars.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Every bound, integrality requirement and row broken by more than `tol`
    pub fn violations(&self, assignment: &Assignment, tol: f64) -> Result<Vec<Violation>> {
        self.check_assignment(assignment)?;
        let values = &assignment.values;

        let mut out = Vec::new();
        for def in &self.vars {
            let value = values.get(&def.var).copied().unwrap_or(0.0);
            let amount = (def.lb - value).max(value - def.ub).max(0.0);
            if amount > tol {
                out.push(Violation {
                    name: format!("bounds_{}", def.name),
                    amount,
                });
            }
            if def.kind == VarKind::Binary {
                let amount = (value - value.round()).abs();
                if amount > tol {
                    out.push(Violation {
                        name: format!("integrality_{}", def.name),
                        amount,
                    });
                }
            }
        }

        for constraint in &self.constraints {
            let amount = constraint.violation(values);
            if amount > tol {
                out.push(Violation {
                    name: constraint.name.clone(),
                    amount,
                });
            }
        }

        Ok(out)
    }

    /// Copy the model into a fresh `good_lp` problem. Solving consumes the problem, not the model.
    pub fn to_problem(&self) -> Problem {
        let mut variables = ProblemVariables::new();
        let handles = self
            .vars
            .iter()
            .map(|def| variables.add(definition(&def.name, def.kind, def.lb, def.ub)))
            .collect::<Vec<_>>();

        let objective = self.translate(&self.objective, &handles);
        let constraints = self
            .constraints
            .iter()
            .map(|c| {
                let expr = self.translate(&c.expr, &handles);
                match c.sense {
                    Sense::Le => expr.leq(0.0),
                    Sense::Ge => expr.geq(0.0),
                    Sense::Eq => expr.eq(0.0),
                }
            })
            .collect();

        Problem {
            variables,
            handles,
            objective,
            constraints,
        }
    }

    fn translate(&self, expr: &Expression, handles: &[Variable]) -> Expression {
        let mut out = Expression::from(expr.constant());
        for (var, coeff) in expr.linear_coefficients() {
            if let Some(i) = self.index.get(&var) {
                out += handles[*i] * coeff;
            }
        }
        out
    }

    /// Read an optimum back in terms of this model's variables. Binaries are rounded.
    pub fn assignment<F: Fn(Variable) -> f64>(&self, handles: &[Variable], value: F) -> Assignment {
        let values = self
            .vars
            .iter()
            .zip(handles)
            .map(|(def, handle)| {
                let value = value(*handle);
                let value = match def.kind {
                    VarKind::Binary => value.round(),
                    VarKind::Continuous => value,
                };
                (def.var, value)
            })
            .collect::<HashMap<_, _>>();
        let objective = self.objective.clone().eval_with(&values);
        Assignment { values, objective }
    }
}

fn definition(name: &str, kind: VarKind, lb: f64, ub: f64) -> good_lp::VariableDefinition {
    let def = match kind {
        VarKind::Binary => variable().binary(),
        VarKind::Continuous => variable(),
    };
    def.min(lb).max(ub).name(name)
}
