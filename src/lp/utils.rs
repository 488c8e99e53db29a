use std::ops::Range;

use good_lp::Variable;

use super::{Assignment, Model, VarKind};
use crate::error::Result;

/// Blocks of `good_lp` variables named `base_i_j..` after their indices
pub trait AddVars {
    type Out;

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Result<Self::Out>;

    fn binary(&self, model: &mut Model, base_name: &str) -> Result<Self::Out> {
        self.vars(model, base_name, VarKind::Binary, &(0.0..1.0))
    }

    /// Continuous and non-negative
    fn cont(&self, model: &mut Model, base_name: &str) -> Result<Self::Out> {
        self.vars(model, base_name, VarKind::Continuous, &(0.0..f64::INFINITY))
    }

    /// Continuous within `bounds`, upper bound included
    fn bounded(&self, model: &mut Model, base_name: &str, bounds: &Range<f64>) -> Result<Self::Out> {
        self.vars(model, base_name, VarKind::Continuous, bounds)
    }
}

impl AddVars for usize {
    type Out = Vec<Variable>;

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Result<Self::Out> {
        (0..*self)
            .map(|i| model.add_var(&format!("{base_name}_{i}"), kind, bounds.start, bounds.end))
            .collect()
    }
}

impl AddVars for (usize, usize) {
    type Out = Vec<<usize as AddVars>::Out>;

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Result<Self::Out> {
        (0..self.0)
            .map(|i| self.1.vars(model, &format!("{base_name}_{i}"), kind, bounds))
            .collect()
    }
}

impl AddVars for (usize, usize, usize) {
    type Out = Vec<<(usize, usize) as AddVars>::Out>;

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Result<Self::Out> {
        (0..self.0)
            .map(|i| (self.1, self.2).vars(model, &format!("{base_name}_{i}"), kind, bounds))
            .collect()
    }
}

/// Trait that converts model variables to their solved values
pub trait ConvertVars {
    type Out;
    fn convert(&self, assignment: &Assignment) -> Self::Out;
}

impl<T: ConvertVars> ConvertVars for Vec<T> {
    type Out = Vec<T::Out>;

    fn convert(&self, assignment: &Assignment) -> Self::Out {
        self.iter().map(|e| e.convert(assignment)).collect()
    }
}

impl<T: ConvertVars> ConvertVars for Option<T> {
    type Out = Option<T::Out>;

    fn convert(&self, assignment: &Assignment) -> Self::Out {
        self.as_ref().map(|e| e.convert(assignment))
    }
}

impl ConvertVars for Variable {
    type Out = f64;

    fn convert(&self, assignment: &Assignment) -> Self::Out {
        assignment.value(*self)
    }
}
