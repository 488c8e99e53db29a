//! Solver backends. A backend turns a finished [`Model`] into an optimal [`Assignment`]
//! or reports that none exists. `microlp` and `highs` are `good_lp` solvers.

#[cfg(feature = "gurobi")]
pub mod gurobi;
#[cfg(feature = "highs")]
pub mod highs;
pub mod microlp;

use good_lp::ResolutionError;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Error, Result};
use crate::lp::{Assignment, Model};

#[cfg(feature = "highs")]
pub use self::highs::Highs;
pub use self::microlp::MicroLp;

/// The result of a solve that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// A proven optimum
    Optimal(T),
    /// No assignment satisfies the constraints
    Infeasible,
    /// The objective can decrease without limit
    Unbounded,
}

impl<T> Outcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, func: F) -> Outcome<U> {
        match self {
            Outcome::Optimal(value) => Outcome::Optimal(func(value)),
            Outcome::Infeasible => Outcome::Infeasible,
            Outcome::Unbounded => Outcome::Unbounded,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, Outcome::Optimal(_))
    }

    /// The optimum, if there is one
    pub fn optimal(self) -> Option<T> {
        match self {
            Outcome::Optimal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Optimal(value) => Outcome::Optimal(value),
            Outcome::Infeasible => Outcome::Infeasible,
            Outcome::Unbounded => Outcome::Unbounded,
        }
    }
}

/// Infeasibility and unboundedness as outcomes, anything else as a backend error
pub(crate) fn unsolved(
    backend: &str,
    model: &Model,
    err: ResolutionError,
) -> Result<Outcome<Assignment>> {
    match err {
        ResolutionError::Infeasible => {
            info!("{} is infeasible", model.name());
            Ok(Outcome::Infeasible)
        }
        ResolutionError::Unbounded => {
            info!("{} is unbounded", model.name());
            Ok(Outcome::Unbounded)
        }
        err => Err(Error::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }),
    }
}

pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Minimize the model's objective. Infeasibility and unboundedness are outcomes, not errors.
    fn solve(&self, model: &Model) -> Result<Outcome<Assignment>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Pure Rust branch-and-bound, always available
    #[default]
    MicroLp,
    /// HiGHS, requires the `highs` feature
    Highs,
    /// Gurobi, requires the `gurobi` feature
    Gurobi,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Time limit in seconds
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Let the backend print its own log
    #[serde(default)]
    pub verbose: bool,
}

impl SolverConfig {
    /// Instantiate the configured backend
    pub fn backend(&self) -> Result<Box<dyn SolverBackend>> {
        match self.backend {
            Backend::MicroLp => Ok(Box::new(MicroLp::new(self.time_limit))),
            #[cfg(feature = "highs")]
            Backend::Highs => Ok(Box::new(Highs::new(self.time_limit, self.verbose))),
            #[cfg(not(feature = "highs"))]
            Backend::Highs => Err(ConfigurationError::MissingBackend("highs".to_string()).into()),
            #[cfg(feature = "gurobi")]
            Backend::Gurobi => Ok(Box::new(gurobi::Gurobi::new(self.time_limit, self.verbose))),
            #[cfg(not(feature = "gurobi"))]
            Backend::Gurobi => {
                Err(ConfigurationError::MissingBackend("gurobi".to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_available() {
        let backend = SolverConfig::default().backend().unwrap();
        assert_eq!(backend.name(), "microlp");
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn highs_needs_its_feature() {
        let config = SolverConfig {
            backend: Backend::Highs,
            ..Default::default()
        };
        assert!(matches!(
            config.backend(),
            Err(Error::Configuration(ConfigurationError::MissingBackend(_)))
        ));
    }

    #[cfg(not(feature = "gurobi"))]
    #[test]
    fn missing_backend_is_a_configuration_error() {
        let config = SolverConfig {
            backend: Backend::Gurobi,
            ..Default::default()
        };
        assert!(matches!(
            config.backend(),
            Err(crate::error::Error::Configuration(
                ConfigurationError::MissingBackend(_)
            ))
        ));
    }

    #[test]
    fn config_from_json() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"backend": "gurobi", "time_limit": 60.0}"#).unwrap();
        assert_eq!(config.backend, Backend::Gurobi);
        assert_eq!(config.time_limit, Some(60.0));
        assert!(!config.verbose);

        let config: SolverConfig = serde_json::from_str(r#"{"backend": "highs"}"#).unwrap();
        assert_eq!(config.backend, Backend::Highs);
    }

    #[test]
    fn solver_failures_map_to_outcomes() {
        let model = Model::new("failing");
        assert_eq!(
            unsolved("microlp", &model, ResolutionError::Infeasible).unwrap(),
            Outcome::Infeasible
        );
        assert_eq!(
            unsolved("microlp", &model, ResolutionError::Unbounded).unwrap(),
            Outcome::Unbounded
        );
        assert!(matches!(
            unsolved("microlp", &model, ResolutionError::Other("interrupted")),
            Err(Error::Backend { .. })
        ));
    }

    #[test]
    fn outcome_map() {
        assert_eq!(Outcome::Optimal(2).map(|v| v * 2), Outcome::Optimal(4));
        assert_eq!(Outcome::<i32>::Infeasible.map(|v| v * 2), Outcome::Infeasible);
        assert_eq!(Outcome::Optimal(1).optimal(), Some(1));
        assert!(!Outcome::<i32>::Unbounded.is_optimal());
    }
}
