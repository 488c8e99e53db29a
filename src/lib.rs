//! Formulation of multi-echelon supply chain planning as a mixed-integer linear program.
//!
//! A [`Scenario`] describes one instance: a chain of 3, 4 or 5 stages, a base horizon split
//! into sub-periods, suppliers with incremental quantity discounts, an all-units freight
//! tariff and lot-sized production. [`Formulation::build`] turns it into an [`lp::Model`] of
//! named rows over `good_lp` expressions, and a [`solver::SolverBackend`] solves it.
//!
//! ```no_run
//! use scm_milp::{reference, DemandMode, Formulation, Outcome, SolverConfig};
//!
//! let scenario = reference::scenario(4, 1, DemandMode::EndLoaded);
//! let formulation = Formulation::build(&scenario)?;
//! let backend = SolverConfig::default().backend()?;
//! if let Outcome::Optimal(plan) = formulation.solve(backend.as_ref())? {
//!     println!("total cost {}", plan.breakdown.total);
//! }
//! # Ok::<(), scm_milp::Error>(())
//! ```

pub mod error;
pub mod formulation;
pub mod lp;
pub mod periods;
pub mod problem;
pub mod reference;
pub mod report;
pub mod sensitivity;
pub mod solver;
pub mod topology;

pub use error::{ConfigurationError, Error, Result};
pub use formulation::Formulation;
pub use periods::{DemandMode, PeriodGrid};
pub use problem::Scenario;
pub use report::{CostBreakdown, PurchasingPlan, SolvedPlan};
pub use solver::{Backend, Outcome, SolverBackend, SolverConfig};
pub use topology::Topology;
