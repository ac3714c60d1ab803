//! Lineup Optimizer - DraftKings NFL classic lineups as a 0/1 integer program
//!
//! The [`ConstraintBuilder`] turns a candidate pool and an
//! [`OptimizationConfig`] into a solver-agnostic [`ProblemSpec`], a
//! [`LineupSolver`] solves it exactly, and the [`RosterExtractor`] labels the
//! selected players with roster slots and re-checks every roster invariant.
//! [`LineupOptimizer`] runs the whole pipeline from the raw feeds.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod models;
pub mod problem;
pub mod solver;

pub use builder::ConstraintBuilder;
pub use config::{OptimizationConfig, PositionLimits, RosterRules};
pub use engine::{LineupOptimizer, LineupResult};
pub use error::{InfeasibilitySource, OptimizerError, Result};
pub use extractor::{validate_roster, RosterExtractor};
pub use models::{Roster, RosterSlot, Slot};
pub use problem::{Comparison, DecisionVar, LinearConstraint, LinearExpr, ProblemSpec};
pub use solver::{LineupSolver, MicroLpSolver, SolveStatus, SolverOutcome};
