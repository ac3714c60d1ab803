use crate::builder::ConstraintBuilder;
use crate::config::OptimizationConfig;
use crate::error::{InfeasibilitySource, OptimizerError, Result};
use crate::extractor::RosterExtractor;
use crate::models::Roster;
use crate::solver::{LineupSolver, MicroLpSolver, SolveStatus};
use player_pool::{Candidate, CandidateResolver, ProjectionIndex, ResolveStats, ResolverConfig};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, info_span, warn};

/// Everything produced by one optimization run
#[derive(Debug, Clone, Serialize)]
pub struct LineupResult {
    pub roster: Roster,

    /// Size of the candidate pool the solver chose from
    pub candidate_count: usize,

    pub resolve_stats: ResolveStats,
}

/// Lineup Optimizer - runs projections + slate through to a validated roster
///
/// Every run builds its own index, pool and problem; nothing is shared
/// between calls, so one optimizer can serve independent runs in parallel.
pub struct LineupOptimizer<S = MicroLpSolver> {
    config: OptimizationConfig,
    resolver: CandidateResolver,
    solver: S,
}

impl LineupOptimizer<MicroLpSolver> {
    pub fn new(config: OptimizationConfig, resolver_config: ResolverConfig) -> Self {
        Self::with_solver(config, resolver_config, MicroLpSolver::new())
    }
}

impl<S: LineupSolver> LineupOptimizer<S> {
    pub fn with_solver(
        config: OptimizationConfig,
        resolver_config: ResolverConfig,
        solver: S,
    ) -> Self {
        Self { config, resolver: CandidateResolver::new(resolver_config), solver }
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Full pipeline from the two raw feed bodies.
    ///
    /// A malformed feed fails the whole run; there is no partial recovery.
    pub fn optimize_feeds(&self, projection_body: &str, slate_body: &str) -> Result<LineupResult> {
        let _span = info_span!("optimize", solver = self.solver.name()).entered();

        let projections = ProjectionIndex::from_json(projection_body)?;
        let (candidates, resolve_stats) = self.resolver.resolve_json(slate_body, &projections)?;
        let roster = self.optimize(&candidates)?;

        Ok(LineupResult { roster, candidate_count: candidates.len(), resolve_stats })
    }

    /// Build, solve and extract for an already resolved candidate pool
    pub fn optimize(&self, candidates: &[Candidate]) -> Result<Roster> {
        let started = Instant::now();

        let problem = ConstraintBuilder::new(&self.config).build(candidates)?;
        let outcome = self.solver.solve(&problem);

        match outcome.status {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => {
                warn!("{} found no feasible roster", self.solver.name());
                return Err(OptimizerError::RosterInfeasible {
                    detected_by: InfeasibilitySource::Solver,
                    reason: format!(
                        "no roster of {} players from {} candidates satisfies the constraints",
                        self.config.rules.roster_size,
                        candidates.len()
                    ),
                    active_options: self.config.active_options(),
                });
            }
            SolveStatus::Error(message) => {
                error!("{} failed: {}", self.solver.name(), message);
                return Err(OptimizerError::Solver(message));
            }
        }

        if outcome.assignment.len() != candidates.len() {
            return Err(OptimizerError::InvariantViolation(format!(
                "solver returned {} values for {} variables",
                outcome.assignment.len(),
                candidates.len()
            )));
        }

        let violated = problem.violations(&outcome.assignment);
        if !violated.is_empty() {
            return Err(OptimizerError::InvariantViolation(format!(
                "optimal assignment breaks constraints: {}",
                violated.join(", ")
            )));
        }

        let roster =
            RosterExtractor::new(&self.config.rules).extract(candidates, &outcome.assignment)?;

        info!(
            "Optimal roster: {:.2} projected points, ${} salary ({:?})",
            roster.total_projection,
            roster.total_salary,
            started.elapsed()
        );
        Ok(roster)
    }
}
