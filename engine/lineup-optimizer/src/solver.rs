//! Solver adapter seam and the default exact backend

use crate::problem::{Comparison, LinearExpr, ProblemSpec};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use std::time::Instant;
use tracing::{debug, error, info};

/// Outcome classification reported by a solver
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// Proven optimal assignment
    Optimal,
    /// Proven that no assignment satisfies the constraints
    Infeasible,
    /// The solver failed; fatal for the run
    Error(String),
}

/// What a solver hands back: a status, one 0/1 value per variable and the
/// objective value of that assignment
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    pub assignment: Vec<bool>,
    pub objective_value: f64,
}

impl SolverOutcome {
    pub fn optimal(assignment: Vec<bool>, objective_value: f64) -> Self {
        Self { status: SolveStatus::Optimal, assignment, objective_value }
    }

    pub fn infeasible() -> Self {
        Self { status: SolveStatus::Infeasible, assignment: Vec::new(), objective_value: 0.0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolveStatus::Error(message.into()),
            assignment: Vec::new(),
            objective_value: 0.0,
        }
    }
}

/// Anything that can solve a [`ProblemSpec`] exactly.
///
/// Implementations may block for a long time; callers that need a deadline
/// run them on a blocking thread and treat a timeout as a fatal error.
pub trait LineupSolver: Send + Sync {
    fn solve(&self, problem: &ProblemSpec) -> SolverOutcome;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "solver"
    }
}

/// Exact branch-and-bound through `good_lp` with the pure-Rust microlp backend
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms.len());
    for &(var, coefficient) in &expr.terms {
        out += coefficient * handles[var];
    }
    out
}

impl LineupSolver for MicroLpSolver {
    fn solve(&self, problem: &ProblemSpec) -> SolverOutcome {
        let started = Instant::now();

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = problem
            .variables
            .iter()
            .map(|v| {
                let (lower, upper) = v.bounds();
                vars.add(variable().integer().min(lower as f64).max(upper as f64))
            })
            .collect();

        if let Some(&(var, _)) = problem
            .objective
            .terms
            .iter()
            .chain(problem.constraints.iter().flat_map(|c| c.expr.terms.iter()))
            .find(|(var, _)| *var >= handles.len())
        {
            return SolverOutcome::error(format!("term references unknown variable {var}"));
        }

        let objective = to_expression(&problem.objective, &handles);
        let mut model = vars.maximise(objective).using(microlp);

        for row in &problem.constraints {
            let lhs = to_expression(&row.expr, &handles);
            let c = match row.comparison {
                Comparison::LessEq => constraint::leq(lhs, row.rhs),
                Comparison::GreaterEq => constraint::geq(lhs, row.rhs),
                Comparison::Equal => constraint::eq(lhs, row.rhs),
            };
            model = model.with(c);
        }

        debug!(
            "Solving {} variables / {} constraints with {}",
            handles.len(),
            problem.constraints.len(),
            self.name()
        );

        match model.solve() {
            Ok(solution) => {
                let assignment: Vec<bool> =
                    handles.iter().map(|&h| solution.value(h) > 0.5).collect();
                let objective_value = problem.objective.evaluate(&assignment);
                info!(
                    "Solved to optimality in {:?}, objective {:.2}",
                    started.elapsed(),
                    objective_value
                );
                SolverOutcome::optimal(assignment, objective_value)
            }
            Err(ResolutionError::Infeasible) => {
                info!("Solver proved infeasibility in {:?}", started.elapsed());
                SolverOutcome::infeasible()
            }
            Err(e) => {
                error!("Solver failed after {:?}: {}", started.elapsed(), e);
                SolverOutcome::error(e.to_string())
            }
        }
    }

    fn name(&self) -> &'static str {
        "microlp"
    }
}
