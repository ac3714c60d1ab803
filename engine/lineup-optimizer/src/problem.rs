//! Solver-agnostic integer program description
//!
//! A [`ProblemSpec`] holds one binary variable per candidate (indexed like the
//! candidate pool), a linear objective to maximize, and named linear
//! constraints. Backends translate it into their own model.

use serde::Serialize;
use std::fmt;

/// Index of a decision variable; equals the candidate's index in the pool
pub type VarIndex = usize;

/// Binary decision variable for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionVar {
    /// Player id of the candidate this variable selects
    pub name: String,

    /// Fixed value from forced include/exclude, if any
    pub fixed: Option<bool>,
}

impl DecisionVar {
    /// Lower and upper bound as integers
    pub fn bounds(&self) -> (u8, u8) {
        match self.fixed {
            Some(true) => (1, 1),
            Some(false) => (0, 0),
            None => (0, 1),
        }
    }
}

/// Sum of `coefficient * variable` terms
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarIndex, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum_of(vars: impl IntoIterator<Item = VarIndex>) -> Self {
        Self { terms: vars.into_iter().map(|v| (v, 1.0)).collect() }
    }

    pub fn add(&mut self, var: VarIndex, coefficient: f64) -> &mut Self {
        self.terms.push((var, coefficient));
        self
    }

    /// Append every term of `other` scaled by `factor`
    pub fn add_scaled(&mut self, other: &LinearExpr, factor: f64) -> &mut Self {
        self.terms.extend(other.terms.iter().map(|&(v, c)| (v, c * factor)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate against a 0/1 assignment
    pub fn evaluate(&self, assignment: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| assignment.get(*v).copied().unwrap_or(false))
            .map(|(_, c)| c)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::LessEq => write!(f, "<="),
            Comparison::GreaterEq => write!(f, ">="),
            Comparison::Equal => write!(f, "=="),
        }
    }
}

/// `expr <cmp> rhs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    /// Stable label naming the rule this row encodes, e.g. `salary_cap`
    pub name: String,
    pub expr: LinearExpr,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(
        name: impl Into<String>,
        expr: LinearExpr,
        comparison: Comparison,
        rhs: f64,
    ) -> Self {
        Self { name: name.into(), expr, comparison, rhs }
    }

    /// Whether the assignment satisfies this row (with a small tolerance)
    pub fn is_satisfied(&self, assignment: &[bool]) -> bool {
        const EPS: f64 = 1e-6;
        let lhs = self.expr.evaluate(assignment);
        match self.comparison {
            Comparison::LessEq => lhs <= self.rhs + EPS,
            Comparison::GreaterEq => lhs >= self.rhs - EPS,
            Comparison::Equal => (lhs - self.rhs).abs() <= EPS,
        }
    }
}

/// Complete integer program: maximize `objective` subject to `constraints`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProblemSpec {
    pub variables: Vec<DecisionVar>,
    pub objective: LinearExpr,
    pub constraints: Vec<LinearConstraint>,
}

impl ProblemSpec {
    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Names of constraints the assignment violates, including fixed bounds
    pub fn violations(&self, assignment: &[bool]) -> Vec<String> {
        let mut violated: Vec<String> = self
            .variables
            .iter()
            .zip(assignment)
            .filter(|(var, &value)| var.fixed.is_some_and(|fixed| fixed != value))
            .map(|(var, _)| format!("fixed:{}", var.name))
            .collect();

        violated.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(assignment))
                .map(|c| c.name.clone()),
        );
        violated
    }
}
