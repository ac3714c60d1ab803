use crate::config::OptimizationConfig;
use crate::error::{InfeasibilitySource, OptimizerError, Result};
use crate::problem::{Comparison, DecisionVar, LinearConstraint, LinearExpr, ProblemSpec, VarIndex};
use player_pool::{Candidate, Position};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Constraint Builder - turns a candidate pool and configuration into an
/// integer program
///
/// There is exactly one binary variable per candidate. FLEX is never a
/// variable of its own: it is implied by the RB/WR/TE aggregate, so a player
/// can never be selected twice.
pub struct ConstraintBuilder<'a> {
    config: &'a OptimizationConfig,
}

/// Candidate indices grouped the ways the constraints need them
struct PoolIndex {
    by_position: BTreeMap<Position, Vec<VarIndex>>,
    by_team_position: BTreeMap<(String, Position), Vec<VarIndex>>,
    /// Offensive players keyed by the team they face
    offense_by_opponent: BTreeMap<String, Vec<VarIndex>>,
}

impl PoolIndex {
    fn new(candidates: &[Candidate]) -> Self {
        let mut by_position: BTreeMap<Position, Vec<VarIndex>> = BTreeMap::new();
        let mut by_team_position: BTreeMap<(String, Position), Vec<VarIndex>> = BTreeMap::new();
        let mut offense_by_opponent: BTreeMap<String, Vec<VarIndex>> = BTreeMap::new();

        for (i, c) in candidates.iter().enumerate() {
            by_position.entry(c.position).or_default().push(i);
            by_team_position.entry((c.team.clone(), c.position)).or_default().push(i);
            if c.position.is_offense() {
                offense_by_opponent.entry(c.opponent_team.clone()).or_default().push(i);
            }
        }

        Self { by_position, by_team_position, offense_by_opponent }
    }

    fn position(&self, position: Position) -> &[VarIndex] {
        self.by_position.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    fn team_position(&self, team: &str, position: Position) -> &[VarIndex] {
        self.by_team_position
            .get(&(team.to_string(), position))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Teams that have at least one candidate at `position`, in name order
    fn teams_with(&self, position: Position) -> impl Iterator<Item = &str> {
        self.by_team_position
            .keys()
            .filter(move |(_, p)| *p == position)
            .map(|(team, _)| team.as_str())
    }
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(config: &'a OptimizationConfig) -> Self {
        Self { config }
    }

    /// Build the full integer program for `candidates`.
    ///
    /// Fails before any solving when the configuration is invalid or the
    /// forced include/exclude sets contradict the roster rules.
    pub fn build(&self, candidates: &[Candidate]) -> Result<ProblemSpec> {
        self.config.validate()?;

        let fixed = self.fixed_values(candidates);
        let pool = PoolIndex::new(candidates);
        self.check_static_feasibility(candidates, &pool, &fixed)?;

        let variables = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| DecisionVar { name: c.player_id.clone(), fixed: fixed.get(&i).copied() })
            .collect();

        let mut objective = LinearExpr::new();
        for (i, c) in candidates.iter().enumerate() {
            objective.add(i, c.projection);
        }

        let mut constraints = Vec::new();
        self.roster_constraints(candidates, &pool, &mut constraints);
        self.flex_preference_constraints(&pool, &mut constraints);
        self.stacking_constraints(&pool, &mut constraints);
        self.opposing_dst_constraints(&pool, &mut constraints);

        info!(
            "Built lineup problem with {} variables and {} constraints",
            candidates.len(),
            constraints.len()
        );

        Ok(ProblemSpec { variables, objective, constraints })
    }

    /// Forced include/exclude resolved to candidate indices. Ids that are not
    /// in the pool are ignored.
    fn fixed_values(&self, candidates: &[Candidate]) -> HashMap<VarIndex, bool> {
        let index_by_id: HashMap<&str, VarIndex> =
            candidates.iter().enumerate().map(|(i, c)| (c.player_id.as_str(), i)).collect();

        let mut fixed = HashMap::new();
        let forced = [(&self.config.forced_include, true), (&self.config.forced_exclude, false)];
        for (ids, value) in forced {
            for id in ids {
                match index_by_id.get(id.as_str()) {
                    // include wins here; the static check reports the conflict
                    Some(&i) => {
                        fixed.entry(i).or_insert(value);
                    }
                    None => debug!("Forced player {} is not in the candidate pool, ignoring", id),
                }
            }
        }
        fixed
    }

    fn infeasible(&self, reason: String) -> OptimizerError {
        warn!("Configuration rejected before solving: {}", reason);
        OptimizerError::RosterInfeasible {
            detected_by: InfeasibilitySource::StaticCheck,
            reason,
            active_options: self.config.active_options(),
        }
    }

    /// Contradictions that can be found without a solver
    fn check_static_feasibility(
        &self,
        candidates: &[Candidate],
        pool: &PoolIndex,
        fixed: &HashMap<VarIndex, bool>,
    ) -> Result<()> {
        let rules = &self.config.rules;

        if let Some(id) = self
            .config
            .forced_include
            .intersection(&self.config.forced_exclude)
            .find(|id| candidates.iter().any(|c| &c.player_id == *id))
        {
            return Err(self.infeasible(format!(
                "player {id} is in both forced_include and forced_exclude"
            )));
        }

        let included: Vec<&Candidate> = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| fixed.get(i) == Some(&true))
            .map(|(_, c)| c)
            .collect();
        let count_included =
            |p: Position| included.iter().filter(|c| c.position == p).count() as u32;

        if included.len() as u32 > rules.roster_size {
            return Err(self.infeasible(format!(
                "forced_include has {} players but the roster holds {}",
                included.len(),
                rules.roster_size
            )));
        }

        let included_salary: u64 = included.iter().map(|c| c.salary as u64).sum();
        if included_salary > rules.salary_cap as u64 {
            return Err(self.infeasible(format!(
                "forced_include salary {} exceeds the salary cap {}",
                included_salary, rules.salary_cap
            )));
        }

        for position in Position::ALL {
            let limits = rules.limits(position);
            let forced = count_included(position);
            let mut cap = limits.max;
            let mut needed = limits.min;

            if let Some(preferred) = self.config.flex_position_preference {
                if position.is_flex_eligible() {
                    let exact = if position == preferred {
                        limits.min + rules.flex_slots
                    } else {
                        limits.min
                    };
                    cap = cap.min(exact);
                    needed = exact;
                }
            }

            if forced > cap {
                return Err(self.infeasible(format!(
                    "forced_include has {forced} {position} but at most {cap} can be rostered"
                )));
            }

            let available =
                pool.position(position).iter().filter(|&&i| fixed.get(&i) != Some(&false)).count()
                    as u32;
            if available < needed {
                return Err(self.infeasible(format!(
                    "only {available} {position} candidates available but {needed} required"
                )));
            }
        }

        let forced_flex: u32 = Position::FLEX_ELIGIBLE.iter().map(|&p| count_included(p)).sum();
        if forced_flex > rules.flex_pool_size() {
            return Err(self.infeasible(format!(
                "forced_include has {forced_flex} RB/WR/TE but only {} can be rostered",
                rules.flex_pool_size()
            )));
        }

        let is_available = |i: &VarIndex| fixed.get(i) != Some(&false);

        for qb in included.iter().filter(|c| c.position == Position::QB) {
            for &stack in &self.config.qb_stack_positions {
                if !pool.team_position(&qb.team, stack).iter().any(is_available) {
                    return Err(self.infeasible(format!(
                        "forced QB {} needs a {} stack partner from {} but none is available",
                        qb.player_id, stack, qb.team
                    )));
                }
            }
        }

        for dst in included.iter().filter(|c| c.position == Position::DST) {
            if self.config.require_dst_rb_stack
                && !pool.team_position(&dst.team, Position::RB).iter().any(is_available)
            {
                return Err(self.infeasible(format!(
                    "forced DST {} needs an RB from {} but none is available",
                    dst.player_id, dst.team
                )));
            }

            if self.config.exclude_opponents_of_starting_dst {
                if let Some(opponent) = included
                    .iter()
                    .find(|c| c.position.is_offense() && c.opponent_team == dst.team)
                {
                    return Err(self.infeasible(format!(
                        "forced DST {} ({}) and forced {} {} who faces it",
                        dst.player_id, dst.team, opponent.position, opponent.player_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Salary cap, roster size, FLEX aggregate and per-position bounds
    fn roster_constraints(
        &self,
        candidates: &[Candidate],
        pool: &PoolIndex,
        constraints: &mut Vec<LinearConstraint>,
    ) {
        let rules = &self.config.rules;

        let mut salary = LinearExpr::new();
        for (i, c) in candidates.iter().enumerate() {
            salary.add(i, c.salary as f64);
        }
        constraints.push(LinearConstraint::new(
            "salary_cap",
            salary,
            Comparison::LessEq,
            rules.salary_cap as f64,
        ));

        constraints.push(LinearConstraint::new(
            "roster_size",
            LinearExpr::sum_of(0..candidates.len()),
            Comparison::Equal,
            rules.roster_size as f64,
        ));

        let flex_pool =
            Position::FLEX_ELIGIBLE.iter().flat_map(|&p| pool.position(p).iter().copied());
        constraints.push(LinearConstraint::new(
            "flex_pool",
            LinearExpr::sum_of(flex_pool),
            Comparison::Equal,
            rules.flex_pool_size() as f64,
        ));

        for position in Position::ALL {
            let limits = rules.limits(position);
            let members = || LinearExpr::sum_of(pool.position(position).iter().copied());
            constraints.push(LinearConstraint::new(
                format!("position_max:{position}"),
                members(),
                Comparison::LessEq,
                limits.max as f64,
            ));
            if limits.min > 0 {
                constraints.push(LinearConstraint::new(
                    format!("position_min:{position}"),
                    members(),
                    Comparison::GreaterEq,
                    limits.min as f64,
                ));
            }
        }
    }

    /// Pin every flex-eligible position count so the FLEX slot goes to the
    /// preferred position
    fn flex_preference_constraints(
        &self,
        pool: &PoolIndex,
        constraints: &mut Vec<LinearConstraint>,
    ) {
        let Some(preferred) = self.config.flex_position_preference else {
            return;
        };
        let rules = &self.config.rules;

        for position in Position::FLEX_ELIGIBLE {
            let limits = rules.limits(position);
            let count =
                if position == preferred { limits.min + rules.flex_slots } else { limits.min };
            constraints.push(LinearConstraint::new(
                format!("flex_preference:{position}"),
                LinearExpr::sum_of(pool.position(position).iter().copied()),
                Comparison::Equal,
                count as f64,
            ));
        }
    }

    /// QB stacks and DST + RB stacks: `Σ partners − Σ anchors ≥ 0` per team
    fn stacking_constraints(&self, pool: &PoolIndex, constraints: &mut Vec<LinearConstraint>) {
        let mut stack = |name: String, anchor: &[VarIndex], partners: &[VarIndex]| {
            let mut expr = LinearExpr::sum_of(partners.iter().copied());
            expr.add_scaled(&LinearExpr::sum_of(anchor.iter().copied()), -1.0);
            constraints.push(LinearConstraint::new(name, expr, Comparison::GreaterEq, 0.0));
        };

        for team in pool.teams_with(Position::QB) {
            let qbs = pool.team_position(team, Position::QB);
            for &position in &self.config.qb_stack_positions {
                let partners = pool.team_position(team, position);
                stack(format!("qb_stack:{team}:{position}"), qbs, partners);
            }
        }

        if self.config.require_dst_rb_stack {
            for team in pool.teams_with(Position::DST) {
                stack(
                    format!("dst_rb_stack:{team}"),
                    pool.team_position(team, Position::DST),
                    pool.team_position(team, Position::RB),
                );
            }
        }
    }

    /// If team T's DST is rostered, no rostered offensive player may face T:
    /// `Σ x(offense vs T) + M · x(DST T) ≤ M`
    fn opposing_dst_constraints(&self, pool: &PoolIndex, constraints: &mut Vec<LinearConstraint>) {
        if !self.config.exclude_opponents_of_starting_dst {
            return;
        }

        for team in pool.teams_with(Position::DST) {
            let Some(opponents) = pool.offense_by_opponent.get(team) else {
                continue;
            };

            let big_m = (opponents.len() as u32).min(self.config.rules.roster_size) as f64;
            let mut expr = LinearExpr::sum_of(opponents.iter().copied());
            let dst = LinearExpr::sum_of(pool.team_position(team, Position::DST).iter().copied());
            expr.add_scaled(&dst, big_m);
            constraints.push(LinearConstraint::new(
                format!("opposing_dst:{team}"),
                expr,
                Comparison::LessEq,
                big_m,
            ));
        }
    }
}
