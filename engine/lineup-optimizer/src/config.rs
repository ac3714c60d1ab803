use crate::error::{OptimizerError, Result};
use player_pool::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// DraftKings NFL classic salary cap
pub const DEFAULT_SALARY_CAP: u32 = 50_000;

/// DraftKings NFL classic roster size
pub const DEFAULT_ROSTER_SIZE: u32 = 9;

/// Inclusive bounds on how many players of one position a roster holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLimits {
    pub min: u32,
    pub max: u32,
}

impl PositionLimits {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Numeric roster constants for a contest type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    /// Maximum total salary
    pub salary_cap: u32,

    /// Players per roster
    pub roster_size: u32,

    /// FLEX slots, each fillable by RB, WR or TE beyond their minimums
    pub flex_slots: u32,

    pub qb: PositionLimits,
    pub rb: PositionLimits,
    pub wr: PositionLimits,
    pub te: PositionLimits,
    pub dst: PositionLimits,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            salary_cap: DEFAULT_SALARY_CAP,
            roster_size: DEFAULT_ROSTER_SIZE,
            flex_slots: 1,
            qb: PositionLimits::new(1, 1),
            rb: PositionLimits::new(2, 3),
            wr: PositionLimits::new(3, 4),
            te: PositionLimits::new(1, 2),
            dst: PositionLimits::new(1, 1),
        }
    }
}

impl RosterRules {
    /// Limits for a position
    pub fn limits(&self, position: Position) -> PositionLimits {
        match position {
            Position::QB => self.qb,
            Position::RB => self.rb,
            Position::WR => self.wr,
            Position::TE => self.te,
            Position::DST => self.dst,
        }
    }

    /// Number of rostered RB + WR + TE (their minimums plus the FLEX slots)
    pub fn flex_pool_size(&self) -> u32 {
        Position::FLEX_ELIGIBLE.iter().map(|&p| self.limits(p).min).sum::<u32>() + self.flex_slots
    }

    /// Check that the constants describe at least one roster shape
    pub fn validate(&self) -> Result<()> {
        if self.salary_cap == 0 {
            return Err(OptimizerError::InvalidRules("salary_cap must be positive".into()));
        }
        if self.roster_size == 0 {
            return Err(OptimizerError::InvalidRules("roster_size must be positive".into()));
        }

        for position in Position::ALL {
            let limits = self.limits(position);
            if limits.max < limits.min {
                return Err(OptimizerError::InvalidRules(format!(
                    "{position} max {} is below min {}",
                    limits.max, limits.min
                )));
            }
            if position.is_flex_eligible() && limits.max > limits.min + self.flex_slots {
                return Err(OptimizerError::InvalidRules(format!(
                    "{position} max {} exceeds min {} plus {} flex slot(s)",
                    limits.max, limits.min, self.flex_slots
                )));
            }
        }

        let fixed: u32 = Position::ALL.iter().map(|&p| self.limits(p).min).sum();
        if fixed + self.flex_slots != self.roster_size {
            return Err(OptimizerError::InvalidRules(format!(
                "position minimums ({fixed}) plus flex slots ({}) must equal roster_size ({})",
                self.flex_slots, self.roster_size
            )));
        }

        Ok(())
    }
}

/// Optional rules layered on top of the roster constants for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Force the FLEX slot to a specific position
    pub flex_position_preference: Option<Position>,

    /// Player ids that must be rostered (ids absent from the pool are ignored)
    pub forced_include: BTreeSet<String>,

    /// Player ids that must not be rostered
    pub forced_exclude: BTreeSet<String>,

    /// A rostered QB requires a teammate at each of these positions
    pub qb_stack_positions: BTreeSet<Position>,

    /// A rostered DST requires an RB from the same team
    pub require_dst_rb_stack: bool,

    /// A rostered DST forbids offensive players facing that defense
    pub exclude_opponents_of_starting_dst: bool,

    pub rules: RosterRules,
}

impl OptimizationConfig {
    /// Check the option values themselves, independent of any player pool
    pub fn validate(&self) -> Result<()> {
        self.rules.validate()?;

        if let Some(position) = self.flex_position_preference {
            if !position.is_flex_eligible() {
                return Err(OptimizerError::InvalidRules(format!(
                    "flex_position_preference must be RB, WR or TE, got {position}"
                )));
            }
        }

        if let Some(position) = self.qb_stack_positions.iter().find(|p| !p.is_flex_eligible()) {
            return Err(OptimizerError::InvalidRules(format!(
                "qb_stack_positions may only contain RB, WR or TE, got {position}"
            )));
        }

        Ok(())
    }

    /// Human-readable list of the optional rules in effect, used in errors
    pub fn active_options(&self) -> Vec<String> {
        let mut options = Vec::new();

        if let Some(position) = self.flex_position_preference {
            options.push(format!("flex_position_preference={position}"));
        }
        if !self.forced_include.is_empty() {
            options.push(format!("forced_include={}", join(&self.forced_include)));
        }
        if !self.forced_exclude.is_empty() {
            options.push(format!("forced_exclude={}", join(&self.forced_exclude)));
        }
        if !self.qb_stack_positions.is_empty() {
            options.push(format!("qb_stack_positions={}", join(&self.qb_stack_positions)));
        }
        if self.require_dst_rb_stack {
            options.push("require_dst_rb_stack".to_string());
        }
        if self.exclude_opponents_of_starting_dst {
            options.push("exclude_opponents_of_starting_dst".to_string());
        }
        if self.rules != RosterRules::default() {
            options.push(format!(
                "rules(salary_cap={}, roster_size={}, flex_slots={})",
                self.rules.salary_cap, self.rules.roster_size, self.rules.flex_slots
            ));
        }

        options
    }
}

fn join<T: std::fmt::Display>(items: &BTreeSet<T>) -> String {
    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(","))
}
