use crate::config::RosterRules;
use crate::error::{OptimizerError, Result};
use crate::models::{Roster, RosterSlot, Slot};
use player_pool::{Candidate, Position};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Roster Extractor - labels a solved assignment with roster slots
pub struct RosterExtractor<'a> {
    rules: &'a RosterRules,
}

impl<'a> RosterExtractor<'a> {
    pub fn new(rules: &'a RosterRules) -> Self {
        Self { rules }
    }

    /// Turn a 0/1 assignment over `candidates` into a validated [`Roster`].
    ///
    /// Walking the pool in order, each RB/WR/TE takes its natural slot until
    /// the position minimum is filled; later ones at that position go to FLEX.
    pub fn extract(&self, candidates: &[Candidate], assignment: &[bool]) -> Result<Roster> {
        if assignment.len() != candidates.len() {
            return Err(OptimizerError::InvariantViolation(format!(
                "assignment has {} values for {} candidates",
                assignment.len(),
                candidates.len()
            )));
        }

        let mut filled: BTreeMap<Position, u32> = BTreeMap::new();
        let mut slots = Vec::with_capacity(self.rules.roster_size as usize);

        for (candidate, _) in candidates.iter().zip(assignment).filter(|(_, &selected)| selected) {
            let count = filled.entry(candidate.position).or_insert(0);
            let slot = if candidate.position.is_flex_eligible()
                && *count >= self.rules.limits(candidate.position).min
            {
                Slot::FLEX
            } else {
                Slot::for_position(candidate.position)
            };
            *count += 1;

            debug!("{} -> {}", candidate.display_name, slot);
            slots.push(RosterSlot { slot, player: candidate.clone() });
        }

        let roster = Roster::new(slots);
        validate_roster(&roster, self.rules)?;
        Ok(roster)
    }
}

/// Check every structural roster invariant against `rules`
pub fn validate_roster(roster: &Roster, rules: &RosterRules) -> Result<()> {
    let violation = |message: String| Err(OptimizerError::InvariantViolation(message));

    if roster.len() as u32 != rules.roster_size {
        return violation(format!(
            "roster has {} players, expected {}",
            roster.len(),
            rules.roster_size
        ));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = roster.players().find(|p| !seen.insert(p.player_id.as_str())) {
        return violation(format!("player {} occupies more than one slot", dup.player_id));
    }

    for position in Position::ALL {
        let limits = rules.limits(position);
        let count = roster.at_position(position).count() as u32;
        if count < limits.min || count > limits.max {
            return violation(format!(
                "{count} {position} rostered, expected {}..={}",
                limits.min, limits.max
            ));
        }

        let natural = roster.in_slot(Slot::for_position(position)).count() as u32;
        let expected_natural = if position.is_flex_eligible() { limits.min } else { count };
        if natural != expected_natural {
            return violation(format!(
                "{natural} players in the {position} slot, expected {expected_natural}"
            ));
        }
    }

    let flex_players: Vec<&Candidate> = roster.in_slot(Slot::FLEX).collect();
    if flex_players.len() as u32 != rules.flex_slots {
        return violation(format!(
            "{} FLEX players, expected {}",
            flex_players.len(),
            rules.flex_slots
        ));
    }
    if let Some(p) = flex_players.iter().find(|p| !p.position.is_flex_eligible()) {
        return violation(format!("{} {} cannot fill FLEX", p.position, p.player_id));
    }

    let flex_pool = roster.players().filter(|p| p.position.is_flex_eligible()).count() as u32;
    if flex_pool != rules.flex_pool_size() {
        return violation(format!(
            "{flex_pool} RB/WR/TE rostered, expected {}",
            rules.flex_pool_size()
        ));
    }

    if roster.total_salary > u64::from(rules.salary_cap) {
        return violation(format!(
            "salary {} exceeds the cap {}",
            roster.total_salary, rules.salary_cap
        ));
    }

    Ok(())
}
