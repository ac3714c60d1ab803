use player_pool::{Candidate, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named roster slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Slot {
    QB,
    RB,
    WR,
    TE,
    FLEX,
    DST,
}

impl Slot {
    /// The natural (non-FLEX) slot for a position
    pub fn for_position(position: Position) -> Self {
        match position {
            Position::QB => Slot::QB,
            Position::RB => Slot::RB,
            Position::WR => Slot::WR,
            Position::TE => Slot::TE,
            Position::DST => Slot::DST,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Slot::QB => "QB",
            Slot::RB => "RB",
            Slot::WR => "WR",
            Slot::TE => "TE",
            Slot::FLEX => "FLEX",
            Slot::DST => "DST",
        };
        f.write_str(label)
    }
}

/// One selected player and the slot it fills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub slot: Slot,
    pub player: Candidate,
}

/// A validated lineup
///
/// Slots are ordered QB, RB, WR, TE, FLEX, DST; players within a slot keep
/// candidate pool order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub slots: Vec<RosterSlot>,

    /// Summed in 64 bits so any set of feed salaries fits
    pub total_salary: u64,
    pub total_projection: f64,
}

impl Roster {
    pub fn new(mut slots: Vec<RosterSlot>) -> Self {
        slots.sort_by_key(|s| s.slot);
        let total_salary = slots.iter().map(|s| u64::from(s.player.salary)).sum();
        let total_projection = slots.iter().map(|s| s.player.projection).sum();
        Self { slots, total_salary, total_projection }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &Candidate> {
        self.slots.iter().map(|s| &s.player)
    }

    /// Players filling `slot`
    pub fn in_slot(&self, slot: Slot) -> impl Iterator<Item = &Candidate> {
        self.slots.iter().filter(move |s| s.slot == slot).map(|s| &s.player)
    }

    /// Players of `position`, whichever slot they fill
    pub fn at_position(&self, position: Position) -> impl Iterator<Item = &Candidate> {
        self.players().filter(move |p| p.position == position)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players().any(|p| p.player_id == player_id)
    }

    /// The FLEX player, when the roster has exactly one FLEX slot
    pub fn flex(&self) -> Option<&Candidate> {
        self.in_slot(Slot::FLEX).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, position: Position, salary: u32, projection: f64) -> Candidate {
        Candidate {
            player_id: id.to_string(),
            display_name: id.to_string(),
            position,
            team: "KC".to_string(),
            opponent_team: "LV".to_string(),
            salary,
            projection,
        }
    }

    #[test]
    fn test_roster_orders_slots_and_totals() {
        let roster = Roster::new(vec![
            RosterSlot { slot: Slot::DST, player: player("d", Position::DST, 3000, 7.0) },
            RosterSlot { slot: Slot::FLEX, player: player("w2", Position::WR, 4000, 11.0) },
            RosterSlot { slot: Slot::QB, player: player("q", Position::QB, 7000, 22.5) },
            RosterSlot { slot: Slot::WR, player: player("w1", Position::WR, 6000, 15.0) },
        ]);

        let order: Vec<Slot> = roster.slots.iter().map(|s| s.slot).collect();
        assert_eq!(order, vec![Slot::QB, Slot::WR, Slot::FLEX, Slot::DST]);
        assert_eq!(roster.total_salary, 20_000);
        assert!((roster.total_projection - 55.5).abs() < 1e-9);
        assert_eq!(roster.at_position(Position::WR).count(), 2);
        assert_eq!(roster.flex().map(|p| p.player_id.as_str()), Some("w2"));
        assert!(roster.contains("q"));
        assert!(!roster.contains("x"));
    }

    #[test]
    fn test_total_salary_does_not_wrap() {
        let roster = Roster::new(vec![
            RosterSlot { slot: Slot::QB, player: player("q", Position::QB, u32::MAX, 1.0) },
            RosterSlot { slot: Slot::DST, player: player("d", Position::DST, u32::MAX, 1.0) },
        ]);
        assert_eq!(roster.total_salary, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_slot_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Slot::FLEX).unwrap(), "\"FLEX\"");
        assert_eq!(Slot::for_position(Position::TE), Slot::TE);
    }
}
