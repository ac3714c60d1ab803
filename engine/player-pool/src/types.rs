use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roster position as listed on a DraftKings NFL classic slate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    DST,
}

impl Position {
    /// All positions in roster display order
    pub const ALL: [Position; 5] =
        [Position::QB, Position::RB, Position::WR, Position::TE, Position::DST];

    /// Positions that may fill the FLEX slot
    pub const FLEX_ELIGIBLE: [Position; 3] = [Position::RB, Position::WR, Position::TE];

    pub fn is_flex_eligible(self) -> bool {
        matches!(self, Position::RB | Position::WR | Position::TE)
    }

    /// Everything except team defense counts as offense
    pub fn is_offense(self) -> bool {
        self != Position::DST
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::DST => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            "DST" | "DEF" => Ok(Position::DST),
            other => Err(format!("unknown position '{other}'")),
        }
    }
}

/// A single projected-points value keyed by the projection source's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    /// "First Last" for offensive players, "Last" for team defenses
    pub identity_key: String,

    /// PPR fantasy points
    pub points: f64,
}

/// One row of the contest slate after shape validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlateEntry {
    pub player_id: String,

    /// Position of the row within the raw `draftables` array
    pub slate_index: usize,

    pub display_name: String,
    pub position: Position,
    pub team: String,
    pub opponent_team: String,

    /// Salary in contest dollars
    pub salary: u32,

    /// Id of the first draft stat attribute, if the row carries any
    pub stat_attribute_id: Option<i64>,
}

/// A slate player joined to a projection, eligible for selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub player_id: String,
    pub display_name: String,
    pub position: Position,
    pub team: String,
    pub opponent_team: String,
    pub salary: u32,
    pub projection: f64,
}

impl Candidate {
    /// Join a slate entry with its projected points
    pub fn from_entry(entry: &SlateEntry, projection: f64) -> Self {
        Self {
            player_id: entry.player_id.clone(),
            display_name: entry.display_name.clone(),
            position: entry.position,
            team: entry.team.clone(),
            opponent_team: entry.opponent_team.clone(),
            salary: entry.salary,
            projection,
        }
    }

    /// Projected points per $1000 of salary
    pub fn value(&self) -> f64 {
        if self.salary == 0 {
            return 0.0;
        }
        self.projection / (self.salary as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("qb".parse::<Position>().unwrap(), Position::QB);
        assert_eq!(" WR ".parse::<Position>().unwrap(), Position::WR);
        assert_eq!("DEF".parse::<Position>().unwrap(), Position::DST);
        assert!("K".parse::<Position>().is_err());
    }

    #[test]
    fn test_flex_eligibility() {
        assert!(Position::RB.is_flex_eligible());
        assert!(Position::TE.is_flex_eligible());
        assert!(!Position::QB.is_flex_eligible());
        assert!(!Position::DST.is_offense());
    }

    #[test]
    fn test_candidate_value() {
        let candidate = Candidate {
            player_id: "1".to_string(),
            display_name: "Justin Jefferson".to_string(),
            position: Position::WR,
            team: "MIN".to_string(),
            opponent_team: "GB".to_string(),
            salary: 8000,
            projection: 24.0,
        };
        assert!((candidate.value() - 3.0).abs() < f64::EPSILON);
    }
}
