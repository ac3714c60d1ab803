//! Wire models for the two upstream feeds
//!
//! Fields are deserialized leniently (`Option` + `#[serde(default)]`) so that a
//! missing field is reported as a [`FeedError::DataFormat`] naming the field,
//! rather than as an opaque deserializer message.

use crate::error::{FeedError, FeedKind, Result};
use crate::types::{Position, SlateEntry};
use serde::{Deserialize, Serialize};

/// One element of the Sleeper weekly projections array
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SleeperProjection {
    #[serde(default)]
    pub player: Option<SleeperPlayer>,

    #[serde(default)]
    pub stats: Option<SleeperStats>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SleeperPlayer {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// QB, RB, WR, TE, K, DEF
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SleeperStats {
    /// Points-per-reception fantasy points; absent or null for players
    /// without a PPR projection
    #[serde(default)]
    pub pts_ppr: Option<f64>,
}

/// DraftKings `draftables` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DraftablesResponse {
    #[serde(default)]
    pub draftables: Option<Vec<Draftable>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draftable {
    /// Numeric on the live API, tolerated as a string
    #[serde(default)]
    pub player_id: Option<serde_json::Value>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub team_abbreviation: Option<String>,

    #[serde(default)]
    pub competition: Option<Competition>,

    #[serde(default)]
    pub salary: Option<i64>,

    #[serde(default)]
    pub draft_stat_attributes: Option<Vec<DraftStatAttribute>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Competition {
    /// "AWAY @ HOME"
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DraftStatAttribute {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Parse the raw projection feed body
pub fn parse_projection_feed(body: &str) -> Result<Vec<SleeperProjection>> {
    serde_json::from_str(body)
        .map_err(|source| FeedError::Json { feed: FeedKind::Projections, source })
}

/// Parse the raw slate feed body into validated slate entries, in feed order
pub fn parse_slate_feed(body: &str) -> Result<Vec<SlateEntry>> {
    let response: DraftablesResponse = serde_json::from_str(body)
        .map_err(|source| FeedError::Json { feed: FeedKind::Slate, source })?;
    slate_entries(&response)
}

/// Validate every draftable and convert it into a [`SlateEntry`]
///
/// Rows under other scoring attributes are validated too: one malformed row
/// rejects the whole slate.
pub fn slate_entries(response: &DraftablesResponse) -> Result<Vec<SlateEntry>> {
    let draftables = response.draftables.as_ref().ok_or_else(|| {
        FeedError::data_format(FeedKind::Slate, "draftables", "is missing")
    })?;

    draftables
        .iter()
        .enumerate()
        .map(|(index, draftable)| draftable.to_slate_entry(index))
        .collect()
}

impl Draftable {
    /// Validate the row shape and derive the opponent from the game name
    pub fn to_slate_entry(&self, slate_index: usize) -> Result<SlateEntry> {
        let field = |name: &str| format!("draftables[{slate_index}].{name}");
        let missing =
            |name: &str| FeedError::data_format(FeedKind::Slate, field(name), "is missing");

        let player_id = match &self.player_id {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(other) => {
                return Err(FeedError::data_format(
                    FeedKind::Slate,
                    field("playerId"),
                    format!("has unexpected value {other}"),
                ))
            }
            None => return Err(missing("playerId")),
        };

        let display_name =
            self.display_name.as_deref().ok_or_else(|| missing("displayName"))?.trim().to_string();

        let position = self
            .position
            .as_deref()
            .ok_or_else(|| missing("position"))?
            .parse::<Position>()
            .map_err(|e| FeedError::data_format(FeedKind::Slate, field("position"), e))?;

        let team = self
            .team_abbreviation
            .as_deref()
            .ok_or_else(|| missing("teamAbbreviation"))?
            .trim()
            .to_string();

        let game_name = self
            .competition
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .ok_or_else(|| missing("competition.name"))?;
        let opponent_team = opponent_from_game_name(game_name, &team).ok_or_else(|| {
            FeedError::data_format(
                FeedKind::Slate,
                field("competition.name"),
                format!("'{game_name}' does not name team {team} in 'AWAY @ HOME' form"),
            )
        })?;

        let salary = match self.salary {
            Some(s) if s > 0 && s <= u32::MAX as i64 => s as u32,
            Some(s) => {
                return Err(FeedError::data_format(
                    FeedKind::Slate,
                    field("salary"),
                    format!("must be positive, got {s}"),
                ))
            }
            None => return Err(missing("salary")),
        };

        let attributes =
            self.draft_stat_attributes.as_ref().ok_or_else(|| missing("draftStatAttributes"))?;
        let stat_attribute_id = attributes.first().and_then(|a| a.id);

        Ok(SlateEntry {
            player_id,
            slate_index,
            display_name,
            position,
            team,
            opponent_team,
            salary,
            stat_attribute_id,
        })
    }
}

/// Given "AAA @ BBB" and one of the two teams, return the other team
pub fn opponent_from_game_name(game_name: &str, team: &str) -> Option<String> {
    let (away, home) = game_name.split_once('@')?;
    let (away, home) = (away.trim(), home.trim());
    if away.is_empty() || home.is_empty() {
        return None;
    }

    if away.eq_ignore_ascii_case(team) {
        Some(home.to_string())
    } else if home.eq_ignore_ascii_case(team) {
        Some(away.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_from_game_name() {
        assert_eq!(opponent_from_game_name("DAL @ PHI", "DAL").as_deref(), Some("PHI"));
        assert_eq!(opponent_from_game_name("DAL @ PHI", "PHI").as_deref(), Some("DAL"));
        assert_eq!(opponent_from_game_name("DAL @ PHI", "NYG"), None);
        assert_eq!(opponent_from_game_name("DAL vs PHI", "DAL"), None);
        assert_eq!(opponent_from_game_name(" @ PHI", "PHI"), None);
    }

    #[test]
    fn test_parse_slate_feed() {
        let body = r#"{
            "draftables": [
                {
                    "playerId": 11370,
                    "displayName": "Cowboys ",
                    "position": "DST",
                    "teamAbbreviation": "DAL",
                    "competition": { "name": "DAL @ PHI" },
                    "salary": 3200,
                    "draftStatAttributes": [{ "id": 90, "value": "7.1" }]
                },
                {
                    "playerId": "829",
                    "displayName": "Jalen Hurts",
                    "position": "QB",
                    "teamAbbreviation": "PHI",
                    "competition": { "name": "DAL @ PHI" },
                    "salary": 7800,
                    "draftStatAttributes": []
                }
            ]
        }"#;

        let entries = parse_slate_feed(body).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].player_id, "11370");
        assert_eq!(entries[0].display_name, "Cowboys");
        assert_eq!(entries[0].position, Position::DST);
        assert_eq!(entries[0].opponent_team, "PHI");
        assert_eq!(entries[0].stat_attribute_id, Some(90));

        assert_eq!(entries[1].player_id, "829");
        assert_eq!(entries[1].slate_index, 1);
        assert_eq!(entries[1].opponent_team, "DAL");
        assert_eq!(entries[1].stat_attribute_id, None);
    }

    #[test]
    fn test_slate_feed_without_draftables_is_rejected() {
        let err = parse_slate_feed(r#"{ "players": [] }"#).unwrap_err();
        match err {
            FeedError::DataFormat { feed, field, .. } => {
                assert_eq!(feed, FeedKind::Slate);
                assert_eq!(field, "draftables");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slate_entry_missing_salary_names_field() {
        let body = r#"{ "draftables": [{
            "playerId": 1,
            "displayName": "Josh Allen",
            "position": "QB",
            "teamAbbreviation": "BUF",
            "competition": { "name": "BUF @ MIA" },
            "draftStatAttributes": [{ "id": 90 }]
        }] }"#;

        let err = parse_slate_feed(body).unwrap_err();
        assert!(err.to_string().contains("draftables[0].salary"), "{err}");
    }

    #[test]
    fn test_slate_entry_rejects_unknown_position() {
        let body = r#"{ "draftables": [{
            "playerId": 1,
            "displayName": "Justin Tucker",
            "position": "K",
            "teamAbbreviation": "BAL",
            "competition": { "name": "BAL @ CIN" },
            "salary": 4000,
            "draftStatAttributes": [{ "id": 90 }]
        }] }"#;

        assert!(matches!(parse_slate_feed(body), Err(FeedError::DataFormat { .. })));
    }

    #[test]
    fn test_malformed_ineligible_row_rejects_the_slate() {
        let body = r#"{ "draftables": [
            {
                "playerId": 11370,
                "displayName": "Cowboys",
                "position": "DST",
                "teamAbbreviation": "DAL",
                "competition": { "name": "DAL @ PHI" },
                "salary": 3200,
                "draftStatAttributes": [{ "id": 90 }]
            },
            {
                "playerId": 11370,
                "displayName": "Cowboys",
                "position": "DST",
                "teamAbbreviation": "DAL",
                "salary": 3400,
                "draftStatAttributes": [{ "id": 219 }]
            }
        ] }"#;

        match parse_slate_feed(body).unwrap_err() {
            FeedError::DataFormat { feed, field, .. } => {
                assert_eq!(feed, FeedKind::Slate);
                assert_eq!(field, "draftables[1].competition.name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_projection_feed_rejects_non_array() {
        let err = parse_projection_feed(r#"{ "player": {} }"#).unwrap_err();
        assert!(matches!(err, FeedError::Json { feed: FeedKind::Projections, .. }));
    }
}
