use crate::error::Result;
use crate::feeds;
use crate::projections::ProjectionIndex;
use crate::types::{Candidate, SlateEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, info_span};

/// DraftKings stat attribute id for points-based scoring
pub const POINTS_STAT_ATTRIBUTE_ID: i64 = 90;

/// Slate names are truncated to this many characters by the contest site
pub const DEFAULT_NAME_PREFIX_LEN: usize = 15;

/// Per-call settings for candidate resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Draft group the slate was fetched for (diagnostics only)
    pub draft_group_id: Option<u64>,

    /// Only rows whose first stat attribute has this id are eligible
    pub scoring_stat_attribute_id: i64,

    /// Number of leading characters compared by the fallback name match
    pub name_prefix_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            draft_group_id: None,
            scoring_stat_attribute_id: POINTS_STAT_ATTRIBUTE_ID,
            name_prefix_len: DEFAULT_NAME_PREFIX_LEN,
        }
    }
}

/// Counts from a resolution pass, for logging and reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub slate_rows: usize,
    pub ineligible: usize,
    pub duplicates: usize,
    pub unmatched: usize,
    pub exact_matches: usize,
    pub prefix_matches: usize,
}

/// Candidate Resolver - joins slate entries to projections
#[derive(Debug, Clone, Default)]
pub struct CandidateResolver {
    config: ResolverConfig,
}

impl CandidateResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Parse the raw slate feed body and resolve it
    pub fn resolve_json(
        &self,
        slate_body: &str,
        projections: &ProjectionIndex,
    ) -> Result<(Vec<Candidate>, ResolveStats)> {
        let entries = feeds::parse_slate_feed(slate_body)?;
        Ok(self.resolve(&entries, projections))
    }

    /// Build the candidate pool from slate entries, preserving slate order.
    ///
    /// Only rows with the scoring stat attribute are kept, and only the first
    /// such row for each player id. Rows that match no projection are dropped.
    pub fn resolve(
        &self,
        entries: &[SlateEntry],
        projections: &ProjectionIndex,
    ) -> (Vec<Candidate>, ResolveStats) {
        let _span = info_span!("resolve", draft_group_id = ?self.config.draft_group_id).entered();

        let mut stats = ResolveStats { slate_rows: entries.len(), ..Default::default() };
        let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
        let mut candidates = Vec::new();

        for entry in entries {
            if entry.stat_attribute_id != Some(self.config.scoring_stat_attribute_id) {
                stats.ineligible += 1;
                continue;
            }

            if !seen.insert(entry.player_id.as_str()) {
                stats.duplicates += 1;
                continue;
            }

            let Some(record) =
                projections.match_name(&entry.display_name, self.config.name_prefix_len)
            else {
                debug!(
                    "No projection for {} ({} {}), dropping",
                    entry.display_name, entry.position, entry.team
                );
                stats.unmatched += 1;
                continue;
            };

            if record.identity_key == entry.display_name {
                stats.exact_matches += 1;
            } else {
                stats.prefix_matches += 1;
            }

            candidates.push(Candidate::from_entry(entry, record.points));
        }

        info!(
            "Resolved {} candidates from {} slate rows \
             ({} ineligible, {} duplicate, {} unmatched, {} prefix-matched)",
            candidates.len(),
            stats.slate_rows,
            stats.ineligible,
            stats.duplicates,
            stats.unmatched,
            stats.prefix_matches
        );

        (candidates, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, ProjectionRecord};
    use proptest::prelude::*;

    fn entry(
        id: &str,
        name: &str,
        position: Position,
        salary: u32,
        attr: Option<i64>,
    ) -> SlateEntry {
        SlateEntry {
            player_id: id.to_string(),
            slate_index: 0,
            display_name: name.to_string(),
            position,
            team: "MIN".to_string(),
            opponent_team: "GB".to_string(),
            salary,
            stat_attribute_id: attr,
        }
    }

    fn index(names: &[(&str, f64)]) -> ProjectionIndex {
        ProjectionIndex::from_records(
            names
                .iter()
                .map(|(k, p)| ProjectionRecord { identity_key: k.to_string(), points: *p })
                .collect(),
        )
    }

    #[test]
    fn test_consecutive_duplicates_collapse_to_first() {
        let entries = vec![
            entry("1", "Justin Jefferson", Position::WR, 8800, Some(90)),
            entry("1", "Justin Jefferson", Position::WR, 9000, Some(90)),
            entry("1", "Justin Jefferson", Position::WR, 9200, Some(90)),
            entry("2", "Kirk Cousins", Position::QB, 6000, Some(90)),
        ];
        let projections = index(&[("Justin Jefferson", 21.0), ("Kirk Cousins", 17.5)]);

        let (candidates, stats) = CandidateResolver::default().resolve(&entries, &projections);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].salary, 8800);
        assert_eq!(candidates[1].display_name, "Kirk Cousins");
        assert_eq!(stats.duplicates, 2);
    }

    #[test]
    fn test_ineligible_attribute_rows_are_skipped() {
        let entries = vec![
            entry("1", "Justin Jefferson", Position::WR, 9000, Some(219)),
            entry("1", "Justin Jefferson", Position::WR, 8800, Some(90)),
            entry("2", "Kirk Cousins", Position::QB, 6000, None),
        ];
        let projections = index(&[("Justin Jefferson", 21.0), ("Kirk Cousins", 17.5)]);

        let (candidates, stats) = CandidateResolver::default().resolve(&entries, &projections);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].salary, 8800);
        assert_eq!(stats.ineligible, 2);
    }

    #[test]
    fn test_unmatched_entries_are_dropped() {
        let entries = vec![
            entry("1", "Amon-Ra St. Brow", Position::WR, 8500, Some(90)),
            entry("2", "Practice Squad Guy", Position::WR, 3000, Some(90)),
        ];
        let projections = index(&[("Amon-Ra St. Brown", 19.8)]);

        let (candidates, stats) = CandidateResolver::default().resolve(&entries, &projections);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_name, "Amon-Ra St. Brow");
        assert_eq!(candidates[0].projection, 19.8);
        assert_eq!(stats.prefix_matches, 1);
        assert_eq!(stats.unmatched, 1);
    }

    #[test]
    fn test_custom_attribute_and_prefix() {
        let config = ResolverConfig {
            draft_group_id: Some(98582),
            scoring_stat_attribute_id: 219,
            name_prefix_len: 0,
        };
        let entries = vec![
            entry("1", "Justin Jefferson", Position::WR, 9000, Some(219)),
            entry("2", "Amon-Ra St. Brow", Position::WR, 8500, Some(219)),
        ];
        let projections = index(&[("Justin Jefferson", 21.0), ("Amon-Ra St. Brown", 19.8)]);

        let (candidates, _) = CandidateResolver::new(config).resolve(&entries, &projections);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].player_id, "1");
    }

    #[test]
    fn test_resolve_json() {
        let slate = r#"{ "draftables": [
            { "playerId": 7, "displayName": "Cowboys ", "position": "DST",
              "teamAbbreviation": "DAL", "competition": { "name": "DAL @ PHI" },
              "salary": 3000, "draftStatAttributes": [{ "id": 90 }] },
            { "playerId": 7, "displayName": "Cowboys ", "position": "DST",
              "teamAbbreviation": "DAL", "competition": { "name": "DAL @ PHI" },
              "salary": 3100, "draftStatAttributes": [{ "id": 90 }] }
        ] }"#;
        let projections = index(&[("Cowboys", 7.5)]);

        let (candidates, _) =
            CandidateResolver::default().resolve_json(slate, &projections).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].opponent_team, "PHI");
        assert_eq!(candidates[0].salary, 3000);
    }

    proptest! {
        #[test]
        fn prop_dedup_yields_one_candidate_per_player(
            runs in prop::collection::vec((0u8..20, 1usize..5), 1..40)
        ) {
            let mut entries = Vec::new();
            for (id, repeat) in &runs {
                for r in 0..*repeat {
                    entries.push(entry(
                        &id.to_string(),
                        &format!("Player {id}"),
                        Position::WR,
                        3000 + r as u32 * 100,
                        Some(90),
                    ));
                }
            }
            let names: Vec<(String, f64)> =
                (0u8..20).map(|id| (format!("Player {id}"), id as f64)).collect();
            let projections = ProjectionIndex::from_records(
                names
                    .iter()
                    .map(|(k, p)| ProjectionRecord { identity_key: k.clone(), points: *p })
                    .collect(),
            );

            let (candidates, _) = CandidateResolver::default().resolve(&entries, &projections);

            let distinct: HashSet<&str> = entries.iter().map(|e| e.player_id.as_str()).collect();
            prop_assert_eq!(candidates.len(), distinct.len());

            let ids: HashSet<&str> = candidates.iter().map(|c| c.player_id.as_str()).collect();
            prop_assert_eq!(ids.len(), candidates.len());

            // first occurrence of each player keeps its base salary
            prop_assert!(candidates.iter().all(|c| c.salary == 3000));

            // resolving an already-deduplicated slate changes nothing
            let first_rows: Vec<SlateEntry> = {
                let mut seen = HashSet::new();
                entries.iter().filter(|e| seen.insert(e.player_id.clone())).cloned().collect()
            };
            let (again, _) = CandidateResolver::default().resolve(&first_rows, &projections);
            prop_assert_eq!(again, candidates);
        }
    }
}
