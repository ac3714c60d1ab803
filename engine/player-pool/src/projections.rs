use crate::error::{FeedError, FeedKind, Result};
use crate::feeds::{self, SleeperProjection};
use crate::types::ProjectionRecord;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Sleeper's position label for team defense / special teams
const DEFENSE_POSITION: &str = "DEF";

/// Projection Index - maps a projection identity to PPR points
///
/// Built once per optimization run from the projection feed and never
/// mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProjectionIndex {
    /// Records in feed order, used for prefix fallback matching
    records: Vec<ProjectionRecord>,

    /// Map from identity key to position in `records`
    by_identity: HashMap<String, usize>,
}

impl ProjectionIndex {
    /// Build the index from the raw projection feed body
    pub fn from_json(body: &str) -> Result<Self> {
        let projections = feeds::parse_projection_feed(body)?;
        Self::build(&projections)
    }

    /// Build the index from parsed projection feed elements
    ///
    /// Players without a PPR projection are skipped. Team defenses are keyed
    /// by last name, everyone else by "First Last".
    pub fn build(projections: &[SleeperProjection]) -> Result<Self> {
        let mut records = Vec::with_capacity(projections.len());
        let mut skipped = 0usize;

        for (index, projection) in projections.iter().enumerate() {
            let field = |name: &str| format!("[{index}].{name}");
            let missing = |name: &str| {
                FeedError::data_format(FeedKind::Projections, field(name), "is missing")
            };

            let player = projection.player.as_ref().ok_or_else(|| missing("player"))?;
            let stats = projection.stats.as_ref().ok_or_else(|| missing("stats"))?;

            let position = player.position.as_deref().ok_or_else(|| missing("player.position"))?;
            let last_name =
                player.last_name.as_deref().ok_or_else(|| missing("player.last_name"))?.trim();

            let identity_key = if position == DEFENSE_POSITION {
                last_name.to_string()
            } else {
                let first_name = player
                    .first_name
                    .as_deref()
                    .ok_or_else(|| missing("player.first_name"))?
                    .trim();
                format!("{first_name} {last_name}")
            };

            let Some(points) = stats.pts_ppr else {
                skipped += 1;
                continue;
            };

            if !points.is_finite() {
                return Err(FeedError::data_format(
                    FeedKind::Projections,
                    field("stats.pts_ppr"),
                    format!("is not a finite number ({points})"),
                ));
            }

            let points = if points < 0.0 {
                warn!("Clamping negative projection {:.2} for {} to 0", points, identity_key);
                0.0
            } else {
                points
            };

            records.push(ProjectionRecord { identity_key, points });
        }

        let index = Self::from_records(records);
        info!(
            "Built projection index with {} players ({} without a PPR projection)",
            index.len(),
            skipped
        );
        Ok(index)
    }

    /// Build the index from already-normalized records
    ///
    /// When the same identity appears twice the first record wins.
    pub fn from_records(records: Vec<ProjectionRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut by_identity = HashMap::with_capacity(records.len());

        for record in records {
            if by_identity.contains_key(&record.identity_key) {
                warn!("Duplicate projection for '{}', keeping the first", record.identity_key);
                continue;
            }
            by_identity.insert(record.identity_key.clone(), kept.len());
            kept.push(record);
        }

        Self { records: kept, by_identity }
    }

    /// Exact identity lookup
    pub fn get(&self, identity_key: &str) -> Option<f64> {
        self.by_identity.get(identity_key).map(|&i| self.records[i].points)
    }

    /// Match a slate display name: exact identity first, then equality of the
    /// first `prefix_len` characters to tolerate truncated names.
    ///
    /// Returns the matched record; among several prefix matches the earliest
    /// in feed order wins.
    pub fn match_name(&self, display_name: &str, prefix_len: usize) -> Option<&ProjectionRecord> {
        if let Some(&i) = self.by_identity.get(display_name) {
            return Some(&self.records[i]);
        }

        if prefix_len == 0 {
            return None;
        }

        let wanted = name_prefix(display_name, prefix_len);
        let found = self
            .records
            .iter()
            .find(|record| name_prefix(&record.identity_key, prefix_len) == wanted);

        if let Some(record) = found {
            debug!("Prefix-matched '{}' to '{}'", display_name, record.identity_key);
        }
        found
    }

    /// Records in feed order
    pub fn records(&self) -> &[ProjectionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The first `len` characters of `name` (character, not byte, boundary)
pub fn name_prefix(name: &str, len: usize) -> &str {
    match name.char_indices().nth(len) {
        Some((byte_index, _)) => &name[..byte_index],
        None => name,
    }
}
