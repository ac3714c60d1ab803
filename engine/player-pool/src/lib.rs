//! Player Pool - builds the candidate pool for a DFS slate
//!
//! This crate reads the projection feed into a [`ProjectionIndex`] and joins
//! the contest slate against it with the [`CandidateResolver`], producing one
//! [`Candidate`] per eligible, projected slate player.

pub mod error;
pub mod feeds;
pub mod projections;
pub mod resolver;
pub mod types;

pub use error::{FeedError, FeedKind, Result};
pub use projections::ProjectionIndex;
pub use resolver::{CandidateResolver, ResolveStats, ResolverConfig};
pub use types::{Candidate, Position, ProjectionRecord, SlateEntry};
