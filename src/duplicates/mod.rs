//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Dropping singleton hash groups ([`groups`])
//! - Sizing, totalling and ranking duplicate groups ([`ranker`])

pub mod groups;
pub mod ranker;

pub use groups::find_duplicates;
pub use ranker::{rank_by_size, RankError, RankedGroup, RankedGroups};
