//! Conflict decisions.
//!
//! The sync engine never picks a side on its own. Every conflicting resource is
//! handed to a [`ConflictResolver`], which answers with a [`ConflictDecision`].
//! The library ships two resolvers; the CLI adds an interactive one.

use anyhow::Result;
use std::fmt;

use super::SyncItem;

/// Answer for one conflicting resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Keep the on-disk content and acknowledge the upstream version
    KeepLocal,
    /// Replace the on-disk content with upstream
    TakeUpstream,
    /// Write nothing; the conflict is reported and stays unresolved
    Defer,
}

impl fmt::Display for ConflictDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KeepLocal => "keep local",
            Self::TakeUpstream => "take upstream",
            Self::Defer => "deferred",
        })
    }
}

/// Source of conflict decisions.
pub trait ConflictResolver {
    /// Decision for one conflicting resource.
    fn decide(&mut self, item: &SyncItem) -> Result<ConflictDecision>;
}

/// Applies the same decision to every conflict.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver {
    decision: ConflictDecision,
}

impl PolicyResolver {
    /// Resolver answering `decision` for every conflict.
    #[must_use]
    pub const fn new(decision: ConflictDecision) -> Self {
        Self {
            decision,
        }
    }
}

impl ConflictResolver for PolicyResolver {
    fn decide(&mut self, _item: &SyncItem) -> Result<ConflictDecision> {
        Ok(self.decision)
    }
}

/// Defers every conflict. Used when no one can be asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferResolver;

impl ConflictResolver for DeferResolver {
    fn decide(&mut self, _item: &SyncItem) -> Result<ConflictDecision> {
        Ok(ConflictDecision::Defer)
    }
}
