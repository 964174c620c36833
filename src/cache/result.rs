//! Operation Results
//!
//! The uniform result model shared by every cache operation. A successful
//! operation yields an [`Outcome`] carrying the action that happened and
//! its payload; a failed one is the `Err` branch of [`crate::error::Result`],
//! so an error is present exactly when the action is [`Action::Failed`].

use std::fmt;

use chrono::Duration;

use crate::cache::Entry;

// == Action ==
/// Discriminator summarizing what an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The attempted action failed; an error accompanies it
    Failed,
    /// A new key was set
    Created,
    /// An existing key was updated
    Updated,
    /// A key was unset
    Deleted,
    /// A value is being returned
    Retrieved,
    /// A TTL is being returned
    RetrievedTtl,
    /// The cache was cleared
    Cleared,
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Failed => "failed",
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::Retrieved => "retrieved",
            Action::RetrievedTtl => "retrieved_ttl",
            Action::Cleared => "cleared",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Outcome ==
/// The successful half of a cache result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new entry was stored
    Created(Entry),
    /// An existing entry was overwritten or had its TTL changed
    Updated(Entry),
    /// An entry was removed; the snapshot is the removed state
    Deleted(Entry),
    /// An entry was looked up
    Retrieved(Entry),
    /// The remaining time before a key expires
    RetrievedTtl(Duration),
    /// Every entry was removed
    Cleared,
}

impl Outcome {
    /// The action tag for this outcome.
    pub fn action(&self) -> Action {
        match self {
            Outcome::Created(_) => Action::Created,
            Outcome::Updated(_) => Action::Updated,
            Outcome::Deleted(_) => Action::Deleted,
            Outcome::Retrieved(_) => Action::Retrieved,
            Outcome::RetrievedTtl(_) => Action::RetrievedTtl,
            Outcome::Cleared => Action::Cleared,
        }
    }

    /// The entry snapshot, when the action produced one.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Outcome::Created(entry)
            | Outcome::Updated(entry)
            | Outcome::Deleted(entry)
            | Outcome::Retrieved(entry) => Some(entry),
            Outcome::RetrievedTtl(_) | Outcome::Cleared => None,
        }
    }

    /// The remaining TTL, present only for [`Outcome::RetrievedTtl`].
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Outcome::RetrievedTtl(ttl) => Some(*ttl),
            _ => None,
        }
    }
}
