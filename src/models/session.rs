//! Scheduling session model.
//!
//! A session is one scheduling run: a named shift instance with its own
//! roster and work list. Sessions are never deleted on completion; the
//! active flag flips off and the record stays for the archive.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ShiftKind;

/// Unique session identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scheduling run being planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Display name (e.g. "Section A").
    pub name: String,
    /// Shift classification; fixed for the session's lifetime.
    pub shift: ShiftKind,
    /// `false` once the session has ended (archived, not deleted).
    pub is_active: bool,
    /// Creation timestamp (epoch ms), supplied by the caller.
    pub created_at_ms: i64,
}

impl Session {
    /// Creates a new active session. The id is assigned on insert.
    pub fn new(name: impl Into<String>, shift: ShiftKind) -> Self {
        Self {
            id: SessionId(0),
            name: name.into(),
            shift,
            is_active: true,
            created_at_ms: 0,
        }
    }

    /// Sets the creation timestamp (epoch ms).
    pub fn with_created_at(mut self, created_at_ms: i64) -> Self {
        self.created_at_ms = created_at_ms;
        self
    }
}
