//! Worker model.
//!
//! A worker is one person available for assignment within a session,
//! with an hours capacity ceiling (`limit_mh`) and a denormalized
//! running total (`used_mh`) maintained by the aggregate refresher.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SessionId;

/// Default capacity ceiling for a 12-hour shift (man-hours).
pub const DEFAULT_LIMIT_MH: f64 = 9.0;

/// Unique worker identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person available for assignment within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker identifier.
    pub id: WorkerId,
    /// Owning session.
    pub session_id: SessionId,
    /// Worker name; unique within the session.
    pub name: String,
    /// Capacity ceiling in man-hours.
    pub limit_mh: f64,
    /// Committed man-hours, recomputed from assignment records.
    /// Break/administrative time is excluded.
    pub used_mh: f64,
}

impl Worker {
    /// Creates a worker with the default capacity ceiling.
    /// Id and session are assigned on insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkerId(0),
            session_id: SessionId(0),
            name: name.into(),
            limit_mh: DEFAULT_LIMIT_MH,
            used_mh: 0.0,
        }
    }

    /// Sets the capacity ceiling (man-hours).
    pub fn with_limit(mut self, limit_mh: f64) -> Self {
        self.limit_mh = limit_mh;
        self
    }

    /// Slack below the capacity ceiling (man-hours, may be negative
    /// when the worker is overloaded).
    #[inline]
    pub fn remaining_mh(&self) -> f64 {
        self.limit_mh - self.used_mh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_builder() {
        let w = Worker::new("Kim").with_limit(10.5);
        assert_eq!(w.name, "Kim");
        assert!((w.limit_mh - 10.5).abs() < 1e-10);
        assert!((w.used_mh - 0.0).abs() < 1e-10);
        assert!((w.remaining_mh() - 10.5).abs() < 1e-10);
    }

    #[test]
    fn test_worker_default_limit() {
        let w = Worker::new("Lee");
        assert!((w.limit_mh - DEFAULT_LIMIT_MH).abs() < 1e-10);
    }
}
