//! Assignment model.
//!
//! An assignment is the allocation fact: a worker holds some man-hours
//! of a work item, optionally with a concrete time range. Break and
//! direct-entry records are the same shape but carry a category tag and
//! a free-text code instead of a work-item reference.
//!
//! # Time Representation
//! `start_min`/`end_min` are shift-relative minutes; `end_min` may
//! exceed 1440 to represent next-day overflow on night shifts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TimeSlot, WorkItemId, WorkerId};

/// Unique assignment identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentId(pub u64);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of time an assignment records.
///
/// Only [`Normal`](AssignmentCategory::Normal) hours count toward the
/// capacity ceiling; breaks and direct entries are tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentCategory {
    /// Productive work against a work item.
    Normal,
    /// Break/administrative time, labelled by `code`.
    Break,
    /// Free-text direct entry, labelled by `code`.
    DirectEntry,
}

/// Rounds man-hours to the 2-decimal precision stored on records.
#[inline]
pub fn round_mh(mh: f64) -> f64 {
    (mh * 100.0).round() / 100.0
}

/// One worker's allocation of one unit of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique assignment identifier.
    pub id: AssignmentId,
    /// Allocated work item; `None` for breaks and direct entries.
    pub work_item_id: Option<WorkItemId>,
    /// Allocated worker.
    pub worker_id: WorkerId,
    /// Record classification.
    pub category: AssignmentCategory,
    /// Allocated duration in man-hours.
    pub allocated_mh: f64,
    /// Concrete start (shift-relative minutes), when placed.
    pub start_min: Option<i64>,
    /// Concrete end (shift-relative minutes), when placed.
    pub end_min: Option<i64>,
    /// Time is pinned and must not be moved by recomputes.
    pub is_fixed: bool,
    /// Break reason or direct-entry label.
    pub code: Option<String>,
}

impl Assignment {
    /// Creates an untimed productive allocation, as written by the
    /// fair-share distributor.
    pub fn untimed(work_item_id: WorkItemId, worker_id: WorkerId, allocated_mh: f64) -> Self {
        Self {
            id: AssignmentId(0),
            work_item_id: Some(work_item_id),
            worker_id,
            category: AssignmentCategory::Normal,
            allocated_mh: round_mh(allocated_mh),
            start_min: None,
            end_min: None,
            is_fixed: false,
            code: None,
        }
    }

    /// Creates a pinned break/administrative block.
    pub fn break_time(worker_id: WorkerId, code: impl Into<String>, slot: TimeSlot) -> Self {
        Self::pinned(worker_id, AssignmentCategory::Break, code, slot)
    }

    /// Creates a pinned free-text direct entry.
    pub fn direct_entry(worker_id: WorkerId, code: impl Into<String>, slot: TimeSlot) -> Self {
        Self::pinned(worker_id, AssignmentCategory::DirectEntry, code, slot)
    }

    fn pinned(
        worker_id: WorkerId,
        category: AssignmentCategory,
        code: impl Into<String>,
        slot: TimeSlot,
    ) -> Self {
        Self {
            id: AssignmentId(0),
            work_item_id: None,
            worker_id,
            category,
            allocated_mh: round_mh(slot.duration_min() as f64 / 60.0),
            start_min: Some(slot.start_min),
            end_min: Some(slot.end_min),
            is_fixed: true,
            code: Some(code.into()),
        }
    }

    /// Pins the time range on a productive allocation.
    pub fn with_time(mut self, slot: TimeSlot) -> Self {
        self.start_min = Some(slot.start_min);
        self.end_min = Some(slot.end_min);
        self.is_fixed = true;
        self
    }

    /// Whether a concrete time range has been placed.
    #[inline]
    pub fn is_timed(&self) -> bool {
        self.start_min.is_some() && self.end_min.is_some()
    }

    /// The placed time range, when both bounds exist.
    pub fn time_slot(&self) -> Option<TimeSlot> {
        match (self.start_min, self.end_min) {
            (Some(start), Some(end)) => Some(TimeSlot::new(start, end)),
            _ => None,
        }
    }

    /// Committed man-hours: the time-range duration when placed,
    /// otherwise the allocated amount.
    pub fn committed_mh(&self) -> f64 {
        match self.time_slot() {
            Some(slot) => slot.duration_min() as f64 / 60.0,
            None => self.allocated_mh,
        }
    }

    /// Whether these hours count toward the capacity ceiling.
    #[inline]
    pub fn is_productive(&self) -> bool {
        self.category == AssignmentCategory::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_mh() {
        assert!((round_mh(0.30000000000000004) - 0.3).abs() < 1e-10);
        assert!((round_mh(1.666_666) - 1.67).abs() < 1e-10);
        assert!((round_mh(2.0) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_untimed_assignment() {
        let a = Assignment::untimed(WorkItemId(1), WorkerId(2), 1.5);
        assert!(a.is_productive());
        assert!(!a.is_timed());
        assert!((a.committed_mh() - 1.5).abs() < 1e-10);
        assert_eq!(a.work_item_id, Some(WorkItemId(1)));
    }

    #[test]
    fn test_break_assignment() {
        let a = Assignment::break_time(WorkerId(1), "lunch", TimeSlot::new(720, 780));
        assert_eq!(a.category, AssignmentCategory::Break);
        assert!(a.is_fixed);
        assert!(!a.is_productive());
        assert_eq!(a.work_item_id, None);
        assert!((a.allocated_mh - 1.0).abs() < 1e-10);
        assert_eq!(a.time_slot(), Some(TimeSlot::new(720, 780)));
    }

    #[test]
    fn test_committed_mh_prefers_time_range() {
        // A timed record commits its range, not its allocation.
        let a = Assignment::untimed(WorkItemId(1), WorkerId(1), 3.0)
            .with_time(TimeSlot::new(480, 540));
        assert!((a.committed_mh() - 1.0).abs() < 1e-10);
    }
}
