//! Work item model.
//!
//! A work item is one unit of required work with a total duration in
//! man-hours, belonging to a priority group. Items flagged manual are
//! pinned by hand and skipped by the fair-share distributor.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GroupKey, SessionId};

/// Unique work item identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkItemId(pub u64);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of required work to be spread across the crew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique work item identifier.
    pub id: WorkItemId,
    /// Owning session.
    pub session_id: SessionId,
    /// Priority group (model/aircraft code); may be blank.
    pub group: GroupKey,
    /// Work order number.
    pub work_order: String,
    /// Operation code.
    pub operation: String,
    /// Free-text description.
    pub description: String,
    /// Required total duration in man-hours.
    pub work_mh: f64,
    /// Pinned by hand; the distributor leaves it alone.
    pub is_manual: bool,
    /// Display position within the group.
    pub display_order: i32,
}

impl WorkItem {
    /// Creates a work item. Id and session are assigned on insert.
    pub fn new(work_order: impl Into<String>) -> Self {
        Self {
            id: WorkItemId(0),
            session_id: SessionId(0),
            group: GroupKey::new(""),
            work_order: work_order.into(),
            operation: String::new(),
            description: String::new(),
            work_mh: 0.0,
            is_manual: false,
            display_order: 0,
        }
    }

    /// Sets the priority group.
    pub fn with_group(mut self, group: impl Into<GroupKey>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the operation code.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the required duration (man-hours).
    pub fn with_work_mh(mut self, work_mh: f64) -> Self {
        self.work_mh = work_mh;
        self
    }

    /// Marks the item as manually pinned.
    pub fn manual(mut self) -> Self {
        self.is_manual = true;
        self
    }

    /// Sets the display position within the group.
    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    /// Whether the distributor may split this item across the crew.
    #[inline]
    pub fn is_auto_assignable(&self) -> bool {
        !self.is_manual
    }
}
