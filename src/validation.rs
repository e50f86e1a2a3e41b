//! Session integrity validation.
//!
//! Checks structural integrity of one session's roster, work list, and
//! assignment rows before (or after) a recompute. Detects:
//! - Duplicate worker names within the session
//! - Non-positive capacity ceilings
//! - Negative required hours on work items
//! - Assignments referencing missing workers or work items
//! - Degenerate time ranges (end at or before start)
//! - Duplicate untimed (work item, worker) pairs
//! - Productive assignments lacking a work-item reference

use std::collections::{HashMap, HashSet};

use crate::models::{SessionId, WorkItemId, WorkerId};
use crate::store::SessionStore;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The session itself does not exist.
    UnknownSession,
    /// Two workers in the session share a name.
    DuplicateWorkerName,
    /// A worker's capacity ceiling is zero or negative.
    NonPositiveLimit,
    /// A work item requires negative hours.
    NegativeWorkHours,
    /// An assignment references a worker outside the session.
    InvalidWorkerReference,
    /// An assignment references a work item that doesn't exist.
    InvalidItemReference,
    /// A timed assignment ends at or before its start.
    DegenerateTimeRange,
    /// A (work item, worker) pair holds more than one untimed row.
    DuplicateUntimedPair,
    /// A productive assignment carries no work-item reference.
    MissingItemReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates one session's records.
///
/// Checks:
/// 1. Worker names are unique within the session
/// 2. Capacity ceilings are positive
/// 3. Required hours are non-negative
/// 4. Assignment worker references resolve within the session
/// 5. Assignment item references resolve
/// 6. Timed ranges carry a positive duration
/// 7. At most one untimed row per (item, worker) pair
/// 8. Productive rows reference a work item
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_session(store: &SessionStore, session_id: SessionId) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(err) = store.session(session_id) {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::UnknownSession,
            err.to_string(),
        )]);
    }

    let workers = store.workers_of(session_id);
    let mut names = HashSet::new();
    let mut worker_ids: HashSet<WorkerId> = HashSet::new();
    for worker in &workers {
        worker_ids.insert(worker.id);
        if !names.insert(worker.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateWorkerName,
                format!("Duplicate worker name: {}", worker.name),
            ));
        }
        if worker.limit_mh <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveLimit,
                format!("Worker '{}' has non-positive limit_mh", worker.name),
            ));
        }
    }

    let item_ids: HashSet<WorkItemId> = store
        .items_of(session_id)
        .iter()
        .map(|i| i.id)
        .collect();
    for item in store.items_of(session_id) {
        if item.work_mh < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeWorkHours,
                format!("Work item '{}' requires negative hours", item.work_order),
            ));
        }
    }

    let mut untimed_pairs: HashMap<(WorkItemId, WorkerId), usize> = HashMap::new();
    for assignment in store.assignments_of_session(session_id) {
        if !worker_ids.contains(&assignment.worker_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWorkerReference,
                format!(
                    "Assignment {} references worker {} outside the session",
                    assignment.id, assignment.worker_id
                ),
            ));
        }
        match assignment.work_item_id {
            Some(item_id) => {
                if !item_ids.contains(&item_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidItemReference,
                        format!(
                            "Assignment {} references unknown work item {}",
                            assignment.id, item_id
                        ),
                    ));
                }
                if !assignment.is_timed() {
                    *untimed_pairs
                        .entry((item_id, assignment.worker_id))
                        .or_insert(0) += 1;
                }
            }
            None => {
                if assignment.is_productive() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingItemReference,
                        format!(
                            "Productive assignment {} has no work item",
                            assignment.id
                        ),
                    ));
                }
            }
        }
        // A raw pair with equal bounds carries no placeable duration;
        // unequal pairs lift to a positive range on the shift axis.
        if let Some(slot) = assignment.time_slot() {
            if slot.duration_min() == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DegenerateTimeRange,
                    format!("Assignment {} has a degenerate time range", assignment.id),
                ));
            }
        }
    }

    for ((item, worker), count) in untimed_pairs {
        if count > 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateUntimedPair,
                format!("{count} untimed rows for work item {item} / worker {worker}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
