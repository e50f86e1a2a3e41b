//! Read-path views: one worker's day and per-crew rollups.
//!
//! The day view treats already-timed assignments as immovable blocks
//! and packs the untimed remainder into the gaps with the timeline
//! packer. Rollups report committed hours and task counts per worker,
//! excluding break/administrative time.

use serde::{Deserialize, Serialize};

use crate::error::{ManningError, Result};
use crate::models::{
    format_minute, normalize_for_shift, round_mh, GroupKey, SessionId, WorkerId,
};
use crate::store::SessionStore;

use super::{FloatingTask, Placement, ScheduleCalculator};

/// Per-worker rollup for the crew overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Worker identifier.
    pub worker_id: WorkerId,
    /// Worker name.
    pub name: String,
    /// Committed productive hours (breaks excluded).
    pub total_mh: f64,
    /// Distinct work items held (breaks excluded).
    pub task_count: usize,
    /// Committed hours against the capacity ceiling (0.0 when the
    /// ceiling is unset or non-positive).
    pub utilization: f64,
}

/// Rollups for every worker of a session, id order.
pub fn session_summary(store: &SessionStore, session_id: SessionId) -> Result<Vec<WorkerSummary>> {
    store.session(session_id)?;

    let mut summaries = Vec::new();
    for worker in store.workers_of(session_id) {
        let assignments = store.assignments_of_worker(worker.id);
        let total_mh: f64 = assignments
            .iter()
            .filter(|a| a.is_productive())
            .map(|a| a.allocated_mh)
            .sum();
        let mut item_ids: Vec<_> = assignments
            .iter()
            .filter(|a| a.is_productive())
            .filter_map(|a| a.work_item_id)
            .collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let utilization = if worker.limit_mh > 0.0 {
            total_mh / worker.limit_mh
        } else {
            0.0
        };
        summaries.push(WorkerSummary {
            worker_id: worker.id,
            name: worker.name.clone(),
            total_mh: round_mh(total_mh),
            task_count: item_ids.len(),
            utilization,
        });
    }
    Ok(summaries)
}

/// One worker's full-day timeline.
///
/// Timed assignments render as fixed placements; untimed ones are
/// packed into the remaining gaps. The result is sorted by
/// shift-normalized start so early-morning night blocks land after
/// the evening ones.
pub fn personal_schedule(
    store: &SessionStore,
    session_id: SessionId,
    worker_id: WorkerId,
) -> Result<Vec<Placement>> {
    let shift = store.session(session_id)?.shift;
    let worker = store.worker(worker_id)?;
    if worker.session_id != session_id {
        return Err(ManningError::WorkerNotFound(worker_id));
    }

    let mut fixed = Vec::new();
    let mut occupied = Vec::new();
    let mut floating = Vec::new();

    for assignment in store.assignments_of_worker(worker_id) {
        let (work_order, operation, description, group) = match assignment.work_item_id {
            Some(item_id) => {
                let item = store.item(item_id)?;
                (
                    item.work_order.clone(),
                    item.operation.clone(),
                    item.description.clone(),
                    item.group.clone(),
                )
            }
            None => (
                String::new(),
                String::new(),
                assignment.code.clone().unwrap_or_default(),
                GroupKey::new(""),
            ),
        };

        match assignment.time_slot() {
            Some(slot) => {
                fixed.push(Placement {
                    work_order,
                    operation,
                    description,
                    group,
                    hours: assignment.committed_mh(),
                    start_min: slot.start_min,
                    end_min: slot.end_min,
                    start_label: format_minute(slot.start_min),
                    end_label: format_minute(slot.end_min),
                    is_fixed: true,
                });
                occupied.push(slot);
            }
            None => {
                floating.push(
                    FloatingTask::new(work_order, assignment.allocated_mh)
                        .with_operation(operation)
                        .with_description(description)
                        .with_group(group),
                );
            }
        }
    }

    let packed = ScheduleCalculator::new(floating, occupied, shift).calculate();
    let mut schedule = fixed;
    schedule.extend(packed);
    schedule.sort_by_key(|p| normalize_for_shift(p.start_min, shift));
    Ok(schedule)
}
