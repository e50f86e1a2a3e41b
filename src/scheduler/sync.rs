//! Co-assignment synchronizer.
//!
//! After distribution, a work item split across several workers has
//! untimed shares. This service picks one common start time per such
//! item so the crew begins the shared task together, respecting every
//! participant's already-placed blocks.
//!
//! # Algorithm
//!
//! 1. Build each worker's obstacle timeline from every assignment that
//!    already carries a time range.
//! 2. For each multi-worker item still untimed, in the distributor's
//!    consumption order: scan forward from the shift start with a probe
//!    of the longest participant duration; on any collision, jump to
//!    the furthest colliding obstacle end among all participants.
//! 3. On success, every participant starts at the common minute and
//!    ends after its own duration; the placed intervals immediately
//!    become obstacles for later items in the same pass.
//! 4. An item with no common slot before shift end stays untimed; the
//!    read-path packer treats it as floating on next render.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    merge_slots, AssignmentId, SessionId, TimeSlot, WorkItem, WorkerId,
};
use crate::store::SessionStore;

use super::distributor::auto_item_order;
use super::refresh_worker_totals;

/// Writes a shared start time onto multi-worker items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleSyncService;

impl ScheduleSyncService {
    /// Creates the synchronizer.
    pub fn new() -> Self {
        Self
    }

    /// Runs the synchronization pass for one session.
    pub fn run(&self, store: &mut SessionStore, session_id: SessionId) -> Result<()> {
        store.transaction(|store| self.run_inner(store, session_id))
    }

    fn run_inner(&self, store: &mut SessionStore, session_id: SessionId) -> Result<()> {
        let shift = store.session(session_id)?.shift;
        let window = shift.window();

        // Obstacle timelines from everything already placed.
        let mut obstacles: HashMap<WorkerId, Vec<TimeSlot>> = HashMap::new();
        for assignment in store.assignments_of_session(session_id) {
            if let Some(slot) = assignment.time_slot() {
                let lifted = TimeSlot::from_wall_clock(slot.start_min, slot.end_min, shift);
                if let Some(clamped) = lifted.clamped(&window) {
                    obstacles
                        .entry(assignment.worker_id)
                        .or_default()
                        .push(clamped);
                }
            }
        }
        for timeline in obstacles.values_mut() {
            *timeline = merge_slots(std::mem::take(timeline));
        }

        let priorities = store.priority_table(session_id)?.clone();
        let mut items: Vec<WorkItem> = store
            .items_of(session_id)
            .into_iter()
            .cloned()
            .collect();
        items.sort_by(|a, b| auto_item_order(a, b, &priorities));

        let mut placed_items = 0usize;
        for item in &items {
            // Participants: untimed shares of this item, minutes each.
            let participants: Vec<(AssignmentId, WorkerId, i64)> = store
                .assignments_of_item(item.id)
                .into_iter()
                .filter(|a| !a.is_timed())
                .map(|a| {
                    (
                        a.id,
                        a.worker_id,
                        (a.allocated_mh * 60.0).round() as i64,
                    )
                })
                .collect();
            if participants.len() < 2 {
                continue;
            }
            let probe_min = participants.iter().map(|p| p.2).max().unwrap_or(0);
            if probe_min <= 0 {
                continue;
            }

            let Some(start) =
                common_start(&participants, &obstacles, &window, probe_min)
            else {
                debug!(item = %item.id, "no common slot before shift end");
                continue;
            };

            for (assignment_id, worker_id, duration) in &participants {
                if *duration <= 0 {
                    continue;
                }
                let slot = TimeSlot::new(start, start + duration);
                store.set_assignment_time(*assignment_id, slot)?;
                let timeline = obstacles.entry(*worker_id).or_default();
                timeline.push(slot);
                *timeline = merge_slots(std::mem::take(timeline));
            }
            placed_items += 1;
        }

        info!(session = %session_id, placed_items, "schedule sync pass");
        refresh_worker_totals(store, session_id)
    }
}

/// Scans forward for a start minute at which every participant is free
/// for the probe duration.
///
/// On collision the cursor jumps to the furthest colliding obstacle end
/// among any participant; obstacle ends strictly exceed the cursor, so
/// the scan terminates.
fn common_start(
    participants: &[(AssignmentId, WorkerId, i64)],
    obstacles: &HashMap<WorkerId, Vec<TimeSlot>>,
    window: &TimeSlot,
    probe_min: i64,
) -> Option<i64> {
    let mut candidate = window.start_min;
    while candidate + probe_min <= window.end_min {
        let probe = TimeSlot::new(candidate, candidate + probe_min);
        let mut jump: Option<i64> = None;
        for (_, worker_id, _) in participants {
            if let Some(timeline) = obstacles.get(worker_id) {
                for block in timeline {
                    if block.overlaps(&probe) {
                        jump = Some(jump.map_or(block.end_min, |j| j.max(block.end_min)));
                    }
                }
            }
        }
        match jump {
            Some(next) => candidate = next,
            None => return Some(candidate),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Session, ShiftKind, WorkItem, Worker};

    fn session_with_workers(
        shift: ShiftKind,
        count: usize,
    ) -> (SessionStore, SessionId, Vec<WorkerId>) {
        let mut store = SessionStore::new();
        let session = store.create_session(Session::new("S", shift));
        let workers = (0..count)
            .map(|i| {
                store
                    .add_worker(session, Worker::new(format!("W{i}")))
                    .unwrap()
            })
            .collect();
        (store, session, workers)
    }

    fn slot_of(store: &SessionStore, item: crate::models::WorkItemId, worker: WorkerId) -> TimeSlot {
        store
            .assignments_of_item(item)
            .into_iter()
            .find(|a| a.worker_id == worker)
            .and_then(|a| a.time_slot())
            .expect("assignment should be timed")
    }

    #[test]
    fn test_shared_start_different_ends() {
        // A needs 60 min, B needs 90: same start, own ends.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 2);
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(2.5))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 1.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 1.5))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();

        assert_eq!(slot_of(&store, item, workers[0]), TimeSlot::new(480, 540));
        assert_eq!(slot_of(&store, item, workers[1]), TimeSlot::new(480, 570));
    }

    #[test]
    fn test_scan_skips_any_participants_block() {
        // B has a break at shift start; the pair starts after it.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 2);
        store
            .add_assignment(Assignment::break_time(
                workers[1],
                "briefing",
                TimeSlot::new(480, 510),
            ))
            .unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(2.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 1.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 1.0))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();

        assert_eq!(slot_of(&store, item, workers[0]), TimeSlot::new(510, 570));
        assert_eq!(slot_of(&store, item, workers[1]), TimeSlot::new(510, 570));
    }

    #[test]
    fn test_jump_to_furthest_colliding_end() {
        // Overlapping blocks on both workers: the cursor clears the
        // later end in one hop, not the earlier.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 2);
        store
            .add_assignment(Assignment::break_time(
                workers[0],
                "briefing",
                TimeSlot::new(480, 540),
            ))
            .unwrap();
        store
            .add_assignment(Assignment::break_time(
                workers[1],
                "toolcheck",
                TimeSlot::new(500, 600),
            ))
            .unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(1.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 0.5))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 0.5))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();
        assert_eq!(slot_of(&store, item, workers[0]).start_min, 600);
    }

    #[test]
    fn test_single_worker_items_left_alone() {
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 1);
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(1.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 1.0))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();
        assert!(!store.assignments_of_item(item)[0].is_timed());
    }

    #[test]
    fn test_unplaceable_item_stays_untimed() {
        // One participant's day is fully blocked: no common slot.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 2);
        store
            .add_assignment(Assignment::break_time(
                workers[1],
                "offsite",
                TimeSlot::new(480, 1200),
            ))
            .unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(2.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 1.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 1.0))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();
        for a in store.assignments_of_item(item) {
            assert!(!a.is_timed());
        }
    }

    #[test]
    fn test_earlier_items_block_later_ones() {
        // Two shared items over the same pair: the second starts where
        // the first ends.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Day, 2);
        let first = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(2.0))
            .unwrap();
        let second = store
            .add_item(session, WorkItem::new("WO-2").with_work_mh(1.0))
            .unwrap();
        for item in [first, second] {
            for worker in &workers {
                let mh = store.item(item).unwrap().work_mh / 2.0;
                store
                    .add_assignment(Assignment::untimed(item, *worker, mh))
                    .unwrap();
            }
        }

        ScheduleSyncService::new().run(&mut store, session).unwrap();

        // WO-1 sorts first (same default priority, larger hours).
        assert_eq!(slot_of(&store, first, workers[0]), TimeSlot::new(480, 540));
        assert_eq!(slot_of(&store, second, workers[0]), TimeSlot::new(540, 570));
    }

    #[test]
    fn test_night_shift_window_clamp() {
        // 13h of shared work cannot start: probe exceeds the window.
        let (mut store, session, workers) = session_with_workers(ShiftKind::Night, 2);
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(26.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 13.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 13.0))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();
        for a in store.assignments_of_item(item) {
            assert!(!a.is_timed());
        }
    }

    #[test]
    fn test_placements_stay_inside_window() {
        let (mut store, session, workers) = session_with_workers(ShiftKind::Night, 2);
        store
            .add_assignment(Assignment::break_time(
                workers[0],
                "meal",
                TimeSlot::new(0, 60), // midnight–01:00, lifts to 1440–1500
            ))
            .unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(8.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[0], 4.0))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, workers[1], 4.0))
            .unwrap();

        ScheduleSyncService::new().run(&mut store, session).unwrap();
        let window = ShiftKind::Night.window();
        for a in store.assignments_of_item(item) {
            let slot = a.time_slot().expect("timed");
            assert!(slot.start_min >= window.start_min);
            assert!(slot.end_min <= window.end_min);
        }
    }
}
