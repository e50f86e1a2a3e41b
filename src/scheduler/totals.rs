//! Aggregate refresher.
//!
//! Recomputes each worker's denormalized committed total from the
//! ground-truth assignment rows. Break/administrative and direct-entry
//! hours are excluded: they must not count toward the capacity-ceiling
//! comparison the distributor makes.

use crate::error::Result;
use crate::models::{round_mh, SessionId};
use crate::store::SessionStore;

/// Rewrites `used_mh` on every worker of a session.
///
/// Pure read-aggregate-write; idempotent between assignment mutations.
/// Call after any assignment change so capacity checks see current
/// state.
pub fn refresh_worker_totals(store: &mut SessionStore, session_id: SessionId) -> Result<()> {
    store.session(session_id)?;
    let worker_ids: Vec<_> = store
        .workers_of(session_id)
        .into_iter()
        .map(|w| w.id)
        .collect();

    for worker_id in worker_ids {
        let total: f64 = store
            .assignments_of_worker(worker_id)
            .into_iter()
            .filter(|a| a.is_productive())
            .map(|a| a.allocated_mh)
            .sum();
        store.set_worker_used_mh(worker_id, round_mh(total))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Assignment, Session, ShiftKind, TimeSlot, WorkItem, Worker,
    };

    #[test]
    fn test_breaks_and_direct_entries_excluded() {
        let mut store = SessionStore::new();
        let session = store.create_session(Session::new("S", ShiftKind::Day));
        let worker = store
            .add_worker(session, Worker::new("Kim").with_limit(24.0))
            .unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(20.0))
            .unwrap();

        store
            .add_assignment(Assignment::untimed(item, worker, 20.0))
            .unwrap();
        store
            .add_assignment(Assignment::break_time(worker, "lunch", TimeSlot::new(600, 630)))
            .unwrap();
        store
            .add_assignment(Assignment::direct_entry(
                worker,
                "toolroom",
                TimeSlot::new(700, 760),
            ))
            .unwrap();

        refresh_worker_totals(&mut store, session).unwrap();
        let used = store.worker(worker).unwrap().used_mh;
        assert!((used - 20.0).abs() < 1e-10, "break must not count, got {used}");
    }

    #[test]
    fn test_idempotent() {
        let mut store = SessionStore::new();
        let session = store.create_session(Session::new("S", ShiftKind::Night));
        let worker = store.add_worker(session, Worker::new("Lee")).unwrap();
        let item = store
            .add_item(session, WorkItem::new("WO-1").with_work_mh(2.5))
            .unwrap();
        store
            .add_assignment(Assignment::untimed(item, worker, 2.5))
            .unwrap();

        refresh_worker_totals(&mut store, session).unwrap();
        let first = store.worker(worker).unwrap().used_mh;
        refresh_worker_totals(&mut store, session).unwrap();
        let second = store.worker(worker).unwrap().used_mh;

        assert!((first - 2.5).abs() < 1e-10);
        assert!((first - second).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_session() {
        let mut store = SessionStore::new();
        assert!(refresh_worker_totals(&mut store, SessionId(9)).is_err());
    }
}
