//! Scheduling services.
//!
//! The write path is a three-step recompute triggered by any roster or
//! work-list change: the distributor regenerates the auto-assigned
//! split, the synchronizer pins a shared start on multi-worker items,
//! and the refresher updates the denormalized per-worker totals. The
//! read path packs one worker's day on demand.
//!
//! # Algorithm
//!
//! All services are greedy and deterministic except for the
//! distributor's intentionally randomized tie-break. They never
//! suspend: each call runs to completion inside one store transaction.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"

mod calculator;
mod distributor;
mod summary;
mod sync;
mod totals;

pub use calculator::{FloatingTask, Placement, ScheduleCalculator};
pub use distributor::{AutoAssignService, DistributorConfig};
pub use summary::{personal_schedule, session_summary, WorkerSummary};
pub use sync::ScheduleSyncService;
pub use totals::refresh_worker_totals;

use crate::error::Result;
use crate::models::SessionId;
use crate::store::SessionStore;

/// Runs the fair-share distributor for one session with default tuning
/// and the thread-local random source.
///
/// # Example
/// ```
/// use shift_manning::models::{Session, ShiftKind, WorkItem, Worker};
/// use shift_manning::scheduler;
/// use shift_manning::store::SessionStore;
///
/// let mut store = SessionStore::new();
/// let session = store.create_session(Session::new("Section A", ShiftKind::Day));
/// store.add_worker(session, Worker::new("Kim")).unwrap();
/// store.add_worker(session, Worker::new("Lee")).unwrap();
/// store
///     .add_item(session, WorkItem::new("WO-1").with_work_mh(1.5))
///     .unwrap();
///
/// scheduler::run_auto_assign(&mut store, session).unwrap();
///
/// let summaries = scheduler::session_summary(&store, session).unwrap();
/// let total: f64 = summaries.iter().map(|s| s.total_mh).sum();
/// assert!((total - 1.5).abs() < 1e-9);
/// ```
pub fn run_auto_assign(store: &mut SessionStore, session_id: SessionId) -> Result<()> {
    AutoAssignService::new().run(store, session_id, &mut rand::rng())
}

/// Runs the co-assignment synchronizer for one session.
pub fn run_sync_schedule(store: &mut SessionStore, session_id: SessionId) -> Result<()> {
    ScheduleSyncService::new().run(store, session_id)
}
