//! Fair-share distributor.
//!
//! Spreads every auto-assignable work item's hours across the crew in
//! fixed 0.1-hour slots, honoring group priority order and per-worker
//! capacity ceilings.
//!
//! # Algorithm
//!
//! 1. Seed each worker's load with hours already committed outside the
//!    auto-assignable set (manual pins, breaks, direct entries).
//! 2. Delete the previous auto-assigned rows: full recompute, no
//!    incremental patching.
//! 3. Order items by group priority, then display order, then required
//!    hours descending (large jobs first so small ones fill gaps), then
//!    id.
//! 4. Deal each item's slots one at a time to the least-loaded worker
//!    below ceiling, choosing uniformly at random within an epsilon tie
//!    group; when every worker is saturated, fall back to the full crew
//!    rather than dropping work.
//! 5. Write one untimed assignment per worker with a non-zero share.
//!
//! The random tie-break is a fairness mechanism: without it, whichever
//! worker sorts first would absorb every tied slot. Re-runs produce
//! different individual splits but the same aggregate fairness (max
//! load spread bounded by one slot unit).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    Assignment, PriorityTable, SessionId, WorkItem, WorkItemId, Worker, WorkerId,
};
use crate::store::SessionStore;

use super::refresh_worker_totals;

/// Tuning knobs for the distributor.
#[derive(Debug, Clone, Copy)]
pub struct DistributorConfig {
    /// Allocation granule (man-hours). One slot = 6 minutes.
    pub slot_unit_mh: f64,
    /// Loads within this distance of the minimum tie for a slot.
    pub tie_epsilon_mh: f64,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            slot_unit_mh: 0.1,
            tie_epsilon_mh: 0.001,
        }
    }
}

/// Orders auto-assignable items for consumption.
///
/// Group priority ascending (unmapped groups default to 999), display
/// order ascending, required hours descending, id ascending.
pub(crate) fn auto_item_order(a: &WorkItem, b: &WorkItem, priorities: &PriorityTable) -> Ordering {
    priorities
        .order_of(&a.group)
        .cmp(&priorities.order_of(&b.group))
        .then_with(|| a.display_order.cmp(&b.display_order))
        .then_with(|| {
            b.work_mh
                .partial_cmp(&a.work_mh)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Recomputes the auto-assigned split of a session's work items.
///
/// The whole pass runs inside one store transaction: readers never
/// observe a half-deleted, half-rebuilt assignment set.
#[derive(Debug, Clone, Default)]
pub struct AutoAssignService {
    config: DistributorConfig,
}

impl AutoAssignService {
    /// Creates a distributor with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a distributor with explicit tuning.
    pub fn with_config(config: DistributorConfig) -> Self {
        Self { config }
    }

    /// Runs the fair-share distribution for one session.
    ///
    /// The random source drives only the tie-break in step 4; inject a
    /// seeded generator to make runs reproducible.
    pub fn run(
        &self,
        store: &mut SessionStore,
        session_id: SessionId,
        rng: &mut impl Rng,
    ) -> Result<()> {
        store.transaction(|store| self.run_inner(store, session_id, rng))
    }

    fn run_inner(
        &self,
        store: &mut SessionStore,
        session_id: SessionId,
        rng: &mut impl Rng,
    ) -> Result<()> {
        store.session(session_id)?;

        let workers: Vec<Worker> = store
            .workers_of(session_id)
            .into_iter()
            .cloned()
            .collect();
        if workers.is_empty() {
            debug!(session = %session_id, "no workers; nothing to distribute");
            return Ok(());
        }

        let auto_items: Vec<WorkItem> = store
            .items_of(session_id)
            .into_iter()
            .filter(|i| i.is_auto_assignable())
            .cloned()
            .collect();
        let auto_ids: HashSet<WorkItemId> = auto_items.iter().map(|i| i.id).collect();

        // Starting loads: everything committed outside the auto set.
        let mut loads: HashMap<WorkerId, f64> =
            workers.iter().map(|w| (w.id, 0.0)).collect();
        for assignment in store.assignments_of_session(session_id) {
            let in_auto = assignment
                .work_item_id
                .map(|i| auto_ids.contains(&i))
                .unwrap_or(false);
            if in_auto {
                continue;
            }
            if let Some(load) = loads.get_mut(&assignment.worker_id) {
                *load += assignment.committed_mh();
            }
        }

        let id_list: Vec<WorkItemId> = auto_ids.iter().copied().collect();
        let removed = store.delete_assignments_for_items(&id_list);

        let priorities = store.priority_table(session_id)?.clone();
        let mut ordered = auto_items;
        ordered.sort_by(|a, b| auto_item_order(a, b, &priorities));

        info!(
            session = %session_id,
            items = ordered.len(),
            workers = workers.len(),
            removed,
            "auto-assign recompute"
        );

        for item in &ordered {
            if item.work_mh <= 0.0 {
                continue;
            }
            let total_slots = (item.work_mh / self.config.slot_unit_mh).round() as i64;
            let mut allocation: HashMap<WorkerId, f64> = HashMap::new();

            for _ in 0..total_slots {
                let below_ceiling: Vec<&Worker> = workers
                    .iter()
                    .filter(|w| loads[&w.id] < w.limit_mh)
                    .collect();
                // Everyone saturated: overload the least-loaded rather
                // than leave work unassigned.
                let pool = if below_ceiling.is_empty() {
                    workers.iter().collect()
                } else {
                    below_ceiling
                };

                let min_load = pool
                    .iter()
                    .map(|w| loads[&w.id])
                    .fold(f64::INFINITY, f64::min);
                let tie_group: Vec<&Worker> = pool
                    .into_iter()
                    .filter(|w| loads[&w.id] <= min_load + self.config.tie_epsilon_mh)
                    .collect();
                let Some(&target) = tie_group.choose(rng) else {
                    break;
                };

                *loads.entry(target.id).or_insert(0.0) += self.config.slot_unit_mh;
                *allocation.entry(target.id).or_insert(0.0) += self.config.slot_unit_mh;
            }

            for worker in &workers {
                if let Some(&share) = allocation.get(&worker.id) {
                    if share > self.config.tie_epsilon_mh {
                        store.add_assignment(Assignment::untimed(item.id, worker.id, share))?;
                    }
                }
            }
        }

        refresh_worker_totals(store, session_id)
    }
}
