//! In-memory session store.
//!
//! The scheduling services are specified against a plain relational
//! interface: create/read/update/delete plus bulk delete/insert of
//! assignment rows, with session-scoped cascade semantics. This module
//! is the in-memory realization of that interface; nothing in the
//! services cares which engine backs it.
//!
//! # Ownership
//! A session owns its workers and work items; workers and work items
//! each own their assignments. Deleting an owner cascades. Priority
//! rows are owned by the session and keyed by group value only, with
//! no foreign key to work items.
//!
//! # Consistency
//! Mutating services wrap their delete-and-rebuild passes in
//! [`SessionStore::transaction`], which snapshots the store and rolls
//! back on error so readers never observe a half-rebuilt session.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{ManningError, Result};
use crate::models::{
    round_mh, Assignment, AssignmentId, GroupKey, PriorityTable, Session, SessionId, TimeSlot,
    WorkItem, WorkItemId, Worker, WorkerId,
};

/// Owns every persistent entity for any number of sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    next_session: u64,
    next_worker: u64,
    next_item: u64,
    next_assignment: u64,
    sessions: BTreeMap<SessionId, Session>,
    workers: BTreeMap<WorkerId, Worker>,
    items: BTreeMap<WorkItemId, WorkItem>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    priorities: HashMap<SessionId, PriorityTable>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` atomically: on error the store rolls back to its state
    /// before the call, so no partial rebuild is ever observable.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    // ---- sessions ----

    /// Inserts a session and returns its assigned id.
    pub fn create_session(&mut self, mut session: Session) -> SessionId {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        session.id = id;
        self.sessions.insert(id, session);
        self.priorities.insert(id, PriorityTable::new());
        id
    }

    /// Looks up a session.
    pub fn session(&self, id: SessionId) -> Result<&Session> {
        self.sessions
            .get(&id)
            .ok_or(ManningError::SessionNotFound(id))
    }

    /// Flips a session inactive (archival; the record stays).
    pub fn end_session(&mut self, id: SessionId) -> Result<()> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(ManningError::SessionNotFound(id))?;
        session.is_active = false;
        Ok(())
    }

    /// Deletes a session, cascading to its workers, items, and their
    /// assignments.
    pub fn delete_session(&mut self, id: SessionId) -> Result<()> {
        self.sessions
            .remove(&id)
            .ok_or(ManningError::SessionNotFound(id))?;
        self.priorities.remove(&id);

        let worker_ids: Vec<WorkerId> = self
            .workers
            .values()
            .filter(|w| w.session_id == id)
            .map(|w| w.id)
            .collect();
        let item_ids: Vec<WorkItemId> = self
            .items
            .values()
            .filter(|i| i.session_id == id)
            .map(|i| i.id)
            .collect();

        self.workers.retain(|_, w| w.session_id != id);
        self.items.retain(|_, i| i.session_id != id);
        let workers: HashSet<WorkerId> = worker_ids.into_iter().collect();
        let items: HashSet<WorkItemId> = item_ids.into_iter().collect();
        self.assignments.retain(|_, a| {
            !workers.contains(&a.worker_id)
                && !a.work_item_id.map(|i| items.contains(&i)).unwrap_or(false)
        });
        Ok(())
    }

    /// Deletes archived sessions created before `cutoff_ms`.
    ///
    /// Returns the number of sessions purged.
    pub fn purge_inactive(&mut self, cutoff_ms: i64) -> usize {
        let stale: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| !s.is_active && s.created_at_ms < cutoff_ms)
            .map(|s| s.id)
            .collect();
        for id in &stale {
            // Entries came from the live session map, so the delete
            // cannot miss.
            let _ = self.delete_session(*id);
        }
        stale.len()
    }

    /// All sessions, id order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    // ---- workers ----

    /// Inserts a worker into a session and returns its assigned id.
    pub fn add_worker(&mut self, session_id: SessionId, mut worker: Worker) -> Result<WorkerId> {
        self.session(session_id)?;
        self.next_worker += 1;
        let id = WorkerId(self.next_worker);
        worker.id = id;
        worker.session_id = session_id;
        self.workers.insert(id, worker);
        Ok(id)
    }

    /// Looks up a worker.
    pub fn worker(&self, id: WorkerId) -> Result<&Worker> {
        self.workers
            .get(&id)
            .ok_or(ManningError::WorkerNotFound(id))
    }

    /// A session's workers, id order.
    pub fn workers_of(&self, session_id: SessionId) -> Vec<&Worker> {
        self.workers
            .values()
            .filter(|w| w.session_id == session_id)
            .collect()
    }

    /// Deletes a worker, cascading to its assignments.
    pub fn remove_worker(&mut self, id: WorkerId) -> Result<()> {
        self.workers
            .remove(&id)
            .ok_or(ManningError::WorkerNotFound(id))?;
        self.assignments.retain(|_, a| a.worker_id != id);
        Ok(())
    }

    /// Updates a worker's capacity ceiling.
    pub fn set_worker_limit(&mut self, id: WorkerId, limit_mh: f64) -> Result<()> {
        let worker = self
            .workers
            .get_mut(&id)
            .ok_or(ManningError::WorkerNotFound(id))?;
        worker.limit_mh = limit_mh;
        Ok(())
    }

    /// Writes the denormalized committed total back onto a worker.
    pub fn set_worker_used_mh(&mut self, id: WorkerId, used_mh: f64) -> Result<()> {
        let worker = self
            .workers
            .get_mut(&id)
            .ok_or(ManningError::WorkerNotFound(id))?;
        worker.used_mh = used_mh;
        Ok(())
    }

    // ---- work items ----

    /// Inserts a work item and registers its group in the session's
    /// priority table.
    pub fn add_item(&mut self, session_id: SessionId, mut item: WorkItem) -> Result<WorkItemId> {
        self.session(session_id)?;
        self.next_item += 1;
        let id = WorkItemId(self.next_item);
        item.id = id;
        item.session_id = session_id;
        if let Some(table) = self.priorities.get_mut(&session_id) {
            table.register(&item.group);
        }
        self.items.insert(id, item);
        Ok(id)
    }

    /// Looks up a work item.
    pub fn item(&self, id: WorkItemId) -> Result<&WorkItem> {
        self.items.get(&id).ok_or(ManningError::WorkItemNotFound(id))
    }

    /// A session's work items, id order.
    pub fn items_of(&self, session_id: SessionId) -> Vec<&WorkItem> {
        self.items
            .values()
            .filter(|i| i.session_id == session_id)
            .collect()
    }

    /// Deletes a work item, cascading to its assignments and pruning
    /// priority rows its group no longer justifies.
    pub fn remove_item(&mut self, id: WorkItemId) -> Result<()> {
        let item = self
            .items
            .remove(&id)
            .ok_or(ManningError::WorkItemNotFound(id))?;
        self.assignments
            .retain(|_, a| a.work_item_id != Some(id));

        let live: HashSet<GroupKey> = self
            .items
            .values()
            .filter(|i| i.session_id == item.session_id)
            .map(|i| i.group.clone())
            .collect();
        if let Some(table) = self.priorities.get_mut(&item.session_id) {
            table.prune(&live);
        }
        Ok(())
    }

    /// Updates a work item's required hours.
    pub fn set_item_work_mh(&mut self, id: WorkItemId, work_mh: f64) -> Result<()> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(ManningError::WorkItemNotFound(id))?;
        item.work_mh = work_mh;
        Ok(())
    }

    // ---- priorities ----

    /// The session's priority table.
    pub fn priority_table(&self, session_id: SessionId) -> Result<&PriorityTable> {
        self.priorities
            .get(&session_id)
            .ok_or(ManningError::SessionNotFound(session_id))
    }

    /// Sets an explicit order for a group within a session.
    pub fn set_group_priority(
        &mut self,
        session_id: SessionId,
        group: GroupKey,
        order: i32,
    ) -> Result<()> {
        self.session(session_id)?;
        if let Some(table) = self.priorities.get_mut(&session_id) {
            table.set(group, order);
        }
        Ok(())
    }

    // ---- assignments ----

    /// Inserts an assignment and returns its assigned id.
    ///
    /// Enforces the untimed-uniqueness invariant: a (work item, worker)
    /// pair may carry at most one untimed row. Timed rows are exempt:
    /// a worker may hold many distinct timed occurrences.
    pub fn add_assignment(&mut self, mut assignment: Assignment) -> Result<AssignmentId> {
        self.worker(assignment.worker_id)?;
        if assignment.is_productive() && assignment.work_item_id.is_none() {
            return Err(ManningError::MissingWorkItem);
        }
        if let Some(item_id) = assignment.work_item_id {
            self.item(item_id)?;
            if !assignment.is_timed() {
                let duplicate = self.assignments.values().any(|a| {
                    a.work_item_id == Some(item_id)
                        && a.worker_id == assignment.worker_id
                        && !a.is_timed()
                });
                if duplicate {
                    return Err(ManningError::DuplicateUntimedAssignment {
                        item: item_id,
                        worker: assignment.worker_id,
                    });
                }
            }
        }
        self.next_assignment += 1;
        let id = AssignmentId(self.next_assignment);
        assignment.id = id;
        self.assignments.insert(id, assignment);
        Ok(id)
    }

    /// Looks up an assignment.
    pub fn assignment(&self, id: AssignmentId) -> Result<&Assignment> {
        self.assignments
            .get(&id)
            .ok_or(ManningError::AssignmentNotFound(id))
    }

    /// Every assignment held by a session's workers, id order.
    pub fn assignments_of_session(&self, session_id: SessionId) -> Vec<&Assignment> {
        let workers: HashSet<WorkerId> = self
            .workers
            .values()
            .filter(|w| w.session_id == session_id)
            .map(|w| w.id)
            .collect();
        self.assignments
            .values()
            .filter(|a| workers.contains(&a.worker_id))
            .collect()
    }

    /// One worker's assignments, id order.
    pub fn assignments_of_worker(&self, worker_id: WorkerId) -> Vec<&Assignment> {
        self.assignments
            .values()
            .filter(|a| a.worker_id == worker_id)
            .collect()
    }

    /// One work item's assignments, id order.
    pub fn assignments_of_item(&self, item_id: WorkItemId) -> Vec<&Assignment> {
        self.assignments
            .values()
            .filter(|a| a.work_item_id == Some(item_id))
            .collect()
    }

    /// Bulk-deletes every assignment tied to the given work items.
    ///
    /// Returns the number of rows removed.
    pub fn delete_assignments_for_items(&mut self, item_ids: &[WorkItemId]) -> usize {
        let targets: HashSet<WorkItemId> = item_ids.iter().copied().collect();
        let before = self.assignments.len();
        self.assignments.retain(|_, a| {
            !a.work_item_id.map(|i| targets.contains(&i)).unwrap_or(false)
        });
        before - self.assignments.len()
    }

    /// Writes a concrete time range onto a previously-untimed row.
    ///
    /// This is the only in-place assignment update across a recompute;
    /// everything else is delete-and-recreate.
    pub fn set_assignment_time(&mut self, id: AssignmentId, slot: TimeSlot) -> Result<()> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or(ManningError::AssignmentNotFound(id))?;
        assignment.start_min = Some(slot.start_min);
        assignment.end_min = Some(slot.end_min);
        Ok(())
    }

    /// Pins a work item to a chosen set of workers, splitting its hours
    /// evenly, or releases it back to the distributor when the set is
    /// empty.
    ///
    /// Existing assignments of the item are replaced outright.
    pub fn assign_manual(&mut self, item_id: WorkItemId, worker_ids: &[WorkerId]) -> Result<()> {
        self.item(item_id)?;
        for worker_id in worker_ids {
            self.worker(*worker_id)?;
        }
        self.delete_assignments_for_items(&[item_id]);

        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(ManningError::WorkItemNotFound(item_id))?;
        if worker_ids.is_empty() {
            item.is_manual = false;
            return Ok(());
        }
        item.is_manual = true;
        let share = round_mh(item.work_mh / worker_ids.len() as f64);
        for worker_id in worker_ids {
            self.add_assignment(Assignment::untimed(item_id, *worker_id, share))?;
        }
        Ok(())
    }
}
