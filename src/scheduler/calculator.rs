//! Timeline packer.
//!
//! Converts a worker's hour allocations into concrete start/end minute
//! ranges on the day's timeline, flowing around blocks that already
//! carry a time.
//!
//! # Algorithm
//!
//! 1. Lift fixed intervals onto the shift axis, clamp to the window,
//!    merge into a sorted obstacle list.
//! 2. Walk a cursor from the shift start; for each floating task in
//!    input order, consume free runs between obstacles until the task's
//!    minutes are spent or the shift ends.
//! 3. A task that cannot fully fit is truncated at the shift end:
//!    the worker has genuinely run out of shift time.
//!
//! # Complexity
//! O(n * k) where n=floating tasks, k=fixed obstacles.

use serde::{Deserialize, Serialize};

use crate::models::{
    format_minute, merge_slots, round_mh, GroupKey, ShiftKind, TimeSlot,
};

/// A task awaiting placement: carries hours but no time yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingTask {
    /// Work order number.
    pub work_order: String,
    /// Operation code.
    pub operation: String,
    /// Display description.
    pub description: String,
    /// Priority group of the owning item.
    pub group: GroupKey,
    /// Required duration (man-hours).
    pub hours: f64,
}

impl FloatingTask {
    /// Creates a floating task.
    pub fn new(work_order: impl Into<String>, hours: f64) -> Self {
        Self {
            work_order: work_order.into(),
            operation: String::new(),
            description: String::new(),
            group: GroupKey::new(""),
            hours,
        }
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

    /// Sets the priority group.
    pub fn with_group(mut self, group: impl Into<GroupKey>) -> Self {
        self.group = group.into();
        self
    }
}

/// A concrete placement on the day's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Work order number.
    pub work_order: String,
    /// Operation code.
    pub operation: String,
    /// Display description.
    pub description: String,
    /// Priority group of the owning item.
    pub group: GroupKey,
    /// Placed duration (man-hours).
    pub hours: f64,
    /// Start (shift-relative minutes).
    pub start_min: i64,
    /// End (shift-relative minutes).
    pub end_min: i64,
    /// Start rendered as `HH:MM`.
    pub start_label: String,
    /// End rendered as `HH:MM`.
    pub end_label: String,
    /// Whether the time was pinned rather than packed.
    pub is_fixed: bool,
}

impl Placement {
    fn packed(task: &FloatingTask, slot: TimeSlot) -> Self {
        Self {
            work_order: task.work_order.clone(),
            operation: task.operation.clone(),
            description: task.description.clone(),
            group: task.group.clone(),
            hours: round_mh(slot.duration_min() as f64 / 60.0),
            start_min: slot.start_min,
            end_min: slot.end_min,
            start_label: format_minute(slot.start_min),
            end_label: format_minute(slot.end_min),
            is_fixed: false,
        }
    }
}

/// Packs floating tasks into the free time of one shift window.
///
/// Pure: no persistence access, no side effects. Output order follows
/// input order, not start-time order; callers sort by
/// [`normalize_for_shift`](crate::models::normalize_for_shift) for display.
///
/// # Example
///
/// ```
/// use shift_manning::models::{ShiftKind, TimeSlot};
/// use shift_manning::scheduler::{FloatingTask, ScheduleCalculator};
///
/// // Two hours of work around a 09:00–10:00 block: one hour before,
/// // one hour after.
/// let calc = ScheduleCalculator::new(
///     vec![FloatingTask::new("WO-1", 2.0)],
///     vec![TimeSlot::new(540, 600)],
///     ShiftKind::Day,
/// );
/// let placements = calc.calculate();
/// assert_eq!(placements.len(), 2);
/// assert_eq!((placements[0].start_min, placements[0].end_min), (480, 540));
/// assert_eq!((placements[1].start_min, placements[1].end_min), (600, 660));
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleCalculator {
    tasks: Vec<FloatingTask>,
    obstacles: Vec<TimeSlot>,
    shift: ShiftKind,
}

impl ScheduleCalculator {
    /// Creates a calculator over floating tasks and fixed obstacles.
    ///
    /// Fixed slots may arrive in raw wall-clock minutes; they are
    /// lifted onto the shift axis, clamped to the window (intervals
    /// entirely outside are discarded), and merged.
    pub fn new(
        floating_tasks: Vec<FloatingTask>,
        fixed_slots: Vec<TimeSlot>,
        shift: ShiftKind,
    ) -> Self {
        let window = shift.window();
        let obstacles = merge_slots(
            fixed_slots
                .into_iter()
                .map(|s| TimeSlot::from_wall_clock(s.start_min, s.end_min, shift))
                .filter_map(|s| s.clamped(&window))
                .collect(),
        );
        Self {
            tasks: floating_tasks,
            obstacles,
            shift,
        }
    }

    /// Produces a legal, non-overlapping placement for every floating
    /// task, in input order.
    pub fn calculate(&self) -> Vec<Placement> {
        let window = self.shift.window();
        let mut cursor = window.start_min;
        let mut results = Vec::new();

        for task in &self.tasks {
            let mut remain = (task.hours * 60.0).round() as i64;
            if remain <= 0 {
                continue;
            }
            while remain > 0 && cursor < window.end_min {
                if let Some(block) = self.obstacles.iter().find(|o| o.contains(cursor)) {
                    cursor = block.end_min;
                    continue;
                }
                let limit = self
                    .obstacles
                    .iter()
                    .map(|o| o.start_min)
                    .filter(|&s| s > cursor)
                    .min()
                    .map_or(window.end_min, |s| s.min(window.end_min));
                let free = limit - cursor;
                if free <= 0 {
                    cursor = limit;
                    continue;
                }
                let used = remain.min(free);
                results.push(Placement::packed(
                    task,
                    TimeSlot::new(cursor, cursor + used),
                ));
                cursor += used;
                remain -= used;
            }
        }
        results
    }
}
