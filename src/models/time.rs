//! Shift-relative time model.
//!
//! All scheduling math runs on minutes relative to one 24-hour cycle.
//! A shift window may span midnight (night crews), so minutes are mapped
//! onto a monotonic axis before any comparison: wall-clock minutes that
//! fall before the shift's start-of-day boundary belong to the *next*
//! calendar day and are shifted by +1440.
//!
//! # Time Model
//! - Wall-clock minutes are in [0, 1440).
//! - Shift-relative minutes are monotonic within one shift; a night
//!   block at 01:00 is represented as 1500 (1440 + 60).
//! - Intervals are half-open [start, end); `end` may exceed 1440 to
//!   represent next-day overflow.

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const DAY_MIN: i64 = 1440;

/// Shift classification for a session.
///
/// Fixed for the session's lifetime; determines the packing window and
/// the normalization threshold for cross-midnight sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    /// 08:00–20:00.
    Day,
    /// 20:00–08:00 next day.
    Night,
}

impl ShiftKind {
    /// Shift window start (shift-relative minutes).
    #[inline]
    pub fn start_min(&self) -> i64 {
        match self {
            ShiftKind::Day => 480,
            ShiftKind::Night => 1200,
        }
    }

    /// Shift window end (shift-relative minutes, exclusive).
    #[inline]
    pub fn end_min(&self) -> i64 {
        match self {
            ShiftKind::Day => 1200,
            ShiftKind::Night => 1920,
        }
    }

    /// The full 12-hour packing window.
    #[inline]
    pub fn window(&self) -> TimeSlot {
        TimeSlot::new(self.start_min(), self.end_min())
    }

    /// Wall-clock minutes strictly before this value belong to the next
    /// calendar day.
    #[inline]
    fn threshold(&self) -> i64 {
        self.start_min()
    }
}

/// Maps a wall-clock minute onto the shift's monotonic axis.
///
/// Minutes before the shift's start-of-day boundary are treated as next
/// day and shifted by +1440, so a sort by this value places 07:00 after
/// 20:00 within the same night shift.
///
/// # Example
/// ```
/// use shift_manning::models::{normalize_for_shift, ShiftKind};
///
/// assert_eq!(normalize_for_shift(60, ShiftKind::Night), 1500);
/// assert_eq!(normalize_for_shift(1300, ShiftKind::Night), 1300);
/// ```
#[inline]
pub fn normalize_for_shift(minute: i64, shift: ShiftKind) -> i64 {
    if minute < shift.threshold() {
        minute + DAY_MIN
    } else {
        minute
    }
}

/// Renders a shift-relative minute as `HH:MM`.
///
/// Values reduce modulo 1440, except exactly 1440 which renders as
/// `24:00` (end-of-day boundary marker).
pub fn format_minute(minute: i64) -> String {
    if minute == DAY_MIN {
        return "24:00".to_string();
    }
    let wall = minute.rem_euclid(DAY_MIN);
    format!("{:02}:{:02}", wall / 60, wall % 60)
}

/// A time interval [start, end) in shift-relative minutes.
///
/// Half-open: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    /// Interval start (minutes, inclusive).
    pub start_min: i64,
    /// Interval end (minutes, exclusive).
    pub end_min: i64,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(start_min: i64, end_min: i64) -> Self {
        Self { start_min, end_min }
    }

    /// Duration of this slot (minutes).
    #[inline]
    pub fn duration_min(&self) -> i64 {
        self.end_min - self.start_min
    }

    /// Whether a minute falls within this slot.
    #[inline]
    pub fn contains(&self, minute: i64) -> bool {
        minute >= self.start_min && minute < self.end_min
    }

    /// Whether two slots overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Lifts a raw wall-clock pair onto the shift's monotonic axis.
    ///
    /// An end at or before the start crosses midnight and gains a day;
    /// a start before the shift's day boundary belongs to the early
    /// morning of the next day and shifts the whole interval forward.
    pub fn from_wall_clock(start: i64, end: i64, shift: ShiftKind) -> Self {
        let mut start = start;
        let mut end = end;
        if end <= start {
            end += DAY_MIN;
        }
        if start < shift.threshold() {
            start += DAY_MIN;
            if end <= start {
                end += DAY_MIN;
            }
        }
        Self::new(start, end)
    }

    /// Intersects this slot with a window.
    ///
    /// Returns `None` when nothing remains.
    pub fn clamped(&self, window: &TimeSlot) -> Option<TimeSlot> {
        let start = self.start_min.max(window.start_min);
        let end = self.end_min.min(window.end_min);
        if end > start {
            Some(TimeSlot::new(start, end))
        } else {
            None
        }
    }
}

/// Merges slots into a sorted, non-overlapping obstacle list.
///
/// Overlapping and exactly-adjacent slots collapse into one.
pub fn merge_slots(mut slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    if slots.is_empty() {
        return slots;
    }
    slots.sort_by_key(|s| (s.start_min, s.end_min));

    let mut merged: Vec<TimeSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(last) if slot.start_min <= last.end_min => {
                last.end_min = last.end_min.max(slot.end_min);
            }
            _ => merged.push(slot),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_windows() {
        assert_eq!(ShiftKind::Day.window(), TimeSlot::new(480, 1200));
        assert_eq!(ShiftKind::Night.window(), TimeSlot::new(1200, 1920));
        assert_eq!(ShiftKind::Day.window().duration_min(), 720);
        assert_eq!(ShiftKind::Night.window().duration_min(), 720);
    }

    #[test]
    fn test_normalize_day() {
        // 07:00 belongs to the next day on a day shift, 09:00 does not.
        assert_eq!(normalize_for_shift(420, ShiftKind::Day), 1860);
        assert_eq!(normalize_for_shift(540, ShiftKind::Day), 540);
        assert_eq!(normalize_for_shift(480, ShiftKind::Day), 480);
    }

    #[test]
    fn test_normalize_night() {
        // 01:00 (60) sorts after 20:00 (1200) within a night shift.
        assert_eq!(normalize_for_shift(60, ShiftKind::Night), 1500);
        assert_eq!(normalize_for_shift(1200, ShiftKind::Night), 1200);
        assert!(normalize_for_shift(60, ShiftKind::Night) > 1200);
    }

    #[test]
    fn test_format_minute() {
        assert_eq!(format_minute(0), "00:00");
        assert_eq!(format_minute(480), "08:00");
        assert_eq!(format_minute(1199), "19:59");
        assert_eq!(format_minute(1500), "01:00");
        assert_eq!(format_minute(1440), "24:00");
    }

    #[test]
    fn test_slot_contains_and_overlap() {
        let a = TimeSlot::new(480, 600);
        assert!(a.contains(480));
        assert!(a.contains(599));
        assert!(!a.contains(600)); // exclusive end

        let b = TimeSlot::new(540, 660);
        assert!(a.overlaps(&b));

        let c = TimeSlot::new(600, 700); // touching, not overlapping
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_from_wall_clock_day() {
        // Plain daytime interval passes through.
        let s = TimeSlot::from_wall_clock(540, 600, ShiftKind::Day);
        assert_eq!(s, TimeSlot::new(540, 600));
    }

    #[test]
    fn test_from_wall_clock_night_early_morning() {
        // 01:00–02:00 lands after midnight on a night shift.
        let s = TimeSlot::from_wall_clock(60, 120, ShiftKind::Night);
        assert_eq!(s, TimeSlot::new(1500, 1560));
    }

    #[test]
    fn test_from_wall_clock_crossing_midnight() {
        // 23:00–01:00 keeps its start and gains a day on the end.
        let s = TimeSlot::from_wall_clock(1380, 60, ShiftKind::Night);
        assert_eq!(s, TimeSlot::new(1380, 1500));
    }

    #[test]
    fn test_from_wall_clock_ending_at_shift_close() {
        // A night block ending exactly at 08:00 reaches the window end.
        let s = TimeSlot::from_wall_clock(1320, 480, ShiftKind::Night);
        assert_eq!(s, TimeSlot::new(1320, 1920));
    }

    #[test]
    fn test_clamped() {
        let window = ShiftKind::Day.window();
        assert_eq!(
            TimeSlot::new(400, 700).clamped(&window),
            Some(TimeSlot::new(480, 700))
        );
        assert_eq!(TimeSlot::new(1500, 1560).clamped(&window), None);
        assert_eq!(TimeSlot::new(480, 480).clamped(&window), None);
    }

    #[test]
    fn test_merge_slots() {
        let merged = merge_slots(vec![
            TimeSlot::new(600, 660),
            TimeSlot::new(480, 540),
            TimeSlot::new(540, 610), // adjacent to first, overlaps second
        ]);
        assert_eq!(merged, vec![TimeSlot::new(480, 660)]);
    }

    #[test]
    fn test_merge_slots_disjoint() {
        let merged = merge_slots(vec![TimeSlot::new(700, 720), TimeSlot::new(480, 540)]);
        assert_eq!(merged, vec![TimeSlot::new(480, 540), TimeSlot::new(700, 720)]);
    }
}
