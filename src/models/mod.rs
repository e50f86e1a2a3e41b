//! Manning domain models.
//!
//! Provides the core data types for planning one shift: the session
//! being planned, its crew, the work list, priority ordering over work
//! groups, and the assignment records that tie them together.
//!
//! # Domain Mappings
//!
//! | shift-manning | Shop Floor | Maintenance Line |
//! |---------------|-----------|------------------|
//! | Session | Planning Sheet | Shift Plan |
//! | Worker | Operator | Mechanic |
//! | WorkItem | Work Order Line | Task Card |
//! | Assignment | Allocation Row | Sign-off Slot |

mod assignment;
mod priority;
mod session;
mod time;
mod work_item;
mod worker;

pub use assignment::{round_mh, Assignment, AssignmentCategory, AssignmentId};
pub use priority::{GroupKey, PriorityTable, DEFAULT_PRIORITY};
pub use session::{Session, SessionId};
pub use time::{format_minute, merge_slots, normalize_for_shift, ShiftKind, TimeSlot, DAY_MIN};
pub use work_item::{WorkItem, WorkItemId};
pub use worker::{Worker, WorkerId, DEFAULT_LIMIT_MH};
