//! Group keys and priority ordering.
//!
//! Work items are grouped by a free-text key (a model/aircraft code
//! such as "HL7777"). Groups have no referential integrity to items:
//! the key is a normalized value type used for map lookups, and an item
//! may carry a key that no priority row knows about yet; such groups
//! sort with the default order 999.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Order used for groups with no priority row. Lower sorts first.
pub const DEFAULT_PRIORITY: i32 = 999;

/// A normalized, case-folded group key.
///
/// Construction trims surrounding whitespace and upper-cases the value,
/// so `"hl7777 "` and `"HL7777"` are the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    /// Creates a normalized key.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    /// The normalized key text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is blank (items without a group code).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for GroupKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Per-session priority order over group keys.
///
/// Drives the order in which the distributor consumes work items.
/// Groups are registered as they first appear and pruned once no item
/// references them; unknown groups read as [`DEFAULT_PRIORITY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriorityTable {
    orders: HashMap<GroupKey, i32>,
}

impl PriorityTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit order for a group.
    pub fn set(&mut self, group: GroupKey, order: i32) {
        self.orders.insert(group, order);
    }

    /// Priority order for a group; [`DEFAULT_PRIORITY`] when unmapped.
    #[inline]
    pub fn order_of(&self, group: &GroupKey) -> i32 {
        self.orders.get(group).copied().unwrap_or(DEFAULT_PRIORITY)
    }

    /// Registers a newly-seen group at the end of the current order.
    ///
    /// Blank keys and already-known groups are left untouched.
    pub fn register(&mut self, group: &GroupKey) {
        if group.is_empty() || self.orders.contains_key(group) {
            return;
        }
        let next = self.orders.values().copied().max().unwrap_or(0) + 1;
        self.orders.insert(group.clone(), next);
    }

    /// Drops every group not present in `live`.
    pub fn prune(&mut self, live: &HashSet<GroupKey>) {
        self.orders.retain(|group, _| live.contains(group));
    }

    /// Number of mapped groups.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no group is mapped.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_normalization() {
        assert_eq!(GroupKey::new(" hl7777 "), GroupKey::new("HL7777"));
        assert_eq!(GroupKey::new("hl7777").as_str(), "HL7777");
        assert!(GroupKey::new("  ").is_empty());
    }

    #[test]
    fn test_order_of_unmapped_is_default() {
        let table = PriorityTable::new();
        assert_eq!(table.order_of(&GroupKey::new("HL7777")), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_register_appends() {
        let mut table = PriorityTable::new();
        table.register(&GroupKey::new("A"));
        table.register(&GroupKey::new("B"));
        table.register(&GroupKey::new("A")); // no-op
        assert_eq!(table.order_of(&GroupKey::new("A")), 1);
        assert_eq!(table.order_of(&GroupKey::new("B")), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_register_skips_blank() {
        let mut table = PriorityTable::new();
        table.register(&GroupKey::new(""));
        assert!(table.is_empty());
    }

    #[test]
    fn test_prune() {
        let mut table = PriorityTable::new();
        table.set(GroupKey::new("A"), 1);
        table.set(GroupKey::new("B"), 2);

        let mut live = HashSet::new();
        live.insert(GroupKey::new("B"));
        table.prune(&live);

        assert_eq!(table.order_of(&GroupKey::new("A")), DEFAULT_PRIORITY);
        assert_eq!(table.order_of(&GroupKey::new("B")), 2);
    }
}
