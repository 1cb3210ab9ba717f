//! Stable grouping of rows by plant coordinates.
//!
//! Groups come out in ascending key order (numbers compare numerically, so
//! `2` sorts before `10`); rows inside a group keep their input order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Machine/station/actuator number as written in the sheets (`01`, `2`, `10`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberKey(pub String);

impl NumberKey {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    /// Same plant coordinate however it is padded: `2` matches `02`.
    pub fn same_number(&self, other: &NumberKey) -> bool {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn group_by<'r, T, K, F>(items: &[&'r T], key: F) -> Vec<(K, Vec<&'r T>)>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'r T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(*item)).or_default().push(*item);
    }
    groups.into_iter().collect()
}
