//! Update comparator - plain numeric dot-segment comparison, not semver.

use std::cmp::Ordering;

use crate::model::PendingUpdate;

// Leading digits of a segment; anything else counts as 0.
fn segment_value(segment: &str) -> u64 {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment[..end].parse().unwrap_or(0)
}

/// Whether `candidate` is strictly newer than `current`.
///
/// Segments are compared left to right, missing trailing segments count as
/// 0. An empty `current` means there is no baseline, so any non-empty
/// candidate is newer.
pub fn is_newer_version(candidate: &str, current: &str) -> bool {
    if current.is_empty() {
        return !candidate.is_empty();
    }

    let a: Vec<u64> = candidate.split('.').map(segment_value).collect();
    let b: Vec<u64> = current.split('.').map(segment_value).collect();

    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    false
}

/// Pending updates whose offered version is actually newer.
pub fn updates_available(updates: &[PendingUpdate]) -> Vec<&PendingUpdate> {
    updates
        .iter()
        .filter(|u| is_newer_version(&u.available, &u.current))
        .collect()
}
