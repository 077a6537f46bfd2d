//! Per-item consolidated outcomes (spec §3 `UpdateResult`/`ErrorDetail`,
//! §4.7.5). Grounded on
//! `original_source/stockx/ext/inventory/batch/results.py`.

use std::collections::HashMap;

/// (message, occurrences, listing_id?) (spec §3). Errors are counted by
/// identical message within a result; the per-listing-id form is used for
/// delete results where the input carries the listing id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub occurrences: u32,
    pub listing_id: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>, listing_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            occurrences: 1,
            listing_id,
        }
    }
}

/// Per-item consolidated outcome across create+update+delete lifecycle
/// stages within a single reconciliation cycle (spec §3).
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    pub item_id: u64,
    pub created: std::collections::HashSet<String>,
    pub updated: std::collections::HashSet<String>,
    pub deleted: std::collections::HashSet<String>,
    pub failed: std::collections::HashSet<String>,
    pub errors: Vec<ErrorDetail>,
}

impl UpdateResult {
    pub fn empty(item_id: u64) -> Self {
        Self {
            item_id,
            ..Default::default()
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>, listing_id: Option<String>) {
        let message = message.into();
        if let Some(existing) = self.errors.iter_mut().find(|e| e.message == message) {
            existing.occurrences += 1;
        } else {
            self.errors.push(ErrorDetail {
                message,
                occurrences: 1,
                listing_id,
            });
        }
    }

    /// Applies the §3/§4.7.5 resolution rules to a single result in place:
    /// created∩updated → updated; created∩deleted → deleted;
    /// updated∩deleted → deleted; failed∩(anything else) → removed from
    /// failed.
    fn apply_resolution_rules(&mut self) {
        let created_and_updated: Vec<String> =
            self.created.intersection(&self.updated).cloned().collect();
        for id in created_and_updated {
            self.created.remove(&id);
        }

        let created_and_deleted: Vec<String> =
            self.created.intersection(&self.deleted).cloned().collect();
        for id in created_and_deleted {
            self.created.remove(&id);
        }

        let updated_and_deleted: Vec<String> =
            self.updated.intersection(&self.deleted).cloned().collect();
        for id in updated_and_deleted {
            self.updated.remove(&id);
        }

        let failed_elsewhere: Vec<String> = self
            .failed
            .iter()
            .filter(|id| {
                self.created.contains(*id) || self.updated.contains(*id) || self.deleted.contains(*id)
            })
            .cloned()
            .collect();
        for id in failed_elsewhere {
            self.failed.remove(&id);
        }
    }
}

/// Consolidates several `UpdateResult`s that may share items across steps
/// (spec §4.7.5): group by item, union the four id-sets, apply the
/// resolution rules, collapse `ErrorDetail`s by message.
pub fn consolidate(results: impl IntoIterator<Item = UpdateResult>) -> Vec<UpdateResult> {
    let mut by_item: HashMap<u64, UpdateResult> = HashMap::new();

    for result in results {
        let entry = by_item
            .entry(result.item_id)
            .or_insert_with(|| UpdateResult::empty(result.item_id));
        entry.created.extend(result.created);
        entry.updated.extend(result.updated);
        entry.deleted.extend(result.deleted);
        entry.failed.extend(result.failed);
        for error in result.errors {
            entry.record_error(error.message, error.listing_id);
        }
    }

    for result in by_item.values_mut() {
        result.apply_resolution_rules();
    }

    by_item.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidate_of_a_single_result_is_idempotent() {
        let mut result = UpdateResult::empty(1);
        result.updated.insert("A".to_string());
        result.deleted.insert("B".to_string());

        let consolidated = consolidate(vec![result.clone()]);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].updated, result.updated);
        assert_eq!(consolidated[0].deleted, result.deleted);
    }

    #[test]
    fn created_and_deleted_collapses_to_deleted_only() {
        let mut result = UpdateResult::empty(1);
        result.created.insert("A".to_string());
        result.deleted.insert("A".to_string());

        let consolidated = consolidate(vec![result]);
        assert!(!consolidated[0].created.contains("A"));
        assert!(consolidated[0].deleted.contains("A"));
    }

    #[test]
    fn failed_is_dropped_when_the_same_id_later_succeeds() {
        let mut first = UpdateResult::empty(1);
        first.failed.insert("A".to_string());
        let mut second = UpdateResult::empty(1);
        second.updated.insert("A".to_string());

        let consolidated = consolidate(vec![first, second]);
        assert!(!consolidated[0].failed.contains("A"));
        assert!(consolidated[0].updated.contains("A"));
    }

    #[test]
    fn result_sets_stay_pairwise_disjoint() {
        let mut a = UpdateResult::empty(1);
        a.created.insert("X".to_string());
        let mut b = UpdateResult::empty(1);
        b.updated.insert("X".to_string());
        let mut c = UpdateResult::empty(1);
        c.deleted.insert("Y".to_string());

        let consolidated = consolidate(vec![a, b, c]);
        let r = &consolidated[0];
        assert!(r.created.is_disjoint(&r.updated));
        assert!(r.created.is_disjoint(&r.deleted));
        assert!(r.updated.is_disjoint(&r.deleted));
        assert!(r.failed.is_disjoint(&r.created));
    }

    #[test]
    fn repeated_error_messages_collapse_with_a_count() {
        let mut result = UpdateResult::empty(1);
        result.record_error("timeout", Some("A".to_string()));
        result.record_error("timeout", Some("B".to_string()));

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].occurrences, 2);
    }
}
