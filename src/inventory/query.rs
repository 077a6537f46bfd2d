//! Generic set filter and the listed-items query strategy (spec §4.8, C10).
//!
//! Grounded on `original_source/stockx/filter.py` (`Filter`, `create_filter`)
//! and `original_source/stockx/ext/inventory/query.py` (`ListedItems`). The
//! original distinguishes `ANY` (`None`) from an explicit empty set; this
//! adopts `filter.py`'s more general, reusable shape (a boxed predicate over
//! a value and an accepted set) instead of hand-rolling one matcher per
//! field, and represents `ANY` as an explicit empty `HashSet` sentinel
//! (design note §9).

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use crate::api::{ListListingsParams, ListingsApi};
use crate::error::Result;
use crate::inventory::inventory::Inventory;
use crate::inventory::item::ListedItem;
use crate::models::Listing;

/// A reusable condition over a value `V`, closed over an accepted set.
/// An empty accepted set means "any value matches" (the `ANY` sentinel).
#[derive(Clone)]
pub struct Filter<V> {
    accepted: HashSet<V>,
    condition: Arc<dyn Fn(&HashSet<V>, &V) -> bool + Send + Sync>,
}

impl<V: Eq + Hash + Clone + Send + Sync + 'static> Filter<V> {
    /// `include`: matches if `accepted` is empty (any) or contains the
    /// value (union semantics against other values seen for the field).
    pub fn include(accepted: impl IntoIterator<Item = V>) -> Self {
        Self {
            accepted: accepted.into_iter().collect(),
            condition: Arc::new(|accepted, value| accepted.is_empty() || accepted.contains(value)),
        }
    }

    pub fn is_any(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn matches(&self, value: &V) -> bool {
        (self.condition)(&self.accepted, value)
    }

    pub fn accepted(&self) -> &HashSet<V> {
        &self.accepted
    }

    /// `filter_by` semantics (spec §4.8): narrows the accepted set by
    /// intersecting with `values` if it is already non-empty, otherwise
    /// sets it directly — matching `filter.py`'s `apply` and
    /// `ext/inventory/query.py`'s `ListedItems.filter_by`, as distinct
    /// from `include`'s union semantics.
    pub fn filter_by(&mut self, values: impl IntoIterator<Item = V>) {
        let values: HashSet<V> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        self.accepted = if self.accepted.is_empty() {
            values
        } else {
            self.accepted.intersection(&values).cloned().collect()
        };
    }
}

impl<V: Eq + Hash + Clone + Send + Sync + 'static> Default for Filter<V> {
    fn default() -> Self {
        Self::include(std::iter::empty())
    }
}

/// Matches if the item's '/'-separated multi-valued field (e.g. a style id
/// that covers several colorways) overlaps the accepted set at all; `ANY`
/// still matches everything.
fn overlaps(accepted: &HashSet<String>, value: &str) -> bool {
    if accepted.is_empty() {
        return true;
    }
    value.split('/').any(|part| accepted.contains(part))
}

impl Filter<String> {
    /// Matching predicate for a '/'-separated multi-valued field (spec
    /// §4.8): a value matches if ANY of its parts is in the accepted set.
    /// This is unrelated to `filter_by`'s narrowing semantics above — it
    /// only changes how a single value is tested, not how `accepted` is
    /// built up across calls.
    pub fn overlap(accepted: impl IntoIterator<Item = String>) -> Self {
        Self {
            accepted: accepted.into_iter().collect(),
            condition: Arc::new(overlaps),
        }
    }
}

/// Constraints for `ListedItemsQuery` (spec §4.8).
#[derive(Default, Clone)]
pub struct ListedItemsQuery {
    pub product_ids: Filter<String>,
    pub variant_ids: Filter<String>,
    pub style_ids: Filter<String>,
    pub sizes: Filter<String>,
    /// Arbitrary client-side predicate, always applied after aggregation
    /// regardless of strategy (spec §4.8).
    pub predicate: Option<Arc<dyn Fn(&ListedItem) -> bool + Send + Sync>>,
}

impl ListedItemsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.product_ids = Filter::include(ids);
        self
    }

    pub fn variant_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.variant_ids = Filter::include(ids);
        self
    }

    pub fn style_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.style_ids = Filter::overlap(ids);
        self
    }

    pub fn sizes(mut self, sizes: impl IntoIterator<Item = String>) -> Self {
        self.sizes = Filter::overlap(sizes);
        self
    }

    /// Narrows `product_ids` by intersection instead of union (spec §4.8's
    /// `filter_by` verb).
    pub fn filter_by_product_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.product_ids.filter_by(ids);
        self
    }

    /// Narrows `variant_ids` by intersection instead of union.
    pub fn filter_by_variant_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.variant_ids.filter_by(ids);
        self
    }

    /// Narrows `style_ids` by intersection instead of union.
    pub fn filter_by_style_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.style_ids.filter_by(ids);
        self
    }

    /// Narrows `sizes` by intersection instead of union.
    pub fn filter_by_sizes(mut self, sizes: impl IntoIterator<Item = String>) -> Self {
        self.sizes.filter_by(sizes);
        self
    }

    pub fn predicate(mut self, f: impl Fn(&ListedItem) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(f));
        self
    }

    /// Only `product_ids`/`variant_ids` can be pushed to the server
    /// paginator; `style_ids`/`sizes` require a catalog lookup per listing,
    /// so those constraints are always applied client-side (spec §4.8).
    fn can_push_to_server(&self) -> bool {
        self.style_ids.is_any() && self.sizes.is_any()
    }

    fn needs_catalog_lookup(&self) -> bool {
        !self.style_ids.is_any() || !self.sizes.is_any()
    }
}

/// Runs the query: pushes `product_ids`/`variant_ids` to the server
/// paginator when those are the only constraints, otherwise fetches every
/// active listing and filters client-side (resolving `style_ids`/`sizes`
/// via the cached catalog lookups); the arbitrary predicate, if any, is
/// always applied last. Returns results in paginator arrival order (spec
/// §4.8 insertion-order guarantee).
pub async fn run(
    listings: &ListingsApi,
    inventory: &Inventory,
    query: &ListedItemsQuery,
) -> Result<Vec<ListedItem>> {
    let mut params = ListListingsParams::default();
    if query.can_push_to_server() {
        params.product_ids = query.product_ids.accepted().iter().cloned().collect();
        params.variant_ids = query.variant_ids.accepted().iter().cloned().collect();
    }

    let mut paginator = listings.list_listings(params, None);
    let mut matched = Vec::new();

    while let Some(raw) = paginator.next().await.transpose()? {
        let listing: Listing = serde_json::from_value(raw)?;
        if !query.can_push_to_server() {
            if !query.product_ids.matches(&listing.product_id) {
                continue;
            }
            if !query.variant_ids.matches(&listing.variant_id) {
                continue;
            }
        }

        if query.needs_catalog_lookup() {
            if !query.style_ids.is_any() {
                let product = inventory.catalog().get_product(&listing.product_id).await?;
                let style_id = product.style_id.unwrap_or_default();
                if !query.style_ids.matches(&style_id) {
                    continue;
                }
            }
            if !query.sizes.is_any() {
                let variants = inventory
                    .catalog()
                    .list_variants(&listing.product_id)
                    .await?;
                let size = variants
                    .iter()
                    .find(|v| v.id == listing.variant_id)
                    .and_then(|v| v.size.clone())
                    .unwrap_or_default();
                if !query.sizes.matches(&size) {
                    continue;
                }
            }
        }

        matched.push(listing);
    }

    let items = inventory.listed_items_from_listings(matched);
    Ok(match &query.predicate {
        Some(predicate) => items.into_iter().filter(|item| predicate(item)).collect(),
        None => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_filter_matches_everything() {
        let filter: Filter<String> = Filter::default();
        assert!(filter.is_any());
        assert!(filter.matches(&"anything".to_string()));
    }

    #[test]
    fn include_filter_is_exact_membership() {
        let filter = Filter::include(["a".to_string(), "b".to_string()]);
        assert!(filter.matches(&"a".to_string()));
        assert!(!filter.matches(&"c".to_string()));
    }

    #[test]
    fn overlap_filter_matches_any_shared_part() {
        let filter = Filter::overlap(["sku-1".to_string()]);
        assert!(filter.matches(&"sku-1/sku-2".to_string()));
        assert!(!filter.matches(&"sku-3/sku-4".to_string()));
    }

    #[test]
    fn filter_by_sets_an_empty_accepted_set() {
        let mut filter: Filter<String> = Filter::default();
        filter.filter_by(["a".to_string(), "b".to_string()]);
        assert_eq!(filter.accepted().len(), 2);
    }

    #[test]
    fn filter_by_narrows_a_non_empty_accepted_set() {
        let mut filter = Filter::include(["a".to_string(), "b".to_string(), "c".to_string()]);
        filter.filter_by(["b".to_string(), "c".to_string(), "d".to_string()]);
        assert_eq!(
            filter.accepted().clone(),
            HashSet::from(["b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn can_push_to_server_requires_no_style_or_size_filter() {
        let query = ListedItemsQuery::new().product_ids(["p1".to_string()]);
        assert!(query.can_push_to_server());

        let query = query.style_ids(["s1".to_string()]);
        assert!(!query.can_push_to_server());
    }
}
