//! `Inventory`: the reconciliation engine entry point (spec §3, §4.7,
//! §4.7.4, C9). Grounded on
//! `original_source/stockx/ext/inventory/inventory.py`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::api::{BatchApi, CatalogApi, ListingsApi};
use crate::batch::BatchOrchestrator;
use crate::error::{Error, Result};
use crate::inventory::item::{Item, ListedItem};
use crate::inventory::mock;
use crate::inventory::reconcile::{group_and_sum, reconcile_price, reconcile_quantity};
use crate::inventory::result::{consolidate, UpdateResult};
use crate::models::{Currency, Listing};

/// Account-specific economic parameters, loaded once from a probe listing
/// (spec §3, §4.9).
#[derive(Debug, Clone, Copy)]
pub struct FeeParams {
    pub transaction_fee: f64,
    pub payment_fee: f64,
    pub shipping_fee: i64,
    pub minimum_transaction_fee: i64,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            transaction_fee: 0.0,
            payment_fee: 0.0,
            shipping_fee: 0,
            minimum_transaction_fee: 0,
        }
    }
}

struct InventoryInner {
    currency: Currency,
    fees: RwLock<FeeParams>,
    price_dirty: Mutex<HashMap<u64, ListedItem>>,
    quantity_dirty: Mutex<HashMap<u64, ListedItem>>,
    next_id: AtomicU64,
    listings: ListingsApi,
    catalog: CatalogApi,
    batch: BatchOrchestrator,
    batch_size: usize,
    batch_timeout: Duration,
}

/// Shared by many `ListedItem`s (spec §3): owns the price/quantity dirty
/// sets and the fee parameters used to compute payouts. Cheaply cloneable
/// (an `Arc` handle), which is how `ListedItem` holds its non-owning
/// back-reference (spec §9).
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

impl Inventory {
    pub fn new(
        currency: Currency,
        listings: ListingsApi,
        catalog: CatalogApi,
        batch_api: BatchApi,
        batch_size: usize,
        batch_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(InventoryInner {
                currency,
                fees: RwLock::new(FeeParams::default()),
                price_dirty: Mutex::new(HashMap::new()),
                quantity_dirty: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                listings,
                catalog,
                batch: BatchOrchestrator::new(batch_api),
                batch_size,
                batch_timeout,
            }),
        }
    }

    /// Loads fee parameters once at startup via a probe listing (spec
    /// §4.9, C12). There is no catalog-search surface to pick a product
    /// arbitrarily, so the caller names a variant to probe against; any
    /// variant the account can list works equally well.
    pub async fn load_fees(&self, probe_variant_id: &str) -> Result<()> {
        let params =
            mock::probe_fees(&self.inner.listings, probe_variant_id, &self.inner.currency).await?;
        *self.inner.fees.write().unwrap() = params;
        Ok(())
    }

    pub fn fees(&self) -> FeeParams {
        *self.inner.fees.read().unwrap()
    }

    pub fn currency(&self) -> Currency {
        self.inner.currency
    }

    /// `Inventory.calculate_payout(p) = p - max(p*transaction_fee,
    /// minimum_transaction_fee) - p*payment_fee - shipping_fee` (spec
    /// §4.6).
    pub fn calculate_payout(&self, price: i64) -> i64 {
        calculate_payout(price, self.fees())
    }

    pub(crate) fn register_price_dirty(&self, item: ListedItem) {
        self.inner.price_dirty.lock().unwrap().insert(item.id(), item);
    }

    pub(crate) fn register_quantity_dirty(&self, item: ListedItem) {
        self.inner
            .quantity_dirty
            .lock()
            .unwrap()
            .insert(item.id(), item);
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Builds a new, not-yet-dirty `ListedItem` wrapping `item` with the
    /// given `listing_ids` (used by construction-from-listings and by
    /// `publish` for the created listings).
    pub fn wrap(&self, item: Item, listing_ids: Vec<String>) -> ListedItem {
        ListedItem::new(self.next_id(), item, listing_ids, self.clone())
    }

    /// Groups a stream of `Listing`s by `(variant_id, amount)`; each group
    /// becomes one `ListedItem` whose quantity equals the group size and
    /// whose `listing_ids` are the listings' ids in arrival order (spec
    /// §4.6, §8 round-trip property).
    pub fn listed_items_from_listings(&self, listings: Vec<Listing>) -> Vec<ListedItem> {
        let mut order: Vec<(String, i64)> = Vec::new();
        let mut groups: HashMap<(String, i64), (String, Vec<String>)> = HashMap::new();

        for listing in listings {
            let key = (listing.variant_id.clone(), listing.amount);
            groups
                .entry(key.clone())
                .or_insert_with(|| (listing.product_id.clone(), Vec::new()))
                .1
                .push(listing.listing_id);
            if !order.contains(&key) {
                order.push(key);
            }
        }

        order
            .into_iter()
            .map(|key| {
                let (product_id, listing_ids) = groups.remove(&key).unwrap();
                let item = Item::new(product_id, key.0, key.1, listing_ids.len() as u32)
                    .expect("listing amounts are non-negative");
                self.wrap(item, listing_ids)
            })
            .collect()
    }

    /// **publish** (spec §4.7): create listings for brand-new `Item`s.
    /// Coalesces per §4.7.1 before submitting.
    pub async fn publish(&self, items: Vec<Item>) -> Result<(Vec<ListedItem>, UpdateResult)> {
        let entries: Vec<(String, i64, u32)> = items
            .iter()
            .map(|i| (i.variant_id.clone(), i.price(), i.quantity()))
            .collect();
        let inputs = group_and_sum(&entries, self.inner.currency);

        let mut batch_ids = Vec::new();
        for chunk in inputs.chunks(self.inner.batch_size) {
            let status = self.inner.batch.submit_create(chunk).await?;
            batch_ids.push(status.batch_id);
        }

        let results_by_batch = self
            .inner
            .batch
            .await_completion(
                crate::models::BatchKind::Create,
                batch_ids,
                self.inner.batch_timeout,
            )
            .await
            .map_err(|e| match e {
                Error::BatchTimeout {
                    timed_out_batch_ids,
                    partial_results,
                } => Error::IncompleteOperation {
                    partial_results: consolidate(vec![create_result_from_items(&partial_results)]),
                    timed_out_batch_ids,
                },
                other => other,
            })?;

        let mut ids_by_key: HashMap<(String, i64), Vec<String>> = HashMap::new();
        for results in results_by_batch.values() {
            for result in results {
                if result.status != crate::models::BatchItemStatus::Completed {
                    continue;
                }
                let variant_id = result
                    .input
                    .get("variantId")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let price = result
                    .input
                    .get("amount")
                    .and_then(|v| v.as_str())
                    .and_then(crate::models::common::amount_from_wire)
                    .unwrap_or_default();
                if let Some(id) = &result.listing_id {
                    ids_by_key
                        .entry((variant_id, price))
                        .or_default()
                        .push(id.clone());
                }
            }
        }

        let mut listed = Vec::new();
        let mut result = UpdateResult::default();
        for item in items {
            let key = (item.variant_id.clone(), item.price());
            let quantity = item.quantity() as usize;
            let bucket = ids_by_key.entry(key).or_default();
            let assigned: Vec<String> = bucket.drain(..quantity.min(bucket.len())).collect();
            result.created.extend(assigned.iter().cloned());
            listed.push(self.wrap(item, assigned));
        }

        Ok((listed, result))
    }

    /// **change_price** (spec §4.7): update the listings backing `items` to
    /// their current `price`. Unlike `update`, this runs price
    /// reconciliation immediately for exactly the given items rather than
    /// the whole price-dirty set.
    pub async fn change_price(&self, items: Vec<ListedItem>) -> Result<UpdateResult> {
        for item in &items {
            self.inner.price_dirty.lock().unwrap().remove(&item.id());
        }
        match reconcile_price(
            &self.inner.batch,
            items,
            self.inner.currency,
            self.inner.batch_size,
            self.inner.batch_timeout,
        )
        .await
        {
            Ok(results) => Ok(consolidate(results).into_iter().next().unwrap_or_default()),
            Err((partial, e)) => Err(Error::IncompleteOperation {
                partial_results: consolidate(partial),
                timed_out_batch_ids: match e {
                    Error::BatchTimeout {
                        timed_out_batch_ids, ..
                    } => timed_out_batch_ids,
                    _ => Vec::new(),
                },
            }),
        }
    }

    /// `Inventory.update()` (spec §4.7.4): runs quantity reconciliation
    /// then price reconciliation over whatever is dirty. Clears both dirty
    /// sets ONLY on success; on `IncompleteOperation` they are left intact.
    pub async fn update(&self) -> Result<Vec<UpdateResult>> {
        let quantity_items: Vec<ListedItem> = self
            .inner
            .quantity_dirty
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();
        let price_items: Vec<ListedItem> = self
            .inner
            .price_dirty
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();

        if quantity_items.is_empty() && price_items.is_empty() {
            return Ok(Vec::new());
        }

        let quantity_result = reconcile_quantity(
            &self.inner.batch,
            quantity_items,
            self.inner.currency,
            self.inner.batch_size,
            self.inner.batch_timeout,
        )
        .await;

        let price_result = reconcile_price(
            &self.inner.batch,
            price_items,
            self.inner.currency,
            self.inner.batch_size,
            self.inner.batch_timeout,
        )
        .await;

        match (quantity_result, price_result) {
            (Ok(q), Ok(p)) => {
                self.inner.quantity_dirty.lock().unwrap().clear();
                self.inner.price_dirty.lock().unwrap().clear();
                Ok(consolidate([q, p].concat()))
            }
            (Ok(q), Err((partial_p, e))) => Err(Error::IncompleteOperation {
                partial_results: consolidate([q, partial_p].concat()),
                timed_out_batch_ids: timed_out_ids(e),
            }),
            (Err((partial_q, e)), Ok(p)) => Err(Error::IncompleteOperation {
                partial_results: consolidate([partial_q, p].concat()),
                timed_out_batch_ids: timed_out_ids(e),
            }),
            (Err((partial_q, e)), Err((partial_p, _))) => Err(Error::IncompleteOperation {
                partial_results: consolidate([partial_q, partial_p].concat()),
                timed_out_batch_ids: timed_out_ids(e),
            }),
        }
    }

    pub(crate) fn catalog(&self) -> &CatalogApi {
        &self.inner.catalog
    }

    /// `beat_lowest_ask`/`beat_sell_faster`/`beat_earn_more` (spec §4.7.6):
    /// thin sugar over `change_price`. For each item, evaluates `strategy`
    /// against the cached market data for its variant; items the strategy
    /// declines to price (no market data, or `condition` false) are left
    /// untouched. Applies the computed prices, then runs one `change_price`
    /// over everything that changed.
    pub async fn apply_beat_strategy(
        &self,
        strategy: &crate::inventory::computed::BeatStrategy,
        items: Vec<ListedItem>,
    ) -> Result<UpdateResult> {
        let mut changed = Vec::new();
        for item in items {
            if let Some(new_price) = strategy
                .evaluate(&self.inner.catalog, self.inner.currency, &item)
                .await?
            {
                item.set_price(new_price);
                changed.push(item);
            }
        }
        self.change_price(changed).await
    }

    pub async fn beat_lowest_ask(
        &self,
        items: Vec<ListedItem>,
        beat_by: crate::inventory::computed::BeatBy,
        condition: Option<crate::inventory::computed::ComputedValue<bool>>,
    ) -> Result<UpdateResult> {
        let strategy = crate::inventory::computed::BeatStrategy {
            target: crate::inventory::computed::BeatTarget::LowestAsk,
            beat_by,
            condition,
        };
        self.apply_beat_strategy(&strategy, items).await
    }

    pub async fn beat_sell_faster(
        &self,
        items: Vec<ListedItem>,
        beat_by: crate::inventory::computed::BeatBy,
        condition: Option<crate::inventory::computed::ComputedValue<bool>>,
    ) -> Result<UpdateResult> {
        let strategy = crate::inventory::computed::BeatStrategy {
            target: crate::inventory::computed::BeatTarget::SellFaster,
            beat_by,
            condition,
        };
        self.apply_beat_strategy(&strategy, items).await
    }

    pub async fn beat_earn_more(
        &self,
        items: Vec<ListedItem>,
        beat_by: crate::inventory::computed::BeatBy,
        condition: Option<crate::inventory::computed::ComputedValue<bool>>,
    ) -> Result<UpdateResult> {
        let strategy = crate::inventory::computed::BeatStrategy {
            target: crate::inventory::computed::BeatTarget::EarnMore,
            beat_by,
            condition,
        };
        self.apply_beat_strategy(&strategy, items).await
    }
}

/// Builds the `created`/`errors` shape of an `UpdateResult` directly from a
/// timed-out create batch's `BatchItemResult`s (spec §4.7.2/S5), the same
/// way `reconcile.rs`'s increase/decrease/price paths turn partial results
/// into real `UpdateResult`s instead of discarding them.
fn create_result_from_items(results: &[crate::models::BatchItemResult]) -> UpdateResult {
    let mut result = UpdateResult::default();
    for item in results {
        match item.status {
            crate::models::BatchItemStatus::Completed => {
                if let Some(id) = &item.listing_id {
                    result.created.insert(id.clone());
                }
            }
            crate::models::BatchItemStatus::Failed => {
                result.record_error(
                    item.error
                        .clone()
                        .unwrap_or_else(|| "create failed".to_string()),
                    item.listing_id.clone(),
                );
            }
            crate::models::BatchItemStatus::Queued => {}
        }
    }
    result
}

fn timed_out_ids(error: Error) -> Vec<String> {
    match error {
        Error::BatchTimeout {
            timed_out_batch_ids,
            ..
        } => timed_out_batch_ids,
        _ => Vec::new(),
    }
}

fn calculate_payout(price: i64, fees: FeeParams) -> i64 {
    let transaction = ((price as f64) * fees.transaction_fee).round() as i64;
    let transaction = transaction.max(fees.minimum_transaction_fee);
    let payment = ((price as f64) * fees.payment_fee).round() as i64;
    price - transaction - payment - fees.shipping_fee
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_payout_applies_fee_floor() {
        let fees = FeeParams {
            transaction_fee: 0.05,
            payment_fee: 0.03,
            shipping_fee: 500,
            minimum_transaction_fee: 1000,
        };
        // 5% of 10_000 is 500, below the 1000 floor, so the floor applies.
        let payout = calculate_payout(10_000, fees);
        assert_eq!(payout, 10_000 - 1000 - 300 - 500);
    }

    #[test]
    fn calculate_payout_uses_percentage_when_above_floor() {
        let fees = FeeParams {
            transaction_fee: 0.1,
            payment_fee: 0.03,
            shipping_fee: 0,
            minimum_transaction_fee: 100,
        };
        let payout = calculate_payout(10_000, fees);
        assert_eq!(payout, 10_000 - 1000 - 300);
    }
}
