//! Coalescing and the quantity/price reconciliation algorithms
//! (spec §4.7.1–§4.7.3), C9's core. Grounded file-for-file on
//! `original_source/stockx/ext/inventory/batch/{operations,inputs,results}.py`
//! (the refactored, split version — preferred over the single historical
//! `update.py` since it mirrors how the teacher splits `batch.rs` into
//! config/builder/execution/aggregation sections) and
//! `original_source/stockx/processing.py` (`group_and_sum`) for coalescing.

use std::collections::HashMap;
use std::time::Duration;

use crate::batch::BatchOrchestrator;
use crate::error::Error;
use crate::inventory::item::ListedItem;
use crate::inventory::result::UpdateResult;
use crate::models::{
    BatchCreateInput, BatchDeleteInput, BatchItemResult, BatchItemStatus, BatchKind,
    BatchUpdateInput, Currency,
};

type PartialFailure = (Vec<UpdateResult>, Error);

/// Groups `(variant_id, price, quantity)` tuples by `(variant_id, price)`
/// and sums quantities (spec §4.7.1). A correctness requirement: the
/// marketplace accepts at most one create-input per `(variant_id, price)`.
pub(crate) fn group_and_sum(
    entries: &[(String, i64, u32)],
    currency: Currency,
) -> Vec<BatchCreateInput> {
    let mut totals: HashMap<(String, i64), u32> = HashMap::new();
    let mut order: Vec<(String, i64)> = Vec::new();

    for (variant_id, price, quantity) in entries {
        let key = (variant_id.clone(), *price);
        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        *totals.entry(key).or_insert(0) += quantity;
    }

    order
        .into_iter()
        .map(|key| {
            let quantity = totals[&key];
            BatchCreateInput {
                variant_id: key.0,
                amount: crate::models::common::amount_to_wire(key.1),
                currency_code: currency,
                quantity,
            }
        })
        .collect()
}

/// Runs the decrease and increase paths of quantity reconciliation
/// (spec §4.7.2) over `items` and returns combined results.
///
/// If either path raises, the engine gathers that path's partial results
/// and the other (possibly complete) path's results into a single
/// combined failure, per spec §4.7.2.
pub(crate) async fn reconcile_quantity(
    orchestrator: &BatchOrchestrator,
    items: Vec<ListedItem>,
    currency: Currency,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<UpdateResult>, PartialFailure> {
    let mut decrease = Vec::new();
    let mut increase = Vec::new();
    for item in items {
        let delta = item.quantity_to_sync();
        if delta < 0 {
            decrease.push((item, (-delta) as u32));
        } else if delta > 0 {
            increase.push((item, delta as u32));
        }
    }

    let decrease_result = run_decrease(orchestrator, decrease, batch_size, timeout).await;
    let increase_result = run_increase(orchestrator, increase, currency, batch_size, timeout).await;

    match (decrease_result, increase_result) {
        (Ok(d), Ok(i)) => Ok([d, i].concat()),
        (Ok(mut d), Err((partial, e))) => {
            d.extend(partial);
            Err((d, e))
        }
        (Err((mut partial, e)), Ok(i)) => {
            partial.extend(i);
            Err((partial, e))
        }
        (Err((mut partial_d, e)), Err((partial_i, _))) => {
            partial_d.extend(partial_i);
            Err((partial_d, e))
        }
    }
}

async fn run_decrease(
    orchestrator: &BatchOrchestrator,
    items: Vec<(ListedItem, u32)>,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<UpdateResult>, PartialFailure> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut id_to_item: HashMap<String, ListedItem> = HashMap::new();
    let mut delete_inputs: Vec<BatchDeleteInput> = Vec::new();
    for (item, n) in &items {
        for id in item.trailing_listing_ids(*n as usize) {
            id_to_item.insert(id.clone(), item.clone());
            delete_inputs.push(BatchDeleteInput { listing_id: id });
        }
    }

    let mut batch_ids = Vec::new();
    for chunk in delete_inputs.chunks(batch_size) {
        let status = orchestrator
            .submit_delete(chunk)
            .await
            .map_err(|e| (Vec::new(), e))?;
        batch_ids.push(status.batch_id);
    }

    match orchestrator
        .await_completion(BatchKind::Delete, batch_ids, timeout)
        .await
    {
        Ok(results_by_batch) => {
            let mut per_item: HashMap<u64, UpdateResult> = HashMap::new();
            for results in results_by_batch.values() {
                apply_delete_results(results, &id_to_item, &mut per_item);
            }
            Ok(per_item.into_values().collect())
        }
        Err(Error::BatchTimeout {
            timed_out_batch_ids,
            partial_results,
        }) => {
            let mut per_item = HashMap::new();
            apply_delete_results(&partial_results, &id_to_item, &mut per_item);
            Err((
                per_item.into_values().collect(),
                Error::BatchTimeout {
                    timed_out_batch_ids,
                    partial_results: Vec::new(),
                },
            ))
        }
        Err(e) => Err((Vec::new(), e)),
    }
}

fn apply_delete_results(
    results: &[BatchItemResult],
    id_to_item: &HashMap<String, ListedItem>,
    per_item: &mut HashMap<u64, UpdateResult>,
) {
    for result in results {
        let listing_id = result.listing_id.clone().or_else(|| {
            result
                .input
                .get("listingId")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });
        let Some(listing_id) = listing_id else { continue };
        let Some(item) = id_to_item.get(&listing_id) else { continue };
        let entry = per_item
            .entry(item.id())
            .or_insert_with(|| UpdateResult::empty(item.id()));

        match result.status {
            BatchItemStatus::Completed => {
                entry.deleted.insert(listing_id.clone());
                item.remove_listing_ids(&std::iter::once(listing_id).collect());
            }
            BatchItemStatus::Failed => {
                entry.failed.insert(listing_id.clone());
                entry.record_error(
                    result.error.clone().unwrap_or_else(|| "delete failed".to_string()),
                    Some(listing_id),
                );
            }
            BatchItemStatus::Queued => {}
        }
    }
}

async fn run_increase(
    orchestrator: &BatchOrchestrator,
    items: Vec<(ListedItem, u32)>,
    currency: Currency,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<UpdateResult>, PartialFailure> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut contributors: HashMap<(String, i64), Vec<(ListedItem, u32)>> = HashMap::new();
    let mut key_order: Vec<(String, i64)> = Vec::new();
    for (item, n) in items {
        let key = (item.variant_id(), item.price());
        if !contributors.contains_key(&key) {
            key_order.push(key.clone());
        }
        contributors.entry(key).or_default().push((item, n));
    }

    let coalesced: Vec<BatchCreateInput> = key_order
        .iter()
        .map(|key| {
            let total: u32 = contributors[key].iter().map(|(_, n)| n).sum();
            BatchCreateInput {
                variant_id: key.0.clone(),
                amount: crate::models::common::amount_to_wire(key.1),
                currency_code: currency,
                quantity: total,
            }
        })
        .collect();

    let mut batch_ids = Vec::new();
    for chunk in coalesced.chunks(batch_size) {
        let status = orchestrator
            .submit_create(chunk)
            .await
            .map_err(|e| (Vec::new(), e))?;
        batch_ids.push(status.batch_id);
    }

    let (results_by_batch, timed_out) = match orchestrator
        .await_completion(BatchKind::Create, batch_ids, timeout)
        .await
    {
        Ok(results) => (results, None),
        Err(Error::BatchTimeout {
            timed_out_batch_ids,
            partial_results,
        }) => {
            let mut m = HashMap::new();
            m.insert(String::new(), partial_results);
            (m, Some(timed_out_batch_ids))
        }
        Err(e) => return Err((Vec::new(), e)),
    };

    let mut ids_by_key: HashMap<(String, i64), Vec<String>> = HashMap::new();
    let mut errors_by_key: HashMap<(String, i64), Vec<String>> = HashMap::new();
    for results in results_by_batch.values() {
        for result in results {
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
            let key = (variant_id, price);

            match result.status {
                BatchItemStatus::Completed => {
                    if let Some(id) = &result.listing_id {
                        ids_by_key.entry(key).or_default().push(id.clone());
                    }
                }
                BatchItemStatus::Failed => {
                    errors_by_key
                        .entry(key)
                        .or_default()
                        .push(result.error.clone().unwrap_or_else(|| "create failed".to_string()));
                }
                BatchItemStatus::Queued => {}
            }
        }
    }

    let mut per_item: HashMap<u64, UpdateResult> = HashMap::new();
    for key in &key_order {
        let mut ids = ids_by_key.remove(key).unwrap_or_default().into_iter();
        for (item, n) in &contributors[key] {
            let assigned: Vec<String> = ids.by_ref().take(*n as usize).collect();
            if !assigned.is_empty() {
                item.append_listing_ids(assigned.clone());
                let entry = per_item
                    .entry(item.id())
                    .or_insert_with(|| UpdateResult::empty(item.id()));
                entry.created.extend(assigned);
            }
        }
        if let Some(errors) = errors_by_key.remove(key) {
            if let Some((item, _)) = contributors[key].first() {
                let entry = per_item
                    .entry(item.id())
                    .or_insert_with(|| UpdateResult::empty(item.id()));
                for message in errors {
                    entry.record_error(message, None);
                }
            }
        }
    }

    if let Some(timed_out_batch_ids) = timed_out {
        return Err((
            per_item.into_values().collect(),
            Error::BatchTimeout {
                timed_out_batch_ids,
                partial_results: Vec::new(),
            },
        ));
    }
    Ok(per_item.into_values().collect())
}

/// Price reconciliation (spec §4.7.3): one update-input per `listing_id`,
/// since update is per-listing at the wire level — the coalescing of
/// §4.7.1 does not apply here.
pub(crate) async fn reconcile_price(
    orchestrator: &BatchOrchestrator,
    items: Vec<ListedItem>,
    currency: Currency,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<UpdateResult>, PartialFailure> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut id_to_item: HashMap<String, ListedItem> = HashMap::new();
    let mut inputs: Vec<BatchUpdateInput> = Vec::new();
    for item in &items {
        let price = item.price();
        for listing_id in item.listing_ids() {
            id_to_item.insert(listing_id.clone(), item.clone());
            inputs.push(BatchUpdateInput {
                listing_id,
                amount: crate::models::common::amount_to_wire(price),
                currency_code: currency,
            });
        }
    }

    let mut batch_ids = Vec::new();
    for chunk in inputs.chunks(batch_size) {
        let status = orchestrator
            .submit_update(chunk)
            .await
            .map_err(|e| (Vec::new(), e))?;
        batch_ids.push(status.batch_id);
    }

    match orchestrator
        .await_completion(BatchKind::Update, batch_ids, timeout)
        .await
    {
        Ok(results_by_batch) => {
            let mut per_item = HashMap::new();
            for results in results_by_batch.values() {
                apply_update_results(results, &id_to_item, &mut per_item);
            }
            Ok(per_item.into_values().collect())
        }
        Err(Error::BatchTimeout {
            timed_out_batch_ids,
            partial_results,
        }) => {
            let mut per_item = HashMap::new();
            apply_update_results(&partial_results, &id_to_item, &mut per_item);
            Err((
                per_item.into_values().collect(),
                Error::BatchTimeout {
                    timed_out_batch_ids,
                    partial_results: Vec::new(),
                },
            ))
        }
        Err(e) => Err((Vec::new(), e)),
    }
}

fn apply_update_results(
    results: &[BatchItemResult],
    id_to_item: &HashMap<String, ListedItem>,
    per_item: &mut HashMap<u64, UpdateResult>,
) {
    for result in results {
        let listing_id = result.listing_id.clone().or_else(|| {
            result
                .input
                .get("listingId")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });
        let Some(listing_id) = listing_id else { continue };
        let Some(item) = id_to_item.get(&listing_id) else { continue };
        let entry = per_item
            .entry(item.id())
            .or_insert_with(|| UpdateResult::empty(item.id()));

        match result.status {
            BatchItemStatus::Completed => {
                entry.updated.insert(listing_id);
            }
            BatchItemStatus::Failed => {
                entry.failed.insert(listing_id.clone());
                entry.record_error(
                    result.error.clone().unwrap_or_else(|| "update failed".to_string()),
                    Some(listing_id),
                );
            }
            BatchItemStatus::Queued => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn group_and_sum_combines_matching_variant_and_price() {
        let entries = vec![
            ("V".to_string(), 10_000, 2u32),
            ("V".to_string(), 10_000, 3),
            ("W".to_string(), 10_000, 1),
        ];
        let inputs = group_and_sum(&entries, Currency::Usd);

        assert_eq!(inputs.len(), 2);
        let v = inputs.iter().find(|i| i.variant_id == "V").unwrap();
        assert_eq!(v.quantity, 5);
        let w = inputs.iter().find(|i| i.variant_id == "W").unwrap();
        assert_eq!(w.quantity, 1);
    }

    #[test]
    fn group_and_sum_keeps_distinct_prices_separate() {
        let entries = vec![("V".to_string(), 10_000, 1u32), ("V".to_string(), 9_000, 1)];
        let inputs = group_and_sum(&entries, Currency::Usd);
        assert_eq!(inputs.len(), 2);
    }
}
