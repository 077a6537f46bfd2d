//! The "computed value" abstraction (design note §9) and the `beat_*`
//! convenience strategies built on top of it (spec §4.7.6).
//!
//! `beat_by`/`condition` may be a literal, a synchronous callable, or an
//! asynchronous callable; dispatch must be uniform. Modeled as a sum type
//! with an `evaluate` member rather than by catching a type error from a
//! wrong call, per design note §9.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::inventory::item::ListedItem;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A value that is either a literal, computed synchronously from a
/// `ListedItem`, or computed asynchronously from one.
#[derive(Clone)]
pub enum ComputedValue<T> {
    Literal(T),
    Sync(Arc<dyn Fn(&ListedItem) -> T + Send + Sync>),
    Async(Arc<dyn Fn(&ListedItem) -> BoxFuture<'static, T> + Send + Sync>),
}

impl<T: Clone + Send + 'static> ComputedValue<T> {
    pub fn literal(value: T) -> Self {
        ComputedValue::Literal(value)
    }

    pub fn sync(f: impl Fn(&ListedItem) -> T + Send + Sync + 'static) -> Self {
        ComputedValue::Sync(Arc::new(f))
    }

    pub fn async_fn<F>(f: impl Fn(&ListedItem) -> F + Send + Sync + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        ComputedValue::Async(Arc::new(move |item| Box::pin(f(item))))
    }

    pub async fn evaluate(&self, item: &ListedItem) -> T {
        match self {
            ComputedValue::Literal(value) => value.clone(),
            ComputedValue::Sync(f) => f(item),
            ComputedValue::Async(f) => f(item).await,
        }
    }
}

/// Which market-data field a `beat_*` strategy reads (spec §4.7.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatTarget {
    LowestAsk,
    SellFaster,
    EarnMore,
}

/// `beat_by` itself dispatches through [`ComputedValue`] (spec §4.7.6:
/// "`condition` and `beat_by` may be scalars or (sync/async) functions of
/// the item"), and is either an absolute amount subtracted from the target
/// (`value − beat_by`) or a fraction of it (`value·(1 − beat_by)`).
pub enum BeatBy {
    Absolute(ComputedValue<i64>),
    Percentage(ComputedValue<f64>),
}

impl BeatBy {
    async fn apply(&self, target: i64, item: &ListedItem) -> i64 {
        match self {
            BeatBy::Absolute(amount) => target - amount.evaluate(item).await,
            BeatBy::Percentage(fraction) => {
                let fraction = fraction.evaluate(item).await;
                ((target as f64) * (1.0 - fraction)).round() as i64
            }
        }
    }
}

/// A `beat_lowest_ask` / `beat_sell_faster` / `beat_earn_more` convenience
/// price strategy (spec §4.7.6): reads the cached (30s) market data for the
/// item's variant, computes a new price relative to the chosen target, and
/// runs `condition` (if given) to decide whether to apply it.
pub struct BeatStrategy {
    pub target: BeatTarget,
    pub beat_by: BeatBy,
    pub condition: Option<ComputedValue<bool>>,
}

impl BeatStrategy {
    /// Computes the new price for `item`, or `None` if no market data is
    /// available for the target field, or `condition` evaluates to false.
    pub async fn evaluate(
        &self,
        catalog: &crate::api::CatalogApi,
        currency: crate::models::Currency,
        item: &ListedItem,
    ) -> crate::error::Result<Option<i64>> {
        if let Some(condition) = &self.condition {
            if !condition.evaluate(item).await {
                return Ok(None);
            }
        }

        let market_data = catalog
            .get_variant_market_data(&item.variant_id(), currency)
            .await?;

        let target_value = match self.target {
            BeatTarget::LowestAsk => market_data.lowest_ask,
            BeatTarget::SellFaster => market_data.sell_faster,
            BeatTarget::EarnMore => market_data.earn_more,
        };

        let Some(target_value) = target_value else {
            return Ok(None);
        };

        let new_price = self.beat_by.apply(target_value, item).await;
        Ok(Some(new_price.max(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ListedItem {
        crate::inventory::test_support::sample_listed_item()
    }

    #[tokio::test]
    async fn literal_evaluates_to_itself() {
        let value = ComputedValue::literal(42i64);
        assert_eq!(value.evaluate(&sample_item()).await, 42);
    }

    #[tokio::test]
    async fn sync_closure_is_dispatched() {
        let value = ComputedValue::sync(|item: &ListedItem| item.price());
        let item = sample_item();
        assert_eq!(value.evaluate(&item).await, item.price());
    }

    #[tokio::test]
    async fn async_closure_is_dispatched() {
        let value = ComputedValue::async_fn(|item: &ListedItem| {
            let price = item.price();
            async move { price * 2 }
        });
        let item = sample_item();
        assert_eq!(value.evaluate(&item).await, item.price() * 2);
    }

    #[tokio::test]
    async fn absolute_beat_by_subtracts_from_target() {
        let beat_by = BeatBy::Absolute(ComputedValue::literal(150));
        let item = sample_item();
        assert_eq!(beat_by.apply(10_000, &item).await, 9_850);
    }

    #[tokio::test]
    async fn percentage_beat_by_scales_the_target() {
        let beat_by = BeatBy::Percentage(ComputedValue::literal(0.1));
        let item = sample_item();
        assert_eq!(beat_by.apply(10_000, &item).await, 9_000);
    }
}
