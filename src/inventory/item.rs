//! Logical inventory item and its marketplace-bridging counterpart
//! (spec §3, §4.6, C8). Grounded on
//! `original_source/stockx/ext/inventory/item.py`.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use super::inventory::Inventory;

/// Plain value: `(product_id, variant_id, price, quantity)` with no
/// marketplace identity (spec §4.6). Invariant: `price >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub product_id: String,
    pub variant_id: String,
    price: i64,
    quantity: u32,
}

impl Item {
    pub fn new(
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        price: i64,
        quantity: u32,
    ) -> Result<Self, String> {
        if price < 0 {
            return Err(format!("price must be >= 0, got {price}"));
        }
        Ok(Self {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            price,
            quantity,
        })
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

struct ItemState {
    item: Item,
    listing_ids: Vec<String>,
}

/// Bridges a logical [`Item`] to its marketplace listings (spec §4.6).
///
/// Holds a cheap `Inventory` clone rather than an index into a central
/// registry: the dirty sets in [`Inventory`] store `ListedItem` clones
/// directly (id-compared, `Arc`-backed state) so `Inventory::update` can
/// read and mutate `listing_ids` without a lookup indirection. The
/// teacher's codebase has no back-reference precedent to imitate, so this
/// is the most direct translation of "non-owning reference via a stable
/// index" (design note §9) available in an `Arc`-based ownership model.
#[derive(Clone)]
pub struct ListedItem {
    id: u64,
    state: Arc<Mutex<ItemState>>,
    inventory: Inventory,
}

impl PartialEq for ListedItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ListedItem {}
impl Hash for ListedItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl ListedItem {
    pub(crate) fn new(id: u64, item: Item, listing_ids: Vec<String>, inventory: Inventory) -> Self {
        Self {
            id,
            state: Arc::new(Mutex::new(ItemState { item, listing_ids })),
            inventory,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn product_id(&self) -> String {
        self.state.lock().unwrap().item.product_id.clone()
    }

    pub fn variant_id(&self) -> String {
        self.state.lock().unwrap().item.variant_id.clone()
    }

    pub fn price(&self) -> i64 {
        self.state.lock().unwrap().item.price()
    }

    pub fn quantity(&self) -> u32 {
        self.state.lock().unwrap().item.quantity()
    }

    pub fn listing_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().listing_ids.clone()
    }

    /// Write `price = v`. A no-op write (`v` equals the current price)
    /// does not enroll the item in the dirty set (spec §4.6).
    pub fn set_price(&self, new_price: i64) {
        let changed = {
            let mut state = self.state.lock().unwrap();
            if state.item.price == new_price {
                false
            } else {
                state.item.price = new_price;
                true
            }
        };
        if changed {
            self.inventory.register_price_dirty(self.clone());
        }
    }

    /// Write `quantity = v` (spec §4.6).
    pub fn set_quantity(&self, new_quantity: u32) {
        let changed = {
            let mut state = self.state.lock().unwrap();
            if state.item.quantity == new_quantity {
                false
            } else {
                state.item.quantity = new_quantity;
                true
            }
        };
        if changed {
            self.inventory.register_quantity_dirty(self.clone());
        }
    }

    pub fn quantity_to_sync(&self) -> i64 {
        let state = self.state.lock().unwrap();
        state.item.quantity() as i64 - state.listing_ids.len() as i64
    }

    pub fn payout(&self) -> i64 {
        self.inventory.calculate_payout(self.price())
    }

    pub(crate) fn append_listing_ids(&self, ids: impl IntoIterator<Item = String>) {
        self.state.lock().unwrap().listing_ids.extend(ids);
    }

    pub(crate) fn remove_listing_ids(&self, ids: &std::collections::HashSet<String>) {
        let mut state = self.state.lock().unwrap();
        state.listing_ids.retain(|id| !ids.contains(id));
    }

    /// The trailing `n` listing ids: the ones dropped on a quantity
    /// decrease (spec §3: "`listing_ids` order is meaningful only when
    /// deleting: the trailing ... ids are the ones dropped").
    pub(crate) fn trailing_listing_ids(&self, n: usize) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let len = state.listing_ids.len();
        state.listing_ids[len.saturating_sub(n)..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_negative_price() {
        assert!(Item::new("p", "v", -1, 1).is_err());
    }

    #[test]
    fn accepts_zero_price_and_zero_quantity() {
        let item = Item::new("p", "v", 0, 0).unwrap();
        assert_eq!(item.price(), 0);
        assert_eq!(item.quantity(), 0);
    }

    fn listed_item_with(listing_ids: &[&str], quantity: u32) -> ListedItem {
        let inventory = crate::inventory::test_support::sample_inventory();
        let item = Item::new("product-1", "variant-1", 100_00, quantity).unwrap();
        inventory.wrap(
            item,
            listing_ids.iter().map(|id| id.to_string()).collect(),
        )
    }

    #[test]
    fn quantity_increase_reports_positive_delta() {
        let item = listed_item_with(&["A", "B"], 2);
        item.set_quantity(5);
        assert_eq!(item.quantity_to_sync(), 3);
    }

    #[test]
    fn quantity_decrease_reports_negative_delta_and_trailing_ids() {
        let item = listed_item_with(&["A", "B"], 2);
        item.set_quantity(0);
        assert_eq!(item.quantity_to_sync(), -2);
        assert_eq!(item.trailing_listing_ids(2), vec!["A", "B"]);
    }

    #[test]
    fn trailing_listing_ids_takes_only_the_tail() {
        let item = listed_item_with(&["A", "B", "C"], 3);
        assert_eq!(item.trailing_listing_ids(1), vec!["C"]);
    }

    #[test]
    fn no_op_quantity_write_does_not_report_a_delta() {
        let item = listed_item_with(&["A"], 1);
        item.set_quantity(1);
        assert_eq!(item.quantity_to_sync(), 0);
    }
}
