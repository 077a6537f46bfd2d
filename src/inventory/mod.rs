//! The inventory reconciliation engine (spec §3, §4.6-§4.9, C8-C12): the
//! part of the crate an integrator spends most of their time in.

pub mod computed;
pub mod inventory;
pub mod item;
pub mod mock;
pub mod query;
pub mod reconcile;
pub mod result;

pub use computed::{BeatBy, BeatStrategy, BeatTarget, ComputedValue};
pub use inventory::{FeeParams, Inventory};
pub use item::{Item, ListedItem};
pub use query::{Filter, ListedItemsQuery};
pub use result::{ErrorDetail, UpdateResult};

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use super::inventory::Inventory;
    use super::item::{Item, ListedItem};
    use crate::api::{BatchApi, CatalogApi, ListingsApi};
    use crate::auth::MarketplaceConfig;
    use crate::client::HttpClient;
    use crate::models::Currency;

    fn sample_config() -> MarketplaceConfig {
        MarketplaceConfig::builder()
            .client_id("id")
            .client_secret("secret")
            .audience("aud")
            .refresh_token("token")
            .api_key("key")
            .build()
            .unwrap()
    }

    pub(crate) fn sample_inventory() -> Inventory {
        let client = HttpClient::new(sample_config()).unwrap();
        Inventory::new(
            Currency::Usd,
            ListingsApi::new(client.clone()),
            CatalogApi::new(client.clone()),
            BatchApi::new(client),
            10,
            Duration::from_secs(30),
        )
    }

    pub(crate) fn sample_listed_item() -> ListedItem {
        let inventory = sample_inventory();
        let item = Item::new("product-1", "variant-1", 1000, 1).unwrap();
        inventory.wrap(item, vec!["listing-1".to_string()])
    }
}
