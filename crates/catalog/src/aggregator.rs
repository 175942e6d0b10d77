use std::collections::HashMap;
use std::sync::Arc;

use shelfcheck_core::config::FanOutPolicy;
use shelfcheck_core::{ProductCode, StockAggregate, StoreCandidate, StoreStock};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::client::CatalogApi;
use crate::error::CatalogError;

/// Fans one stock lookup out per store and merges the answers.
///
/// Every lookup is started at once; there is no worker limit because the
/// store search never returns more than a page of candidates. The join is a
/// full barrier: nothing is aggregated until every lookup has finished.
#[derive(Clone)]
pub struct StockAggregator {
    api: Arc<dyn CatalogApi>,
    policy: FanOutPolicy,
}

impl StockAggregator {
    pub fn new(api: Arc<dyn CatalogApi>, policy: FanOutPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn aggregate(
        &self,
        code: ProductCode,
        stores: &[StoreCandidate],
    ) -> Result<StockAggregate, CatalogError> {
        let mut lookups = JoinSet::new();
        let mut task_stores = HashMap::with_capacity(stores.len());
        for store in stores {
            let api = Arc::clone(&self.api);
            let candidate = store.clone();
            let handle = lookups.spawn(async move {
                let outcome = api.fetch_stock_for_store(code, &candidate).await;
                (candidate, outcome)
            });
            task_stores.insert(handle.id(), store.display_name().to_owned());
        }

        let mut results = Vec::with_capacity(stores.len());
        while let Some(joined) = lookups.join_next_with_id().await {
            let (store, outcome) = match joined {
                Ok((_, finished)) => finished,
                Err(error) => {
                    let store = task_stores.remove(&error.id()).unwrap_or_default();
                    warn!(
                        event_name = "catalog.stock.task_failed",
                        product_code = %code,
                        store = %store,
                        error = %error,
                        "store stock lookup task did not complete"
                    );
                    lookups.abort_all();
                    return Err(CatalogError::Task { store, reason: error.to_string() });
                }
            };

            match (outcome, self.policy) {
                (Ok(stock), _) => results.push(stock),
                (Err(error), FanOutPolicy::Abort) => {
                    warn!(
                        event_name = "catalog.stock.fan_out_aborted",
                        product_code = %code,
                        store = store.display_name(),
                        pending = lookups.len(),
                        error = %error,
                        "store stock lookup failed; abandoning batch"
                    );
                    lookups.abort_all();
                    return Err(error);
                }
                (Err(error), FanOutPolicy::Tolerate) => {
                    warn!(
                        event_name = "catalog.stock.lookup_failed",
                        product_code = %code,
                        store = store.display_name(),
                        error = %error,
                        "store stock lookup failed; continuing batch"
                    );
                    results.push(StoreStock::Failed {
                        store: store.display_name().to_owned(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        let aggregate = StockAggregate::from_results(results);
        info!(
            event_name = "catalog.stock.aggregated",
            product_code = %code,
            policy = ?self.policy,
            candidates = stores.len(),
            stocked_stores = aggregate.len(),
            unlisted_stores = aggregate.not_listed().len(),
            failed_stores = aggregate.failed().len(),
            total_stock = aggregate.total(),
            "store stock fan-out complete"
        );
        Ok(aggregate)
    }
}
