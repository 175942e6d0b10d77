use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, Response};
use serde_json::Value;
use shelfcheck_core::config::CatalogConfig;
use shelfcheck_core::{upstream_error_message, ProductCode, StoreCandidate, StoreStock};
use tracing::debug;

use crate::error::CatalogError;

/// Raw product payload together with the HTTP status it came back with.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductResponse {
    pub status: u16,
    pub body: Value,
}

impl ProductResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only view of the retailer catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches a product. Non-success statuses are returned, not raised.
    async fn fetch_product(&self, code: ProductCode) -> Result<ProductResponse, CatalogError>;

    async fn fetch_stores_near(&self, location: &str)
        -> Result<Vec<StoreCandidate>, CatalogError>;

    async fn fetch_stock_for_store(
        &self,
        code: ProductCode,
        store: &StoreCandidate,
    ) -> Result<StoreStock, CatalogError>;

    /// Root the product links in replies point at.
    fn base_url(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(default_headers(&config.user_agent))
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Response, CatalogError> {
        debug!(event_name = "catalog.request.sent", endpoint, "sending catalog request");
        self.client
            .get(endpoint)
            .query(query)
            .send()
            .await
            .map_err(|source| CatalogError::Transport { endpoint: endpoint.to_owned(), source })
    }

    async fn get_success_json(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        let response = self.get(endpoint, query).await?;
        let status = response.status().as_u16();
        let body = decode_json(endpoint, response).await;

        if !(200..300).contains(&status) {
            let message = body.ok().and_then(|body| upstream_error_message(&body).ok());
            return Err(CatalogError::Upstream { endpoint: endpoint.to_owned(), status, message });
        }

        body
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_product(&self, code: ProductCode) -> Result<ProductResponse, CatalogError> {
        let endpoint = self.endpoint(&format!("products/{code}"));
        let response = self.get(&endpoint, &[]).await?;
        let status = response.status().as_u16();
        let body = decode_json(&endpoint, response).await?;

        debug!(
            event_name = "catalog.product.fetched",
            product_code = %code,
            status,
            "product response received"
        );
        Ok(ProductResponse { status, body })
    }

    async fn fetch_stores_near(
        &self,
        location: &str,
    ) -> Result<Vec<StoreCandidate>, CatalogError> {
        let endpoint = self.endpoint("stores");
        let radius = self.config.store_search_radius.to_string();
        let page_size = self.config.store_search_page_size.to_string();
        let body = self
            .get_success_json(
                &endpoint,
                &[
                    ("query", location),
                    ("country", self.config.country.as_str()),
                    ("radius", radius.as_str()),
                    ("fields", "FULL"),
                    ("pageSize", page_size.as_str()),
                    ("lang", self.config.lang.as_str()),
                    ("curr", self.config.currency.as_str()),
                ],
            )
            .await?;

        let candidates = store_candidates(&body)?;
        debug!(
            event_name = "catalog.stores.fetched",
            location,
            store_count = candidates.len(),
            "store search response received"
        );
        Ok(candidates)
    }

    async fn fetch_stock_for_store(
        &self,
        code: ProductCode,
        store: &StoreCandidate,
    ) -> Result<StoreStock, CatalogError> {
        let endpoint = self.endpoint(&format!("products/{code}/stock"));
        let page_size = self.config.stock_page_size.to_string();
        let body = self
            .get_success_json(
                &endpoint,
                &[
                    ("location", store.display_name()),
                    ("country", self.config.country.as_str()),
                    ("fields", "FULL"),
                    ("pageSize", page_size.as_str()),
                    ("lang", self.config.lang.as_str()),
                    ("curr", self.config.currency.as_str()),
                ],
            )
            .await?;

        match_store_stock(&body, store)
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

async fn decode_json(endpoint: &str, response: Response) -> Result<Value, CatalogError> {
    response
        .json::<Value>()
        .await
        .map_err(|source| CatalogError::Decode { endpoint: endpoint.to_owned(), source })
}

fn default_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers
}

fn stores_array(body: &Value) -> Result<&Vec<Value>, CatalogError> {
    body.get("stores")
        .and_then(Value::as_array)
        .ok_or_else(|| shelfcheck_core::DomainError::missing_field("stores").into())
}

pub(crate) fn store_candidates(body: &Value) -> Result<Vec<StoreCandidate>, CatalogError> {
    Ok(stores_array(body)?
        .iter()
        .filter_map(|store| store.get("displayName").and_then(Value::as_str))
        .map(StoreCandidate::new)
        .collect())
}

/// Scans the stock response for the queried store; absence is `NotListed`.
pub(crate) fn match_store_stock(
    body: &Value,
    store: &StoreCandidate,
) -> Result<StoreStock, CatalogError> {
    let listed = stores_array(body)?.iter().find(|entry| {
        entry.get("displayName").and_then(Value::as_str) == Some(store.display_name())
    });

    let Some(entry) = listed else {
        return Ok(StoreStock::NotListed { store: store.display_name().to_owned() });
    };

    let level = entry
        .pointer("/stockInfo/stockLevel")
        .and_then(Value::as_i64)
        .ok_or_else(|| shelfcheck_core::DomainError::missing_field("stores[].stockInfo.stockLevel"))?;

    Ok(StoreStock::Listed { store: store.display_name().to_owned(), level })
}
