use std::time::Duration;

use models::inventory::{InventoryEntity, InventoryKind, InventoryRecord, Site};
use parking_lot::Mutex;
use report_config::ServiceConfig;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::{FetchCache, InventorySource, SITES_COLLECTION};
use crate::prelude::ReportError;

/// JSON client for the inventory service.
///
/// Device collections live under `{url}/inventory/{collection}` and sites
/// under `{url}/sites`; each endpoint returns a JSON array.
#[derive(Debug)]
pub struct RemoteSource {
    base_url: String,
    client: Mutex<Option<reqwest::Client>>,
    cache: FetchCache,
}

impl RemoteSource {
    /// Builds the HTTP client. No request is made until the first fetch.
    pub fn connect(config: &ServiceConfig) -> Result<Self, ReportError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ReportError::fetch("service", format!("invalid token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::Http {
                context: "While building the inventory service client".to_string(),
                source: e,
            })?;

        Ok(RemoteSource {
            base_url: config.url.trim_end_matches('/').to_string(),
            client: Mutex::new(Some(client)),
            cache: FetchCache::default(),
        })
    }

    pub fn endpoint(&self, collection: &str) -> String {
        if collection == SITES_COLLECTION {
            format!("{}/{}", self.base_url, SITES_COLLECTION)
        } else {
            format!("{}/inventory/{}", self.base_url, collection)
        }
    }

    fn client(&self) -> Result<reqwest::Client, ReportError> {
        self.client
            .lock()
            .clone()
            .ok_or(ReportError::ConnectionClosed)
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, ReportError> {
        let client = self.client()?;
        let url = self.endpoint(collection);
        tracing::debug!("GET {url}");

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReportError::Http {
                context: format!("While requesting `{collection}`"),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::fetch(
                collection,
                format!("service answered {status} for {url}"),
            ));
        }

        response.json().await.map_err(|e| ReportError::Http {
            context: format!("While decoding `{collection}`"),
            source: e,
        })
    }
}

impl InventorySource for RemoteSource {
    async fn fetch_inventory(&self, kind: InventoryKind) -> Result<(), ReportError> {
        let records: Vec<InventoryRecord> = self.get_collection(kind.collection()).await?;
        tracing::debug!("fetched {} {}", records.len(), kind.collection());

        self.cache.store_devices(
            kind,
            records
                .into_iter()
                .map(|record| record.into_entity(kind))
                .collect(),
        );
        Ok(())
    }

    fn get_inventory(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError> {
        self.cache.devices(kind)
    }

    async fn fetch_sites(&self) -> Result<(), ReportError> {
        let sites = self.get_collection(SITES_COLLECTION).await?;
        self.cache.store_sites(sites);
        Ok(())
    }

    fn get_sites(&self) -> Result<Vec<Site>, ReportError> {
        self.cache.sites()
    }

    async fn close_connection(&self) -> Result<(), ReportError> {
        if self.client.lock().take().is_some() {
            tracing::debug!("closed connection to {}", self.base_url);
        }
        Ok(())
    }
}
