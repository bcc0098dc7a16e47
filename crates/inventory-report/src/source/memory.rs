use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use models::inventory::{InventoryEntity, InventoryKind, Site};

use super::{FetchCache, InventorySnapshot, InventorySource, SITES_COLLECTION};
use crate::prelude::ReportError;

/// Serves a fixed set of collections from memory.
///
/// Counts fetches and closes so callers can check the fetch fan-out and the
/// teardown contract, and can be told to fail one collection.
#[derive(Debug, Default)]
pub struct MemorySource {
    data: InventorySnapshot,
    cache: FetchCache,
    fail_on: Option<String>,
    fetches: AtomicUsize,
    closes: AtomicUsize,
    closed: AtomicBool,
}

impl MemorySource {
    pub fn new(data: InventorySnapshot) -> Self {
        MemorySource {
            data,
            ..Default::default()
        }
    }

    /// Makes the fetch of `collection` (e.g. `"fans"` or `"sites"`) fail.
    pub fn failing_on(mut self, collection: impl Into<String>) -> Self {
        self.fail_on = Some(collection.into());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of times [`InventorySource::close_connection`] was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn begin_fetch(&self, collection: &str) -> Result<(), ReportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.is_closed() {
            return Err(ReportError::ConnectionClosed);
        }
        if self.fail_on.as_deref() == Some(collection) {
            return Err(ReportError::fetch(collection, "injected failure"));
        }
        Ok(())
    }
}

impl InventorySource for MemorySource {
    async fn fetch_inventory(&self, kind: InventoryKind) -> Result<(), ReportError> {
        self.begin_fetch(kind.collection())?;
        self.cache
            .store_devices(kind, self.data.devices(kind).to_vec());
        Ok(())
    }

    fn get_inventory(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError> {
        self.cache.devices(kind)
    }

    async fn fetch_sites(&self) -> Result<(), ReportError> {
        self.begin_fetch(SITES_COLLECTION)?;
        self.cache.store_sites(self.data.sites.clone());
        Ok(())
    }

    fn get_sites(&self) -> Result<Vec<Site>, ReportError> {
        self.cache.sites()
    }

    async fn close_connection(&self) -> Result<(), ReportError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
