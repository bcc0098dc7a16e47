//! The boundary to whatever serves raw inventory records.
//!
//! A source is driven in two phases: every collection is fetched (the fetches
//! may run concurrently) and only then read back through the accessors.
//! [`fetch_snapshot`] enforces that ordering for the report pipeline.

use std::collections::{BTreeMap, HashMap};

use futures::future::try_join_all;
use models::inventory::{InventoryEntity, InventoryKind, Site};
use parking_lot::Mutex;

use crate::prelude::ReportError;

mod memory;
mod remote;
mod snapshot;

pub use memory::MemorySource;
pub use remote::RemoteSource;
pub use snapshot::SnapshotSource;

pub const SITES_COLLECTION: &str = "sites";

pub trait InventorySource {
    /// Populates the collection for `kind`. Safe to call for every kind at once.
    #[allow(async_fn_in_trait)]
    async fn fetch_inventory(&self, kind: InventoryKind) -> Result<(), ReportError>;

    /// Records fetched for `kind`. Only valid after [`Self::fetch_inventory`]
    /// for the same kind completed.
    fn get_inventory(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError>;

    #[allow(async_fn_in_trait)]
    async fn fetch_sites(&self) -> Result<(), ReportError>;

    fn get_sites(&self) -> Result<Vec<Site>, ReportError>;

    /// Releases the connection. Calling it more than once is a no-op.
    #[allow(async_fn_in_trait)]
    async fn close_connection(&self) -> Result<(), ReportError>;
}

/// Every collection of one run, taken after all fetches completed.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub sites: Vec<Site>,
    devices: BTreeMap<InventoryKind, Vec<InventoryEntity>>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_devices(mut self, kind: InventoryKind, devices: Vec<InventoryEntity>) -> Self {
        self.set_devices(kind, devices);
        self
    }

    pub fn set_devices(&mut self, kind: InventoryKind, devices: Vec<InventoryEntity>) {
        self.devices.insert(kind, devices);
    }

    pub fn devices(&self, kind: InventoryKind) -> &[InventoryEntity] {
        self.devices.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Device records of every kind, grouped by kind in [`InventoryKind::ALL`] order.
    pub fn all_devices(&self) -> impl Iterator<Item = &InventoryEntity> {
        InventoryKind::ALL
            .into_iter()
            .flat_map(|kind| self.devices(kind).iter())
    }

    pub fn device_count(&self) -> usize {
        self.devices.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty() && self.device_count() == 0
    }
}

impl FromIterator<(InventoryKind, Vec<InventoryEntity>)> for InventorySnapshot {
    fn from_iter<I: IntoIterator<Item = (InventoryKind, Vec<InventoryEntity>)>>(iter: I) -> Self {
        InventorySnapshot {
            sites: Vec::new(),
            devices: iter.into_iter().collect(),
        }
    }
}

/// Fetches all six device collections and the sites concurrently and only
/// reads them back once every fetch succeeded.
///
/// # Errors
///
/// Returns as soon as any fetch fails. Fetches still in flight are dropped and
/// nothing fetched so far is kept.
pub async fn fetch_snapshot<S: InventorySource>(
    source: &S,
) -> Result<InventorySnapshot, ReportError> {
    let device_fetches = try_join_all(
        InventoryKind::ALL
            .into_iter()
            .map(|kind| source.fetch_inventory(kind)),
    );

    futures::try_join!(device_fetches, source.fetch_sites())?;

    let mut snapshot = InventorySnapshot::new().with_sites(source.get_sites()?);
    for kind in InventoryKind::ALL {
        snapshot.set_devices(kind, source.get_inventory(kind)?);
    }

    tracing::debug!(
        sites = snapshot.sites.len(),
        devices = snapshot.device_count(),
        "inventory snapshot fetched"
    );

    Ok(snapshot)
}

/// Holds collections between the fetch and read phases of a source.
#[derive(Debug, Default)]
pub(crate) struct FetchCache {
    devices: Mutex<HashMap<InventoryKind, Vec<InventoryEntity>>>,
    sites: Mutex<Option<Vec<Site>>>,
}

impl FetchCache {
    pub(crate) fn store_devices(&self, kind: InventoryKind, devices: Vec<InventoryEntity>) {
        self.devices.lock().insert(kind, devices);
    }

    pub(crate) fn store_sites(&self, sites: Vec<Site>) {
        *self.sites.lock() = Some(sites);
    }

    pub(crate) fn devices(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError> {
        self.devices
            .lock()
            .get(&kind)
            .cloned()
            .ok_or_else(|| ReportError::NotFetched(kind.collection().to_string()))
    }

    pub(crate) fn sites(&self) -> Result<Vec<Site>, ReportError> {
        self.sites
            .lock()
            .clone()
            .ok_or_else(|| ReportError::NotFetched(SITES_COLLECTION.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing_utils::{card, shelf, site, top_node};

    #[tokio::test]
    async fn snapshot_holds_every_collection() {
        let source = MemorySource::new(
            InventorySnapshot::new()
                .with_sites(vec![site("s-1", "DC1", 10.0, 20.0)])
                .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", Some("s-1"))])
                .with_devices(InventoryKind::Shelf, vec![shelf("sh-1", "Sh1", "n-1")])
                .with_devices(InventoryKind::Card, vec![card("c-1", "Sh1-0", "sh-1")]),
        );

        let snapshot = fetch_snapshot(&source).await.unwrap();

        assert_eq!(snapshot.sites.len(), 1);
        assert_eq!(snapshot.device_count(), 3);
        assert_eq!(snapshot.devices(InventoryKind::Card)[0].name, "Sh1-0");
        assert!(snapshot.devices(InventoryKind::Fan).is_empty());
        assert_eq!(source.fetch_count(), 7);
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_barrier() {
        let source = MemorySource::new(
            InventorySnapshot::new()
                .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", None)]),
        )
        .failing_on(InventoryKind::Fan.collection());

        let err = fetch_snapshot(&source).await.unwrap_err();

        assert!(matches!(err, ReportError::Fetch { ref collection, .. } if collection == "fans"));
        assert!(source.fetch_count() <= 7);
    }

    /// Never finishes fetching ports; everything else comes from `inner`.
    struct StalledPorts {
        inner: MemorySource,
    }

    impl InventorySource for StalledPorts {
        async fn fetch_inventory(&self, kind: InventoryKind) -> Result<(), ReportError> {
            if kind == InventoryKind::Port {
                futures::future::pending::<()>().await;
            }
            self.inner.fetch_inventory(kind).await
        }

        fn get_inventory(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError> {
            self.inner.get_inventory(kind)
        }

        async fn fetch_sites(&self) -> Result<(), ReportError> {
            self.inner.fetch_sites().await
        }

        fn get_sites(&self) -> Result<Vec<Site>, ReportError> {
            self.inner.get_sites()
        }

        async fn close_connection(&self) -> Result<(), ReportError> {
            self.inner.close_connection().await
        }
    }

    #[tokio::test]
    async fn failure_does_not_wait_for_stalled_fetches() {
        for failing in [InventoryKind::Fan.collection(), SITES_COLLECTION] {
            let source = StalledPorts {
                inner: MemorySource::new(InventorySnapshot::new()).failing_on(failing),
            };

            let result =
                tokio::time::timeout(std::time::Duration::from_secs(2), fetch_snapshot(&source))
                    .await
                    .expect("a failed fetch must end the barrier");

            assert!(matches!(
                result,
                Err(ReportError::Fetch { ref collection, .. }) if collection == failing
            ));
        }
    }

    #[tokio::test]
    async fn failed_site_fetch_fails_the_barrier() {
        let source = MemorySource::new(InventorySnapshot::new()).failing_on(SITES_COLLECTION);

        let err = fetch_snapshot(&source).await.unwrap_err();
        assert!(matches!(err, ReportError::Fetch { ref collection, .. } if collection == "sites"));
    }

    #[test]
    fn reading_before_fetch_is_an_error() {
        let cache = FetchCache::default();

        assert!(matches!(
            cache.devices(InventoryKind::Port),
            Err(ReportError::NotFetched(ref c)) if c == "ports"
        ));
        assert!(matches!(cache.sites(), Err(ReportError::NotFetched(_))));

        cache.store_sites(vec![]);
        assert!(cache.sites().unwrap().is_empty());
    }

    #[test]
    fn all_devices_walks_kinds_in_fetch_order() {
        let snapshot = InventorySnapshot::new()
            .with_devices(InventoryKind::Card, vec![card("c-1", "Sh1-0", "sh-1")])
            .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", None)]);

        let kinds: Vec<_> = snapshot.all_devices().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![InventoryKind::TopNode, InventoryKind::Card]);
        assert!(!snapshot.is_empty());
        assert!(InventorySnapshot::new().is_empty());
    }
}
