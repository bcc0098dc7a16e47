use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use models::inventory::{InventoryEntity, InventoryKind, InventoryRecord, Site};
use serde::de::DeserializeOwned;

use super::{FetchCache, InventorySource, SITES_COLLECTION};
use crate::prelude::ReportError;

/// Reads an inventory snapshot from a directory holding one YAML file per
/// collection: `sites.yaml`, `top_nodes.yaml`, `shelves.yaml`, `cards.yaml`,
/// `ports.yaml`, `power_supplies.yaml` and `fans.yaml`.
///
/// A collection without a file is empty.
#[derive(Debug)]
pub struct SnapshotSource {
    dir: PathBuf,
    cache: FetchCache,
    closed: AtomicBool,
}

impl SnapshotSource {
    /// # Errors
    ///
    /// Returns [`ReportError::IoPath`] if `dir` does not exist or is not a directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let dir = dir.as_ref();

        if !dir.exists() {
            return Err(ReportError::IoPath {
                path: dir.to_path_buf(),
                message: "Path does not exist".into(),
            });
        }
        if !dir.is_dir() {
            return Err(ReportError::IoPath {
                path: dir.to_path_buf(),
                message: "Path is not a directory".into(),
            });
        }

        Ok(SnapshotSource {
            dir: dir.to_path_buf(),
            cache: FetchCache::default(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.yaml"))
    }

    async fn load_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, ReportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ReportError::ConnectionClosed);
        }

        let path = self.collection_path(collection);
        let path_str = path.display().to_string();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no `{collection}` file in snapshot, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ReportError::Io {
                    path: path_str,
                    source: e,
                });
            }
        };

        // an empty file deserializes to a YAML null, not a sequence
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&data).map_err(|e| ReportError::Yaml {
            path: path_str,
            source: e,
        })
    }
}

impl InventorySource for SnapshotSource {
    async fn fetch_inventory(&self, kind: InventoryKind) -> Result<(), ReportError> {
        let records: Vec<InventoryRecord> = self.load_collection(kind.collection()).await?;
        let devices = records
            .into_iter()
            .map(|record| record.into_entity(kind))
            .collect();

        self.cache.store_devices(kind, devices);
        Ok(())
    }

    fn get_inventory(&self, kind: InventoryKind) -> Result<Vec<InventoryEntity>, ReportError> {
        self.cache.devices(kind)
    }

    async fn fetch_sites(&self) -> Result<(), ReportError> {
        let sites = self.load_collection(SITES_COLLECTION).await?;
        self.cache.store_sites(sites);
        Ok(())
    }

    fn get_sites(&self) -> Result<Vec<Site>, ReportError> {
        self.cache.sites()
    }

    async fn close_connection(&self) -> Result<(), ReportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
