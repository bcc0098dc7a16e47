use std::collections::{HashMap, hash_map::Entry};

use models::inventory::{Guid, InventoryEntity, InventoryKind, Site};

use crate::prelude::{InventorySnapshot, ReportError};

/// Anything the store can hold. Sites and devices share one GUID space.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntity {
    Site(Site),
    Device(InventoryEntity),
}

impl StoredEntity {
    pub fn guid(&self) -> &Guid {
        match self {
            StoredEntity::Site(site) => &site.guid,
            StoredEntity::Device(device) => &device.guid,
        }
    }

    pub fn as_site(&self) -> Option<&Site> {
        match self {
            StoredEntity::Site(site) => Some(site),
            StoredEntity::Device(_) => None,
        }
    }

    pub fn as_device(&self) -> Option<&InventoryEntity> {
        match self {
            StoredEntity::Device(device) => Some(device),
            StoredEntity::Site(_) => None,
        }
    }
}

/// Every record of one run keyed by GUID, with insertion order kept.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<StoredEntity>,
    by_guid: HashMap<Guid, usize>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests a complete snapshot: sites first, then every device kind in
    /// fetch order.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Result<Self, ReportError> {
        let mut store = EntityStore::new();

        for site in snapshot.sites.iter().cloned() {
            store.put(StoredEntity::Site(site))?;
        }
        for device in snapshot.all_devices().cloned() {
            store.put(StoredEntity::Device(device))?;
        }

        tracing::debug!("entity store holds {} records", store.len());
        Ok(store)
    }

    /// # Errors
    ///
    /// Returns [`ReportError::DuplicateGuid`] if a record with the same GUID
    /// was already ingested.
    pub fn put(&mut self, entity: StoredEntity) -> Result<(), ReportError> {
        match self.by_guid.entry(entity.guid().clone()) {
            Entry::Occupied(occupied) => Err(ReportError::DuplicateGuid(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(self.entities.len());
                self.entities.push(entity);
                Ok(())
            }
        }
    }

    pub fn get(&self, guid: &str) -> Option<&StoredEntity> {
        self.by_guid.get(guid).map(|&idx| &self.entities[idx])
    }

    pub fn devices(&self) -> impl Iterator<Item = &InventoryEntity> {
        self.entities.iter().filter_map(StoredEntity::as_device)
    }

    /// Devices of `kind` in the order they were ingested.
    pub fn devices_of(&self, kind: InventoryKind) -> impl Iterator<Item = &InventoryEntity> {
        self.devices().filter(move |device| device.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
