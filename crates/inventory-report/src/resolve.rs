//! Second pass over the store: turns raw `parentGuid`/`siteGuid` fields into
//! handles on the records they name.
//!
//! A reference that names nothing, or names a record of the wrong sort (a
//! device where a site is expected and vice versa), is [`Reference::Unresolved`].
//! That is an ordinary outcome and never an error.

use models::inventory::{Guid, InventoryEntity, Site};

use crate::prelude::{EntityStore, StoredEntity};

#[derive(Debug, PartialEq)]
pub enum Reference<'a, T> {
    /// The record carries no reference.
    Absent,
    Resolved(&'a T),
    /// The record names a GUID the store does not hold.
    Unresolved(&'a Guid),
}

impl<'a, T> Reference<'a, T> {
    pub fn resolved(&self) -> Option<&'a T> {
        match self {
            Reference::Resolved(target) => Some(*target),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Reference::Unresolved(_))
    }
}

/// A device with its references looked up. The device itself is untouched.
#[derive(Debug)]
pub struct ResolvedView<'a> {
    pub entity: &'a InventoryEntity,
    pub parent: Reference<'a, InventoryEntity>,
    pub site: Reference<'a, Site>,
}

/// Resolves the parent and site references of one device.
pub fn resolve<'a>(store: &'a EntityStore, entity: &'a InventoryEntity) -> ResolvedView<'a> {
    let parent = match &entity.parent_guid {
        None => Reference::Absent,
        Some(guid) => match store.get(guid.as_str()).and_then(StoredEntity::as_device) {
            Some(parent) => Reference::Resolved(parent),
            None => Reference::Unresolved(guid),
        },
    };

    let site = match &entity.site_guid {
        None => Reference::Absent,
        Some(guid) => match store.get(guid.as_str()).and_then(StoredEntity::as_site) {
            Some(site) => Reference::Resolved(site),
            None => Reference::Unresolved(guid),
        },
    };

    if parent.is_unresolved() || site.is_unresolved() {
        tracing::debug!(
            guid = %entity.guid,
            name = %entity.name,
            unresolved_parent = parent.is_unresolved(),
            unresolved_site = site.is_unresolved(),
            "dangling reference"
        );
    }

    ResolvedView {
        entity,
        parent,
        site,
    }
}

/// Resolved views of every device in the store, in store order.
#[derive(Debug)]
pub struct ResolvedInventory<'a> {
    views: Vec<ResolvedView<'a>>,
}

impl<'a> ResolvedInventory<'a> {
    pub fn resolve_all(store: &'a EntityStore) -> Self {
        ResolvedInventory {
            views: store.devices().map(|device| resolve(store, device)).collect(),
        }
    }

    pub fn views(&self) -> &[ResolvedView<'a>] {
        &self.views
    }

    pub fn unresolved_count(&self) -> usize {
        self.views
            .iter()
            .filter(|view| view.parent.is_unresolved() || view.site.is_unresolved())
            .count()
    }
}
