use serde::{Deserialize, Serialize};

use crate::inventory::{Guid, InventoryKind};

/// A device record as delivered by an inventory source, before it is tagged
/// with the collection it came from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub guid: Guid,
    pub name: String,

    #[serde(default)]
    pub serial_number: String,

    #[serde(default, alias = "desc")]
    pub description: String,

    /// Finer-grained type label, e.g. the chassis model of a top node.
    #[serde(default)]
    pub device_type: Option<String>,

    #[serde(default)]
    pub parent_guid: Option<Guid>,

    /// Only meaningful on top nodes.
    #[serde(default)]
    pub site_guid: Option<Guid>,
}

impl InventoryRecord {
    pub fn into_entity(self, kind: InventoryKind) -> InventoryEntity {
        InventoryEntity {
            guid: self.guid,
            kind,
            name: self.name,
            serial_number: self.serial_number,
            description: self.description,
            device_type: self.device_type,
            parent_guid: self.parent_guid,
            site_guid: self.site_guid,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntity {
    pub guid: Guid,
    pub kind: InventoryKind,
    pub name: String,
    pub serial_number: String,
    pub description: String,
    pub device_type: Option<String>,
    pub parent_guid: Option<Guid>,
    pub site_guid: Option<Guid>,
}

impl InventoryEntity {
    /// Label shown in the type column: the device type when the source sent
    /// one, the kind otherwise.
    pub fn type_label(&self) -> String {
        match &self.device_type {
            Some(device_type) if !device_type.is_empty() => device_type.clone(),
            _ => self.kind.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == InventoryKind::TopNode
    }
}
