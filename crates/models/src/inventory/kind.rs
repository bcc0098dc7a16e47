use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The six device collections fetched from the inventory service.
///
/// Sites are fetched separately and are not an [`InventoryKind`].
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
)]
pub enum InventoryKind {
    #[strum(serialize = "TopNode")]
    TopNode,
    #[strum(serialize = "Shelf")]
    Shelf,
    #[strum(serialize = "Card")]
    Card,
    #[strum(serialize = "Port")]
    Port,
    #[strum(serialize = "PowerSupply")]
    PowerSupply,
    #[strum(serialize = "Fan")]
    Fan,
}

impl InventoryKind {
    /// All device kinds, in the order they are requested from a source.
    pub const ALL: [InventoryKind; 6] = [
        InventoryKind::TopNode,
        InventoryKind::PowerSupply,
        InventoryKind::Fan,
        InventoryKind::Shelf,
        InventoryKind::Card,
        InventoryKind::Port,
    ];

    /// Name of the collection holding records of this kind, as used in
    /// snapshot file names and service endpoints.
    pub fn collection(&self) -> &'static str {
        match self {
            InventoryKind::TopNode => "top_nodes",
            InventoryKind::Shelf => "shelves",
            InventoryKind::Card => "cards",
            InventoryKind::Port => "ports",
            InventoryKind::PowerSupply => "power_supplies",
            InventoryKind::Fan => "fans",
        }
    }

    /// Kind of the entity a record of this kind is expected to hang off.
    pub fn parent_kind(&self) -> Option<InventoryKind> {
        match self {
            InventoryKind::TopNode => None,
            InventoryKind::Shelf => Some(InventoryKind::TopNode),
            InventoryKind::Card | InventoryKind::PowerSupply | InventoryKind::Fan => {
                Some(InventoryKind::Shelf)
            }
            InventoryKind::Port => Some(InventoryKind::Card),
        }
    }
}
