mod entity;
mod guid;
mod kind;
mod site;

pub use entity::{InventoryEntity, InventoryRecord};
pub use guid::Guid;
pub use kind::InventoryKind;
pub use site::Site;
