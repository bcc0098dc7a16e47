use std::collections::HashMap;

use models::inventory::{Guid, InventoryEntity, InventoryKind};

use crate::prelude::{Reference, ResolvedInventory};

/// Devices grouped by resolved parent and kind, built in one pass so that
/// each lookup costs the same no matter how large the inventory is.
#[derive(Debug, Default)]
pub struct ChildIndex<'a> {
    groups: HashMap<Guid, HashMap<InventoryKind, Vec<&'a InventoryEntity>>>,
    orphans: Vec<&'a InventoryEntity>,
}

impl<'a> ChildIndex<'a> {
    pub fn build(resolved: &ResolvedInventory<'a>) -> Self {
        let mut index = ChildIndex::default();

        for view in resolved.views() {
            if view.entity.is_root() {
                continue;
            }

            match view.parent {
                Reference::Resolved(parent)
                    if Some(parent.kind) == view.entity.kind.parent_kind() =>
                {
                    index
                        .groups
                        .entry(parent.guid.clone())
                        .or_default()
                        .entry(view.entity.kind)
                        .or_default()
                        .push(view.entity)
                }
                Reference::Resolved(parent) => {
                    tracing::debug!(
                        guid = %view.entity.guid,
                        "{} `{}` has a {} as parent",
                        view.entity.kind,
                        view.entity.name,
                        parent.kind
                    );
                    index.orphans.push(view.entity)
                }
                Reference::Absent | Reference::Unresolved(_) => index.orphans.push(view.entity),
            }
        }

        if !index.orphans.is_empty() {
            tracing::warn!(
                "{} inventory records have no usable parent and will not be reported",
                index.orphans.len()
            );
        }

        index
    }

    /// Children of `parent` with the given kind, in insertion order. Empty if
    /// there are none.
    pub fn children_of(&self, parent: &Guid, kind: InventoryKind) -> &[&'a InventoryEntity] {
        self.groups
            .get(parent.as_str())
            .and_then(|by_kind| by_kind.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Non-root records whose parent is missing, does not resolve, or is not
    /// of the kind that can contain them.
    pub fn orphans(&self) -> &[&'a InventoryEntity] {
        &self.orphans
    }

    /// Number of parents with at least one child.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
