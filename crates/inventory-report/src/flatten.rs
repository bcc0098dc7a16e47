//! Depth-first, pre-order walk of every top node's subtree, producing one
//! fixed-width row per device.
//!
//! Visit order below a top node:
//!
//! ```text
//! top node
//! └─ shelves (fetch order)
//!    ├─ cards (by slot token)
//!    │  └─ ports (by port token)
//!    ├─ power supplies (fetch order)
//!    └─ fans (fetch order)
//! ```
//!
//! The last four columns carry the top node's site context and repeat on
//! every row of its subtree.

use models::inventory::{InventoryEntity, InventoryKind};
use serde::Serialize;

use crate::prelude::{ChildIndex, ReportError, ResolvedInventory, ResolvedView, sort_siblings};

pub const ROW_WIDTH: usize = 8;
pub const NO_SITE_ASSIGNED: &str = "No Site Assigned";

/// Site columns shared by a top node and all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    pub site_name: String,
    pub latitude: String,
    pub longitude: String,
    pub parent_node: String,
}

impl SiteContext {
    /// Context of a top node. Without a resolvable site the site columns fall
    /// back to [`NO_SITE_ASSIGNED`] and empty coordinates; the node column is
    /// filled either way.
    pub fn for_top_node(view: &ResolvedView<'_>) -> Self {
        match view.site.resolved() {
            Some(site) => {
                let (latitude, longitude) = site.coordinates();
                SiteContext {
                    site_name: site.name.clone(),
                    latitude,
                    longitude,
                    parent_node: view.entity.name.clone(),
                }
            }
            None => SiteContext {
                site_name: NO_SITE_ASSIGNED.to_string(),
                latitude: String::new(),
                longitude: String::new(),
                parent_node: view.entity.name.clone(),
            },
        }
    }
}

/// `[type, name, serial, description, site, latitude, longitude, parent node]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportRow([String; ROW_WIDTH]);

impl ReportRow {
    fn for_device(device: &InventoryEntity, serial_number: &str, context: &SiteContext) -> Self {
        ReportRow([
            device.type_label(),
            device.name.clone(),
            serial_number.to_string(),
            device.description.clone(),
            context.site_name.clone(),
            context.latitude.clone(),
            context.longitude.clone(),
            context.parent_node.clone(),
        ])
    }

    /// Top nodes never show a serial number.
    fn for_top_node(node: &InventoryEntity, context: &SiteContext) -> Self {
        Self::for_device(node, "", context)
    }

    fn for_child(device: &InventoryEntity, context: &SiteContext) -> Self {
        Self::for_device(device, &device.serial_number, context)
    }

    pub fn fields(&self) -> &[String; ROW_WIDTH] {
        &self.0
    }

    pub fn type_label(&self) -> &str {
        &self.0[0]
    }

    pub fn name(&self) -> &str {
        &self.0[1]
    }

    /// The four site-context columns.
    pub fn context(&self) -> &[String] {
        &self.0[4..]
    }

    pub fn into_fields(self) -> [String; ROW_WIDTH] {
        self.0
    }
}

pub struct Flattener<'i, 'a> {
    index: &'i ChildIndex<'a>,
    rows: Vec<ReportRow>,
}

impl<'i, 'a> Flattener<'i, 'a> {
    pub fn new(index: &'i ChildIndex<'a>) -> Self {
        Flattener {
            index,
            rows: Vec::new(),
        }
    }

    /// Walks every top node in `resolved`, in fetch order.
    ///
    /// # Errors
    ///
    /// Fails with [`ReportError::MalformedName`] as soon as a card or port
    /// cannot be ordered; no rows are returned in that case.
    pub fn flatten(
        mut self,
        resolved: &ResolvedInventory<'a>,
    ) -> Result<Vec<ReportRow>, ReportError> {
        for view in resolved.views().iter().filter(|view| view.entity.is_root()) {
            self.visit_top_node(view)?;
        }
        Ok(self.rows)
    }

    fn visit_top_node(&mut self, view: &ResolvedView<'a>) -> Result<(), ReportError> {
        let index = self.index;
        let node = view.entity;
        let context = SiteContext::for_top_node(view);

        self.rows.push(ReportRow::for_top_node(node, &context));

        for shelf in index.children_of(&node.guid, InventoryKind::Shelf) {
            self.visit_shelf(shelf, &context)?;
        }
        Ok(())
    }

    fn visit_shelf(
        &mut self,
        shelf: &InventoryEntity,
        context: &SiteContext,
    ) -> Result<(), ReportError> {
        let index = self.index;
        self.rows.push(ReportRow::for_child(shelf, context));

        let cards = sort_siblings(index.children_of(&shelf.guid, InventoryKind::Card))?;
        for card in cards {
            self.rows.push(ReportRow::for_child(card, context));

            let ports = sort_siblings(index.children_of(&card.guid, InventoryKind::Port))?;
            self.emit_all(&ports, context);
        }

        self.emit_all(index.children_of(&shelf.guid, InventoryKind::PowerSupply), context);
        self.emit_all(index.children_of(&shelf.guid, InventoryKind::Fan), context);
        Ok(())
    }

    fn emit_all(&mut self, devices: &[&InventoryEntity], context: &SiteContext) {
        self.rows
            .extend(devices.iter().map(|device| ReportRow::for_child(device, context)));
    }
}

/// Flattens the whole inventory into report rows.
pub fn flatten<'a>(
    resolved: &ResolvedInventory<'a>,
    index: &ChildIndex<'a>,
) -> Result<Vec<ReportRow>, ReportError> {
    Flattener::new(index).flatten(resolved)
}
