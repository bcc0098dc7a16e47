#![allow(unused_imports)]

pub use crate::error::ReportError;
pub use crate::flatten::{Flattener, NO_SITE_ASSIGNED, ROW_WIDTH, ReportRow, SiteContext, flatten};
pub use crate::index::ChildIndex;
pub use crate::order::{order_key, sort_siblings};
pub use crate::report::{OutputFormat, REPORT_HEADERS, ReportDescriptor, ReportOutput, ReportStats};
pub use crate::resolve::{Reference, ResolvedInventory, ResolvedView};
pub use crate::session::{ReportSession, build_report};
pub use crate::source::{
    InventorySnapshot, InventorySource, MemorySource, RemoteSource, SnapshotSource, fetch_snapshot,
};
pub use crate::store::{EntityStore, StoredEntity};
pub use crate::{ReportArgs, SourceSelection, descriptor_for, generate_report, match_and_print};
