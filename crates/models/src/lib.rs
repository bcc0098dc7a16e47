//! Inventory data model shared by the report pipeline and its sources.
//!
//! Every record fetched from the inventory service lives in one GUID space,
//! regardless of which collection it came from. Device records carry an
//! optional parent reference and, for top-level nodes, an optional site
//! reference; neither is guaranteed to resolve.

pub mod inventory;
