use crate::prelude::{
    ChildIndex, EntityStore, InventorySnapshot, InventorySource, ReportDescriptor, ReportError,
    ReportOutput, ReportStats, ResolvedInventory, fetch_snapshot, flatten,
};

/// Builds the report from a complete snapshot. Everything after the fetch
/// barrier happens here, synchronously.
pub fn build_report(
    descriptor: &ReportDescriptor,
    snapshot: InventorySnapshot,
) -> Result<(ReportOutput, ReportStats), ReportError> {
    let store = EntityStore::from_snapshot(snapshot)?;
    let resolved = ResolvedInventory::resolve_all(&store);
    let index = ChildIndex::build(&resolved);
    let rows = flatten(&resolved, &index)?;

    let stats = ReportStats {
        rows: rows.len(),
        orphans: index.orphans().len(),
        unresolved_references: resolved.unresolved_count(),
    };

    Ok((ReportOutput::assemble(descriptor, rows), stats))
}

/// One report run against one inventory source.
///
/// [`Self::cleanup`] must run on every exit path; [`Self::execute`] does that
/// for callers that do not need to drive the two steps separately.
pub struct ReportSession<S: InventorySource> {
    source: S,
    descriptor: ReportDescriptor,
    cleaned_up: bool,
}

impl<S: InventorySource> ReportSession<S> {
    pub fn new(source: S, descriptor: ReportDescriptor) -> Self {
        ReportSession {
            source,
            descriptor,
            cleaned_up: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn descriptor(&self) -> &ReportDescriptor {
        &self.descriptor
    }

    /// Fetches every collection and builds the report.
    ///
    /// # Errors
    ///
    /// Any failed fetch, a duplicate GUID, or a card/port name that cannot be
    /// ordered fails the whole run. No partial table is produced.
    pub async fn run(&self) -> Result<ReportOutput, ReportError> {
        tracing::info!("running report {}", self.descriptor.name);

        let snapshot = fetch_snapshot(&self.source).await?;
        let (output, stats) = build_report(&self.descriptor, snapshot)?;

        tracing::info!(
            rows = stats.rows,
            orphans = stats.orphans,
            unresolved = stats.unresolved_references,
            "report {} finished",
            self.descriptor.name
        );
        Ok(output)
    }

    /// Closes the source's connection. Later calls do nothing.
    pub async fn cleanup(&mut self) -> Result<(), ReportError> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        self.source.close_connection().await
    }

    /// Runs the report and cleans up regardless of the outcome. A cleanup
    /// failure is logged; the run's own result is returned.
    pub async fn execute(&mut self) -> Result<ReportOutput, ReportError> {
        let result = self.run().await;

        if let Err(e) = self.cleanup().await {
            tracing::warn!("failed to close inventory connection: {e}");
        }

        if let Err(e) = &result {
            tracing::error!("report {} failed: {e}", self.descriptor.name);
        }
        result
    }
}

impl<S: InventorySource> Drop for ReportSession<S> {
    fn drop(&mut self) {
        if !self.cleaned_up {
            tracing::warn!(
                "report session for {} dropped without cleanup",
                self.descriptor.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{MemorySource, ReportRow};
    use models::inventory::InventoryKind;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};
    use testing_utils::{arb_topology, block_on_runtime, card, shelf, site, top_node};

    fn arb_snapshot() -> impl Strategy<Value = InventorySnapshot> {
        arb_topology().prop_map(|topology| {
            topology
                .devices
                .into_iter()
                .collect::<InventorySnapshot>()
                .with_sites(topology.sites)
        })
    }

    fn session(snapshot: InventorySnapshot) -> ReportSession<MemorySource> {
        ReportSession::new(MemorySource::new(snapshot), ReportDescriptor::default())
    }

    #[tokio::test]
    async fn one_shelf_two_cards() {
        let mut session = session(
            InventorySnapshot::new()
                .with_sites(vec![site("s-1", "DC1", 10.0, 20.0)])
                .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", Some("s-1"))])
                .with_devices(InventoryKind::Shelf, vec![shelf("sh-1", "Sh1", "n-1")])
                .with_devices(
                    InventoryKind::Card,
                    vec![card("c-1", "Sh1-1", "sh-1"), card("c-0", "Sh1-0", "sh-1")],
                ),
        );

        let output = session.execute().await.unwrap();

        let names: Vec<_> = output.rows().iter().map(ReportRow::name).collect();
        assert_eq!(names, vec!["N1", "Sh1", "Sh1-0", "Sh1-1"]);
        for row in output.rows() {
            assert_eq!(row.context(), ["DC1", "10.0", "20.0", "N1"]);
        }
        assert_eq!(session.source().close_count(), 1);
    }

    #[tokio::test]
    async fn empty_inventory_is_textual() {
        let mut session = session(InventorySnapshot::new());

        let output = session.execute().await.unwrap();

        assert!(!output.is_tabular());
        assert_eq!(
            output.to_string().trim_end(),
            "There is no data for report Network Topology Inventory Report"
        );
    }

    #[tokio::test]
    async fn sites_alone_are_still_no_data() {
        let mut session =
            session(InventorySnapshot::new().with_sites(vec![site("s-1", "DC1", 1.0, 2.0)]));

        assert!(!session.execute().await.unwrap().is_tabular());
    }

    #[tokio::test]
    async fn fetch_failure_still_closes_the_connection() {
        let mut session = ReportSession::new(
            MemorySource::new(
                InventorySnapshot::new()
                    .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", None)]),
            )
            .failing_on("ports"),
            ReportDescriptor::default(),
        );

        let err = session.execute().await.unwrap_err();

        assert!(matches!(err, ReportError::Fetch { .. }));
        assert_eq!(session.source().close_count(), 1);
    }

    #[tokio::test]
    async fn malformed_name_fails_and_closes() {
        let mut session = session(
            InventorySnapshot::new()
                .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", None)])
                .with_devices(InventoryKind::Shelf, vec![shelf("sh-1", "Sh1", "n-1")])
                .with_devices(InventoryKind::Card, vec![card("c-1", "slot", "sh-1")]),
        );

        let err = session.execute().await.unwrap_err();

        assert!(matches!(err, ReportError::MalformedName { kind: InventoryKind::Card, .. }));
        assert!(session.source().is_closed());
    }

    #[tokio::test]
    async fn cleanup_runs_once() {
        let mut session = session(InventorySnapshot::new());

        session.cleanup().await.unwrap();
        session.cleanup().await.unwrap();
        let _ = session.execute().await;

        assert_eq!(session.source().close_count(), 1);
    }

    #[test]
    fn stats_count_orphans_and_dangling_references() {
        let snapshot = InventorySnapshot::new()
            .with_devices(
                InventoryKind::TopNode,
                vec![top_node("n-1", "N1", Some("s-404"))],
            )
            .with_devices(
                InventoryKind::Shelf,
                vec![shelf("sh-1", "Sh1", "n-1"), shelf("sh-2", "Sh2", "n-404")],
            );

        let (output, stats) = build_report(&ReportDescriptor::default(), snapshot).unwrap();

        assert_eq!(output.rows().len(), 2);
        assert_eq!(
            stats,
            ReportStats {
                rows: 2,
                orphans: 1,
                unresolved_references: 2,
            }
        );
    }

    #[test]
    fn card_hung_off_a_top_node_is_counted_as_orphan() {
        let snapshot = InventorySnapshot::new()
            .with_devices(InventoryKind::TopNode, vec![top_node("n-1", "N1", None)])
            .with_devices(InventoryKind::Shelf, vec![shelf("sh-1", "Sh1", "n-1")])
            .with_devices(InventoryKind::Card, vec![card("c-1", "Sh1-1", "n-1")]);

        let (_, stats) = build_report(&ReportDescriptor::default(), snapshot).unwrap();

        assert_eq!(
            stats,
            ReportStats {
                rows: 2,
                orphans: 1,
                unresolved_references: 0,
            }
        );
    }

    proptest! {
        #[test]
        fn every_device_appears_exactly_once(snapshot in arb_snapshot()) {
            let expected = snapshot.device_count();
            let names: HashSet<_> = snapshot.all_devices().map(|d| d.name.clone()).collect();

            let (output, stats) = build_report(&ReportDescriptor::default(), snapshot).unwrap();

            prop_assert_eq!(output.rows().len(), expected);
            prop_assert_eq!(stats.orphans, 0);
            let seen: HashSet<_> = output.rows().iter().map(|r| r.name().to_string()).collect();
            prop_assert_eq!(seen, names);
        }

        #[test]
        fn context_is_constant_below_each_top_node(snapshot in arb_snapshot()) {
            let (output, _) = build_report(&ReportDescriptor::default(), snapshot).unwrap();

            let mut current: Option<Vec<String>> = None;
            for row in output.rows() {
                prop_assert_eq!(row.fields().len(), 8);
                if row.type_label() == "TopNode" {
                    prop_assert_eq!(&row.context()[3], row.name());
                    current = Some(row.context().to_vec());
                } else {
                    prop_assert_eq!(Some(row.context().to_vec()), current.clone());
                }
            }
        }

        #[test]
        fn siblings_come_out_in_position_order(snapshot in arb_snapshot()) {
            let (output, _) = build_report(&ReportDescriptor::default(), snapshot).unwrap();

            let mut last: HashMap<(String, String), i64> = HashMap::new();
            for row in output.rows() {
                let tokens: Vec<&str> = row.name().split('-').collect();
                let position = match row.type_label() {
                    "Card" => tokens[1],
                    "Port" => tokens[2],
                    _ => continue,
                };
                let position: i64 = position.parse().unwrap();
                let siblings = (row.type_label().to_string(), tokens[0].to_string());
                if let Some(previous) = last.insert(siblings, position) {
                    prop_assert!(previous < position);
                }
            }
        }

        #[test]
        fn execute_closes_on_every_path(snapshot in arb_snapshot(), fail in any::<bool>()) {
            block_on_runtime!({
                let mut source = MemorySource::new(snapshot);
                if fail {
                    source = source.failing_on("cards");
                }
                let mut session = ReportSession::new(source, ReportDescriptor::default());

                let result = session.execute().await;

                prop_assert_eq!(result.is_err(), fail);
                prop_assert_eq!(session.source().close_count(), 1);
                Ok(())
            })?
        }
    }
}
