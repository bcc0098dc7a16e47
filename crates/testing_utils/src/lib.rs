use models::inventory::{Guid, InventoryEntity, InventoryKind, Site};
use prop::collection::vec;
use proptest::prelude::*;

// This magic library called `ctor` somehow runs before any other step in the test binary
// we use it to install color_eyre for prettier panic messages (we can't do this in each test
// because they run in parallel)
#[ctor::ctor]
fn init() {
    let _ = color_eyre::install();
}

pub fn site(guid: &str, name: &str, latitude: f64, longitude: f64) -> Site {
    Site {
        guid: Guid::from(guid),
        name: name.to_string(),
        latitude,
        longitude,
    }
}

fn device(kind: InventoryKind, guid: &str, name: &str, parent: Option<&str>) -> InventoryEntity {
    InventoryEntity {
        kind,
        guid: Guid::from(guid),
        name: name.to_string(),
        serial_number: format!("SN-{guid}"),
        description: String::new(),
        device_type: None,
        parent_guid: parent.map(Guid::from),
        site_guid: None,
    }
}

/// A top node has no serial number of its own in the report.
pub fn top_node(guid: &str, name: &str, site: Option<&str>) -> InventoryEntity {
    InventoryEntity {
        serial_number: String::new(),
        site_guid: site.map(Guid::from),
        ..device(InventoryKind::TopNode, guid, name, None)
    }
}

pub fn shelf(guid: &str, name: &str, parent: &str) -> InventoryEntity {
    device(InventoryKind::Shelf, guid, name, Some(parent))
}

pub fn card(guid: &str, name: &str, parent: &str) -> InventoryEntity {
    device(InventoryKind::Card, guid, name, Some(parent))
}

pub fn port(guid: &str, name: &str, parent: &str) -> InventoryEntity {
    device(InventoryKind::Port, guid, name, Some(parent))
}

pub fn power_supply(guid: &str, name: &str, parent: &str) -> InventoryEntity {
    device(InventoryKind::PowerSupply, guid, name, Some(parent))
}

pub fn fan(guid: &str, name: &str, parent: &str) -> InventoryEntity {
    device(InventoryKind::Fan, guid, name, Some(parent))
}

/// A generated inventory where every parent reference resolves and every card
/// and port name carries a numeric position token.
#[derive(Debug, Clone)]
pub struct Topology {
    pub sites: Vec<Site>,
    pub devices: Vec<(InventoryKind, Vec<InventoryEntity>)>,
}

#[derive(Debug, Clone)]
struct ShelfShape {
    /// Port count of each card.
    cards: Vec<usize>,
    power_supplies: usize,
    fans: usize,
}

fn shelf_shape() -> impl Strategy<Value = ShelfShape> {
    (vec(0..4usize, 0..4), 0..2usize, 0..2usize).prop_map(|(cards, power_supplies, fans)| {
        ShelfShape {
            cards,
            power_supplies,
            fans,
        }
    })
}

#[derive(Debug, Clone)]
struct NodeShape {
    site: Option<usize>,
    shelves: Vec<ShelfShape>,
}

fn node_shape() -> impl Strategy<Value = NodeShape> {
    (prop::option::of(0..3usize), vec(shelf_shape(), 0..3))
        .prop_map(|(site, shelves)| NodeShape { site, shelves })
}

fn build_topology(site_count: usize, coords: &[(i32, i32)], nodes: &[NodeShape]) -> Topology {
    let sites = coords
        .iter()
        .take(site_count)
        .enumerate()
        .map(|(i, &(lat, lon))| site(&format!("site-{i}"), &format!("DC{i}"), lat.into(), lon.into()))
        .collect::<Vec<_>>();

    let mut top_nodes = Vec::new();
    let mut shelves = Vec::new();
    let mut cards = Vec::new();
    let mut ports = Vec::new();
    let mut power_supplies = Vec::new();
    let mut fans = Vec::new();

    for (n, shape) in nodes.iter().enumerate() {
        let node = format!("node{n}");
        let site_guid = shape
            .site
            .filter(|&s| s < sites.len())
            .map(|s| format!("site-{s}"));
        top_nodes.push(top_node(&node, &node, site_guid.as_deref()));

        for (s, shelf_shape) in shape.shelves.iter().enumerate() {
            let shelf_name = format!("{node}shelf{s}");
            shelves.push(shelf(&shelf_name, &shelf_name, &node));

            for (c, &port_count) in shelf_shape.cards.iter().enumerate() {
                let card_guid = format!("{shelf_name}card{c}");
                cards.push(card(&card_guid, &format!("{shelf_name}-{c}"), &shelf_name));

                for p in 0..port_count {
                    let port_guid = format!("{card_guid}port{p}");
                    ports.push(port(&port_guid, &format!("{card_guid}-p-{p}"), &card_guid));
                }
            }
            for p in 0..shelf_shape.power_supplies {
                let name = format!("{shelf_name}psu{p}");
                power_supplies.push(power_supply(&name, &name, &shelf_name));
            }
            for f in 0..shelf_shape.fans {
                let name = format!("{shelf_name}fan{f}");
                fans.push(fan(&name, &name, &shelf_name));
            }
        }
    }

    Topology {
        sites,
        devices: vec![
            (InventoryKind::TopNode, top_nodes),
            (InventoryKind::PowerSupply, power_supplies),
            (InventoryKind::Fan, fans),
            (InventoryKind::Shelf, shelves),
            (InventoryKind::Card, cards),
            (InventoryKind::Port, ports),
        ],
    }
}

/// Generates a well-formed [`Topology`] whose collections arrive in shuffled
/// order, so siblings only come out right if they are sorted.
pub fn arb_topology() -> impl Strategy<Value = Topology> {
    (0..4usize, vec((-90..90i32, -180..180i32), 3), vec(node_shape(), 1..4))
        .prop_map(|(site_count, coords, nodes)| build_topology(site_count, &coords, &nodes))
        .prop_flat_map(|topology| {
            let shuffled = topology
                .devices
                .into_iter()
                .map(|(kind, devices)| Just(devices).prop_shuffle().prop_map(move |d| (kind, d)))
                .collect::<Vec<_>>();
            (Just(topology.sites), shuffled)
        })
        .prop_map(|(sites, devices)| Topology { sites, devices })
}

/// This should only be used to get rid of a little boilerplate inside `proptest` macros since it
/// doesn't support the `#[tokio::test]` attribute macro.
#[macro_export]
macro_rules! block_on_runtime {
    ($($block:tt)+) => {{
        let runtime = ::tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
        runtime.block_on(async { $($block)+ })
    }};
}
