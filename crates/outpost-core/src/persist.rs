//! The persistence codec: deterministic JSON under stable store keys.
//!
//! Key schema (what the next tick expects to read back identically):
//!
//! - `colony` -- accounts plus stored intel
//! - `nodes/<nodeId>` -- one serialized node each
//! - `nodeEdges` -- list of spatial edge keys `a|b`
//! - `economicEdges` -- map from edge key to distance
//! - `market` -- contracts plus the bounded transaction log
//! - `harvestCorps`, `haulingCorps`, `upgradingCorps`, `spawningCorps`,
//!   `constructionCorps`, `bootstrapCorps`, `scoutCorps` -- role-keyed
//!   corp maps
//!
//! Writes are best-effort: a failure costs one tick of progress. Reads
//! that fail schema validation drop the affected registry with a log line
//! and the colony rebuilds it from live state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use outpost_corps::Corp;
use outpost_host::Store;
use outpost_ledger::Accounts;
use outpost_market::Market;
use outpost_types::{CorpId, CorpKind, EdgeKey, Node, NodeId, RoomIntel, RoomName};

use crate::tick::Colony;

/// The `colony` key's payload.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ColonyBlob {
    accounts: Accounts,
    intel: BTreeMap<RoomName, RoomIntel>,
}

/// Corp-map store key per kind.
const fn corp_key(kind: CorpKind) -> &'static str {
    match kind {
        CorpKind::Harvest => "harvestCorps",
        CorpKind::Haul => "haulingCorps",
        CorpKind::Upgrade => "upgradingCorps",
        CorpKind::Spawning => "spawningCorps",
        CorpKind::Construct => "constructionCorps",
        CorpKind::Bootstrap => "bootstrapCorps",
        CorpKind::Scout => "scoutCorps",
    }
}

/// Every corp kind, in persistence order.
const CORP_KINDS: [CorpKind; 7] = [
    CorpKind::Harvest,
    CorpKind::Haul,
    CorpKind::Upgrade,
    CorpKind::Spawning,
    CorpKind::Construct,
    CorpKind::Bootstrap,
    CorpKind::Scout,
];

/// Serialize the colony into the store. Best-effort: serialization
/// failures log and skip the key.
pub fn save(colony: &Colony, store: &mut dyn Store) {
    write_json(
        store,
        "colony",
        &ColonyBlob {
            accounts: colony.accounts.clone(),
            intel: colony.registry.intel.clone(),
        },
    );

    // Nodes live under per-id keys; stale keys are swept.
    let mut live_keys: Vec<String> = Vec::new();
    for (id, node) in &colony.registry.nodes {
        let key = format!("nodes/{id}");
        write_json(store, &key, node);
        live_keys.push(key);
    }
    for key in store.keys_with_prefix("nodes/") {
        if !live_keys.contains(&key) {
            store.delete(&key);
        }
    }

    let edge_list: Vec<String> = colony
        .registry
        .spatial_edges
        .keys()
        .map(ToString::to_string)
        .collect();
    write_json(store, "nodeEdges", &edge_list);
    write_json(store, "economicEdges", &colony.registry.economic_edges);
    write_json(store, "market", &colony.market);

    for kind in CORP_KINDS {
        let map: BTreeMap<&CorpId, &Corp> = colony
            .corps
            .corps
            .iter()
            .filter(|(_, corp)| corp.kind() == kind)
            .collect();
        write_json(store, corp_key(kind), &map);
    }
}

/// Restore the colony from the store. Each registry that fails schema
/// validation is dropped and rebuilt from live state.
pub fn restore(colony: &mut Colony, store: &dyn Store) {
    if let Some(blob) = read_json::<ColonyBlob>(store, "colony") {
        colony.accounts = blob.accounts;
        colony.registry.intel = blob.intel;
    }

    let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
    for key in store.keys_with_prefix("nodes/") {
        if let Some(node) = read_json::<Node>(store, &key) {
            nodes.insert(node.id.clone(), node);
        }
    }
    colony.registry.nodes = nodes;

    if let Some(edges) = read_json::<Vec<String>>(store, "nodeEdges") {
        colony.registry.spatial_edges = edges
            .into_iter()
            .filter_map(|raw| EdgeKey::try_from(raw).ok())
            .map(|key| (key, 0))
            .collect();
    }
    if let Some(edges) = read_json::<BTreeMap<EdgeKey, u32>>(store, "economicEdges") {
        // Economic distances double as spatial weights on restore until
        // the next analysis refreshes both.
        for (key, distance) in &edges {
            if let Some(weight) = colony.registry.spatial_edges.get_mut(key) {
                *weight = *distance;
            }
        }
        colony.registry.economic_edges = edges;
    }
    if let Some(market) = read_json::<Market>(store, "market") {
        colony.market = market;
    }
    for kind in CORP_KINDS {
        if let Some(map) = read_json::<BTreeMap<CorpId, Corp>>(store, corp_key(kind)) {
            for (id, corp) in map {
                colony.corps.corps.insert(id, corp);
            }
        }
    }
    debug!(
        nodes = colony.registry.nodes.len(),
        corps = colony.corps.corps.len(),
        contracts = colony.market.contracts().len(),
        "colony restored from store"
    );
}

fn write_json<T: Serialize>(store: &mut dyn Store, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.write(key, json),
        Err(err) => warn!(key, %err, "persistence write skipped"),
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let raw = store.read(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "persisted state failed validation, dropped");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_host::{GridHost, MemoryStore};

    use crate::config::ControllerConfig;

    use super::*;

    fn ran_colony() -> (Colony, MemoryStore) {
        let mut host = GridHost::new();
        host.add_open_room("W1N1");
        let _ = host.add_spawn("W1N1", 25, 20, 700);
        let _ = host.add_source("W1N1", 10, 10, 1500);
        let _ = host.add_controller("W1N1", 40, 40, 2, true);
        let mut store = MemoryStore::new();
        let mut colony = Colony::new(ControllerConfig::default());
        for _ in 0..6 {
            colony.tick(&mut host, &mut store);
            host.step();
        }
        (colony, store)
    }

    #[test]
    fn a_round_trip_preserves_nodes_corps_and_balances() {
        let (colony, store) = ran_colony();
        let mut fresh = Colony::new(ControllerConfig::default());
        restore(&mut fresh, &store);

        let node_ids: Vec<&NodeId> = colony.registry.nodes.keys().collect();
        let restored_ids: Vec<&NodeId> = fresh.registry.nodes.keys().collect();
        assert_eq!(node_ids, restored_ids);
        for (id, node) in &colony.registry.nodes {
            assert_eq!(fresh.registry.nodes.get(id).map(|n| &n.peak), Some(&node.peak));
        }
        assert_eq!(
            colony.corps.corps.keys().collect::<Vec<_>>(),
            fresh.corps.corps.keys().collect::<Vec<_>>()
        );
        for id in colony.corps.corps.keys() {
            assert_eq!(fresh.accounts.balance(id), colony.accounts.balance(id));
        }
        assert_eq!(
            fresh.market.contracts().len(),
            colony.market.contracts().len()
        );
    }

    #[test]
    fn corrupt_keys_are_dropped_not_fatal() {
        let (_, mut store) = ran_colony();
        store.write("market", "not json".to_owned());
        store.write("nodes/node-W1N1-25-25", "{broken".to_owned());
        let mut fresh = Colony::new(ControllerConfig::default());
        restore(&mut fresh, &store);
        // The corrupt market dropped to empty; corps survived.
        assert_eq!(fresh.market.contracts().len(), 0);
        assert!(!fresh.corps.corps.is_empty());
    }
}
