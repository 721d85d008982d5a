//! The node registry: the one large mutable structure shared across tick
//! phases.
//!
//! Only the spatial-analysis phase may add or remove nodes; every other
//! phase mutates per-node economic fields (ROI, delivery point) or reads.
//! The registry serializes round-trip-identically: node ids, peak
//! coordinates, claimed resources, and edges all survive persistence.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use outpost_host::Host;
use outpost_types::{
    EdgeKey, Node, NodeId, ResourceKind, ResourceRecord, RoomIntel, RoomName, WorldPos,
    SOURCE_CAPACITY_NEUTRAL,
};

use crate::edges::{economic_edges, spatial_edges, ECONOMIC_EDGE_MAX_DISTANCE,
    ECONOMIC_NEIGHBOR_CAP};
use crate::peaks::{detect_peaks, filter_peaks, Peak};
use crate::territory::partition;
use crate::transform::{OpennessTransform, NEIGHBORS8};

// ---------------------------------------------------------------------------
// Analysis bundle
// ---------------------------------------------------------------------------

/// The output of one complete spatial analysis over an extent.
#[derive(Debug, Default)]
pub struct Analysis {
    /// The openness transform the analysis ran on.
    pub transform: OpennessTransform,
    /// Accepted peaks, descending by height.
    pub peaks: Vec<Peak>,
    /// Territory partition keyed by node id.
    pub territories: BTreeMap<NodeId, Vec<WorldPos>>,
}

impl Analysis {
    /// Run the full chain -- transform, peaks, suppression, partition --
    /// over the rooms reachable from `start_rooms`.
    pub fn run(host: &dyn Host, start_rooms: &[RoomName], max_rooms: usize) -> Self {
        let transform = OpennessTransform::compute(host, start_rooms, max_rooms);
        if transform.is_empty() {
            return Self::default();
        }
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        let territories = partition(&transform, &peaks);
        Self {
            transform,
            peaks,
            territories,
        }
    }

    /// Whether the analysis covered nothing.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Nodes, edges, and stored intel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistry {
    /// All nodes keyed by id.
    pub nodes: BTreeMap<NodeId, Node>,
    /// Spatial edges with walking-distance weights.
    pub spatial_edges: BTreeMap<EdgeKey, u32>,
    /// Economic edges with cumulative-distance weights.
    pub economic_edges: BTreeMap<EdgeKey, u32>,
    /// Intel recorded by scouts, keyed by room.
    pub intel: BTreeMap<RoomName, RoomIntel>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            spatial_edges: BTreeMap::new(),
            economic_edges: BTreeMap::new(),
            intel: BTreeMap::new(),
        }
    }

    /// Apply a completed analysis: create, update, and destroy nodes, then
    /// reclaim resources and rebuild both edge sets.
    ///
    /// Nodes keep their ROI record and delivery point across an update as
    /// long as their id (that is, their peak tile) survives.
    pub fn apply_analysis(&mut self, analysis: &Analysis, host: &dyn Host) {
        if analysis.is_empty() {
            return;
        }
        let analyzed: BTreeSet<&RoomName> = analysis.transform.lattice.rooms().collect();
        let new_ids: BTreeSet<&NodeId> = analysis.peaks.iter().map(|p| &p.id).collect();

        // Destroy nodes whose peak sat in the analyzed extent but whose id
        // no longer appears.
        let stale: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| analyzed.contains(&node.peak.room) && !new_ids.contains(&node.id))
            .map(|node| node.id.clone())
            .collect();
        for id in stale {
            info!(node = %id, "node destroyed by reanalysis");
            self.nodes.remove(&id);
        }

        // Create or update surviving nodes.
        for peak in &analysis.peaks {
            let tiles = analysis
                .territories
                .get(&peak.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if tiles.is_empty() {
                warn!(node = %peak.id, "peak owns no territory");
                continue;
            }
            let rooms: BTreeSet<RoomName> = tiles.iter().map(|t| t.room.clone()).collect();
            let entry = self
                .nodes
                .entry(peak.id.clone())
                .or_insert_with(|| Node::new(peak.centroid.clone(), peak.height));
            entry.peak = peak.centroid.clone();
            entry.peak_height = peak.height;
            entry.rooms = rooms;
            entry.territory_size = tiles.len();
            entry.resources.clear();
            // Haulers deliver to the peak until someone places a better
            // point.
            if entry.delivery_point.is_none() {
                entry.delivery_point = Some(peak.centroid.clone());
            }
        }

        self.claim_resources(analysis, host);

        // Merge edges: edges touching the analyzed extent are replaced by
        // this batch's synthesis; edges wholly outside it survive, so
        // incremental batches never clobber each other. Economic edges are
        // cheap and global, so they rebuild from the full graph.
        let batch_edges =
            spatial_edges(&analysis.transform, &analysis.peaks, &analysis.territories);
        let nodes = &self.nodes;
        self.spatial_edges.retain(|key, _| {
            let keep = |id: &NodeId| {
                nodes
                    .get(id)
                    .is_some_and(|n| !analyzed.contains(&n.peak.room))
            };
            keep(&key.a) && keep(&key.b)
        });
        self.spatial_edges.extend(batch_edges);

        let economic: BTreeSet<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.is_economic())
            .map(|n| n.id.clone())
            .collect();
        self.economic_edges = economic_edges(
            &economic,
            &self.spatial_edges,
            ECONOMIC_EDGE_MAX_DISTANCE,
            ECONOMIC_NEIGHBOR_CAP,
        );
    }

    /// Claim every discovered resource for exactly one node.
    ///
    /// Resources on walkable tiles belong to the tile's territory owner. A
    /// resource on a wall tile is claimed through the lexicographically
    /// smallest adjacent territory tile belonging to any node.
    fn claim_resources(&mut self, analysis: &Analysis, host: &dyn Host) {
        let mut owner: BTreeMap<(i32, i32), NodeId> = BTreeMap::new();
        for (id, tiles) in &analysis.territories {
            for tile in tiles {
                if let Some(abs) = analysis.transform.lattice.to_abs(tile) {
                    owner.insert(abs, id.clone());
                }
            }
        }

        let mut discovered: Vec<ResourceRecord> = Vec::new();
        for room in analysis.transform.lattice.rooms() {
            let live = host.room_objects(room);
            if live.is_empty() {
                // No vision: fall back to stored intel with synthetic ids.
                if let Some(intel) = self.intel.get(room) {
                    discovered.extend(intel_records(intel));
                }
            } else {
                discovered.extend(live);
            }
        }

        for record in discovered {
            let Some(abs) = analysis.transform.lattice.to_abs(&record.pos) else {
                continue;
            };
            let claimant = owner.get(&abs).cloned().or_else(|| {
                // Wall tile: the smallest adjacent claimed tile wins.
                NEIGHBORS8
                    .iter()
                    .filter_map(|&(dx, dy)| {
                        let n = (abs.0 + dx, abs.1 + dy);
                        owner.get(&n).map(|id| (n, id.clone()))
                    })
                    .min_by_key(|(n, _)| *n)
                    .map(|(_, id)| id)
            });
            if let Some(id) = claimant {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.resources.push(record);
                }
            }
        }
    }

    /// Record a scout's room intel.
    pub fn record_intel(&mut self, intel: RoomIntel) {
        info!(room = %intel.room, sources = intel.sources.len(), "intel recorded");
        self.intel.insert(intel.room.clone(), intel);
    }

    /// Set a node's hauler delivery point.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownNode`] when the node does not exist.
    ///
    /// [`WorldError::UnknownNode`]: crate::error::WorldError::UnknownNode
    pub fn set_delivery_point(
        &mut self,
        id: &NodeId,
        point: WorldPos,
    ) -> Result<(), crate::error::WorldError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| crate::error::WorldError::UnknownNode(id.clone()))?;
        node.delivery_point = Some(point);
        Ok(())
    }

    /// Nodes that claim a controller we own.
    pub fn owned_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| {
            node.resources
                .iter()
                .any(|r| matches!(r.kind, ResourceKind::Controller { owned: true, .. }))
        })
    }

    /// The node claiming a given resource, if any.
    pub fn node_owning(&self, resource: &outpost_types::ResourceId) -> Option<&Node> {
        self.nodes
            .values()
            .find(|node| node.resources.iter().any(|r| &r.id == resource))
    }

    /// Spatial-edge neighbors of a node.
    pub fn neighbors(&self, id: &NodeId) -> Vec<(&NodeId, u32)> {
        self.spatial_edges
            .iter()
            .filter_map(|(key, &w)| key.other(id).map(|n| (n, w)))
            .collect()
    }
}

/// Rebuild resource records from stored intel, with synthetic ids.
fn intel_records(intel: &RoomIntel) -> Vec<ResourceRecord> {
    let mut out = Vec::new();
    for source in &intel.sources {
        out.push(ResourceRecord::new(
            RoomIntel::synthetic_id(&source.pos),
            source.pos.clone(),
            ResourceKind::Source {
                capacity: source.capacity.max(SOURCE_CAPACITY_NEUTRAL),
                regen_ticks: outpost_types::ENERGY_REGEN_TIME,
            },
        ));
    }
    if let Some(controller) = &intel.controller {
        out.push(ResourceRecord::new(
            RoomIntel::synthetic_id(&controller.pos),
            controller.pos.clone(),
            ResourceKind::Controller {
                level: controller.level,
                owned: false,
            },
        ));
    }
    out
}
