//! Territory nodes, ROI records, and edge keys.
//!
//! A node is a territory plus its peak: the set of tiles a peak won in the
//! BFS partition, the resources claimed inside it, and the economic record
//! the surveyor maintains for it. Nodes are the unit every other subsystem
//! plans against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coords::{RoomName, WorldPos};
use crate::ids::{NodeId, ResourceId};
use crate::resources::ResourceRecord;

// ---------------------------------------------------------------------------
// Corp kinds
// ---------------------------------------------------------------------------

/// The role of a corp. One tagged variant per business unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorpKind {
    /// Sells energy mined at a source.
    Harvest,
    /// Buys energy at sources, sells at sinks.
    Haul,
    /// Buys energy at the controller; mints credits from upgrade points.
    Upgrade,
    /// Sells spawn work-ticks; owns the spawn order queue.
    Spawning,
    /// Buys energy and produces construction progress.
    Construct,
    /// Fallback jack-of-all-trades corp while a room has no mining pair.
    Bootstrap,
    /// Owns a scout creep and writes intel back to the registry.
    Scout,
}

impl CorpKind {
    /// Stable lowercase name used in corp ids and persistence keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvest => "harvest",
            Self::Haul => "haul",
            Self::Upgrade => "upgrade",
            Self::Spawning => "spawning",
            Self::Construct => "construct",
            Self::Bootstrap => "bootstrap",
            Self::Scout => "scout",
        }
    }
}

impl core::fmt::Display for CorpKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ROI records
// ---------------------------------------------------------------------------

/// A corp the surveyor believes could profitably operate on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialCorp {
    /// The corp role.
    pub kind: CorpKind,
    /// Estimated return on investment, in credits per tick.
    pub estimated_roi: f64,
    /// The resource the corp would be built around, when there is one.
    pub resource_id: Option<ResourceId>,
}

/// The surveyor's economic record for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeRoi {
    /// Current value given the distance penalty.
    pub score: f64,
    /// Value if we claimed the room and its reachable adjacent sources.
    pub expansion_score: f64,
    /// Sum of potential-corp ROI before scaling and penalties.
    pub raw_corp_roi: f64,
    /// Corps that clear the inclusion threshold.
    pub potential_corps: Vec<PotentialCorp>,
    /// Peak openness.
    pub openness: u32,
    /// Spatial-graph distance to the nearest owned node, in hops.
    pub distance_from_owned: u32,
    /// Whether the node's room is owned.
    pub is_owned: bool,
    /// Number of sources claimed by the node.
    pub source_count: u32,
    /// Whether the node claims a controller.
    pub has_controller: bool,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A territory node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic id derived from the peak's world coordinate.
    pub id: NodeId,
    /// The peak tile: the plateau centroid.
    pub peak: WorldPos,
    /// Peak openness (inverted distance from walls).
    pub peak_height: u32,
    /// Rooms the territory spans.
    pub rooms: BTreeSet<RoomName>,
    /// Number of tiles in the territory.
    pub territory_size: usize,
    /// Resources claimed by the territory.
    pub resources: Vec<ResourceRecord>,
    /// The surveyor's latest economic record, if surveyed.
    pub roi: Option<NodeRoi>,
    /// Preferred hauler delivery tile, if one has been placed.
    pub delivery_point: Option<WorldPos>,
}

impl Node {
    /// Create a node for a peak with an empty economy.
    pub fn new(peak: WorldPos, peak_height: u32) -> Self {
        Self {
            id: NodeId::for_peak(&peak),
            peak,
            peak_height,
            rooms: BTreeSet::new(),
            territory_size: 0,
            resources: Vec::new(),
            roi: None,
            delivery_point: None,
        }
    }

    /// Whether the node claims any source, controller, or mineral.
    pub fn is_economic(&self) -> bool {
        self.resources.iter().any(|r| r.kind.is_economic())
    }

    /// Number of sources the node claims.
    pub fn source_count(&self) -> u32 {
        self.resources.iter().filter(|r| r.kind.is_source()).count() as u32
    }

    /// The claimed controller record, if any.
    pub fn controller(&self) -> Option<&ResourceRecord> {
        self.resources.iter().find(|r| r.kind.is_controller())
    }
}

// ---------------------------------------------------------------------------
// Edge keys
// ---------------------------------------------------------------------------

/// Canonical undirected pair of node ids, stored once as `min|max`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EdgeKey {
    /// Lexicographically smaller endpoint.
    pub a: NodeId,
    /// Lexicographically larger endpoint.
    pub b: NodeId,
}

impl EdgeKey {
    /// Build the canonical key for an unordered pair.
    pub fn new(x: NodeId, y: NodeId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The endpoint opposite `id`, or `None` if `id` is not an endpoint.
    pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }

    /// Whether `id` is one of the endpoints.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.a == id || &self.b == id
    }
}

impl core::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}|{}", self.a, self.b)
    }
}

impl From<EdgeKey> for String {
    fn from(key: EdgeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for EdgeKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (a, b) = value
            .split_once('|')
            .ok_or_else(|| format!("edge key without separator: {value}"))?;
        if a.is_empty() || b.is_empty() {
            return Err(format!("edge key with empty endpoint: {value}"));
        }
        Ok(Self::new(NodeId::from(a), NodeId::from(b)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_canonical() {
        let ab = EdgeKey::new(NodeId::from("b"), NodeId::from("a"));
        assert_eq!(ab.a.as_str(), "a");
        assert_eq!(ab.b.as_str(), "b");
        assert_eq!(ab.to_string(), "a|b");
        assert_eq!(ab, EdgeKey::new(NodeId::from("a"), NodeId::from("b")));
    }

    #[test]
    fn edge_key_round_trips_as_string() {
        let key = EdgeKey::new(NodeId::from("node-W1N1-3-4"), NodeId::from("node-W1N1-40-9"));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"node-W1N1-3-4|node-W1N1-40-9\"");
        let back: EdgeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn edge_key_other_endpoint() {
        let key = EdgeKey::new(NodeId::from("a"), NodeId::from("b"));
        assert_eq!(key.other(&NodeId::from("a")), Some(&NodeId::from("b")));
        assert_eq!(key.other(&NodeId::from("c")), None);
        assert!(key.touches(&NodeId::from("b")));
    }

    #[test]
    fn node_economy_helpers() {
        use crate::resources::{ResourceKind, ResourceRecord};
        let mut node = Node::new(WorldPos::new("W1N1", 25, 25), 5);
        assert!(!node.is_economic());
        node.resources.push(ResourceRecord::new(
            "src0",
            WorldPos::new("W1N1", 10, 10),
            ResourceKind::Source { capacity: 1500, regen_ticks: 300 },
        ));
        assert!(node.is_economic());
        assert_eq!(node.source_count(), 1);
        assert!(node.controller().is_none());
    }
}
