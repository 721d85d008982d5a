//! The surveyor: per-node potential corps and ROI scoring.
//!
//! For every node the surveyor enumerates the corps that could profitably
//! operate there -- mining per source, upgrading on an owned controller,
//! spawning per spawn, hauling toward sinks in neighboring nodes -- and
//! aggregates them into a `score` (current value, distance-penalized) and
//! an `expansion_score` (value if we claimed the room, including the
//! discounted value of sources reachable from adjacent nodes).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use outpost_types::{
    CorpKind, Node, NodeId, NodeRoi, PotentialCorp, ResourceKind, RoomName, CARRY_CAPACITY,
    CREEP_LIFE_TIME, HARVEST_POWER,
};

use crate::registry::NodeRegistry;

/// Hop distance assigned to nodes unreachable from any owned node.
const UNREACHABLE_HOPS: u32 = 20;

/// Tuning knobs for ROI scoring. Defaults follow the controller's standing
/// policy; the mint value and source-keeper toggle are deliberately
/// configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyConfig {
    /// Credits one unit of energy is worth.
    pub energy_value: f64,
    /// Amortized cost of one WORK part per tick.
    pub work_tick_cost: f64,
    /// Credits minted per upgrade point delivered.
    pub mint_value: f64,
    /// Margin a spawning corp earns over its energy input.
    pub spawn_margin: f64,
    /// Destination premium applied to hauling throughput.
    pub haul_premium: f64,
    /// Minimum estimated ROI for a potential corp to be listed.
    pub min_roi: f64,
    /// Whether source-keeper rooms participate in ROI at all.
    pub include_sk_rooms: bool,
    /// Scale applied to summed corp ROI in node scores.
    pub corp_roi_scale: f64,
    /// Openness bonus per point of peak height.
    pub openness_bonus: f64,
    /// Flat bonus for owned nodes.
    pub owned_bonus: f64,
    /// Per-hop logistics decay for unowned nodes.
    pub distance_decay: f64,
    /// Distance at which a reachable adjacent source stops adding value.
    pub expansion_range: f64,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            energy_value: 1.0,
            work_tick_cost: 0.1,
            mint_value: 1.0,
            spawn_margin: 0.2,
            haul_premium: 1.2,
            min_roi: 0.1,
            include_sk_rooms: false,
            corp_roi_scale: 50.0,
            openness_bonus: 2.0,
            owned_bonus: 25.0,
            distance_decay: 0.8,
            expansion_range: 150.0,
        }
    }
}

/// Computes and writes ROI records onto registry nodes.
#[derive(Debug, Clone, Default)]
pub struct Surveyor {
    config: SurveyConfig,
}

impl Surveyor {
    /// Create a surveyor with the given tuning.
    pub const fn new(config: SurveyConfig) -> Self {
        Self { config }
    }

    /// Survey every node: write a fresh [`NodeRoi`] onto each.
    pub fn survey(&self, registry: &mut NodeRegistry, owned_rooms: &[RoomName]) {
        let owned_set: BTreeSet<&RoomName> = owned_rooms.iter().collect();
        let owned_nodes: BTreeSet<NodeId> = registry
            .nodes
            .values()
            .filter(|n| Self::node_is_owned(n, &owned_set))
            .map(|n| n.id.clone())
            .collect();
        let hops = hops_from(&owned_nodes, registry);

        let ids: Vec<NodeId> = registry.nodes.keys().cloned().collect();
        for id in ids {
            let Some(node) = registry.nodes.get(&id) else {
                continue;
            };
            let roi = self.survey_node(node, registry, &owned_set, &hops);
            if let Some(node) = registry.nodes.get_mut(&id) {
                node.roi = Some(roi);
            }
        }
        debug!(nodes = registry.nodes.len(), "survey complete");
    }

    fn survey_node(
        &self,
        node: &Node,
        registry: &NodeRegistry,
        owned_rooms: &BTreeSet<&RoomName>,
        hops: &BTreeMap<NodeId, u32>,
    ) -> NodeRoi {
        let is_owned = Self::node_is_owned(node, owned_rooms);
        let distance = if is_owned {
            0
        } else {
            hops.get(&node.id).copied().unwrap_or(UNREACHABLE_HOPS)
        };

        // Source-keeper rooms score nothing unless the policy opts in.
        let keeper = node.rooms.iter().any(RoomName::is_source_keeper);
        if keeper && !self.config.include_sk_rooms {
            return NodeRoi {
                openness: node.peak_height,
                distance_from_owned: distance,
                is_owned,
                source_count: node.source_count(),
                has_controller: node.controller().is_some(),
                ..Default::default()
            };
        }

        let potential_corps = self.potential_corps(node, registry);
        let raw: f64 = potential_corps.iter().map(|c| c.estimated_roi).sum();

        let base = raw * self.config.corp_roi_scale
            + f64::from(node.peak_height) * self.config.openness_bonus;
        let score = if is_owned {
            base + self.config.owned_bonus
        } else {
            base * self.config.distance_decay.powi(distance as i32)
        };
        let expansion_score = base + self.adjacent_source_value(node, registry);

        NodeRoi {
            score,
            expansion_score,
            raw_corp_roi: raw,
            potential_corps,
            openness: node.peak_height,
            distance_from_owned: distance,
            is_owned,
            source_count: node.source_count(),
            has_controller: node.controller().is_some(),
        }
    }

    /// Enumerate candidate corps for a node's resources.
    fn potential_corps(&self, node: &Node, registry: &NodeRegistry) -> Vec<PotentialCorp> {
        let cfg = &self.config;
        let mut out = Vec::new();

        for resource in &node.resources {
            match &resource.kind {
                ResourceKind::Source { capacity, regen_ticks } => {
                    let gross = f64::from(*capacity) / f64::from((*regen_ticks).max(1));
                    let work_parts = (gross / f64::from(HARVEST_POWER)).ceil();
                    let roi = gross * cfg.energy_value - work_parts * cfg.work_tick_cost;
                    out.push(PotentialCorp {
                        kind: CorpKind::Harvest,
                        estimated_roi: roi,
                        resource_id: Some(resource.id.clone()),
                    });

                    // Hauling toward a sink in a neighboring economic node.
                    for (key, &dist) in &registry.economic_edges {
                        let Some(neighbor_id) = key.other(&node.id) else {
                            continue;
                        };
                        let Some(neighbor) = registry.nodes.get(neighbor_id) else {
                            continue;
                        };
                        if !has_sink(neighbor) {
                            continue;
                        }
                        let carry_parts = 2.0 * f64::from(dist) * gross
                            / f64::from(CARRY_CAPACITY);
                        let amortized = carry_parts * 100.0 / f64::from(CREEP_LIFE_TIME);
                        let roi =
                            cfg.haul_premium * gross * cfg.energy_value - amortized;
                        out.push(PotentialCorp {
                            kind: CorpKind::Haul,
                            estimated_roi: roi,
                            resource_id: Some(resource.id.clone()),
                        });
                    }
                }
                ResourceKind::Controller { owned: true, .. } => {
                    // Five WORK parts of steady upgrading.
                    let roi = 5.0 * (cfg.mint_value - cfg.work_tick_cost);
                    out.push(PotentialCorp {
                        kind: CorpKind::Upgrade,
                        estimated_roi: roi,
                        resource_id: Some(resource.id.clone()),
                    });
                }
                ResourceKind::Spawn { energy_capacity } => {
                    let roi = cfg.spawn_margin * f64::from(*energy_capacity) / 1_000.0;
                    out.push(PotentialCorp {
                        kind: CorpKind::Spawning,
                        estimated_roi: roi,
                        resource_id: Some(resource.id.clone()),
                    });
                }
                _ => {}
            }
        }

        out.retain(|c| c.estimated_roi >= cfg.min_roi);
        out
    }

    /// Discounted value of sources in adjacent nodes, for expansion scoring.
    fn adjacent_source_value(&self, node: &Node, registry: &NodeRegistry) -> f64 {
        let cfg = &self.config;
        let mut value = 0.0;
        for (key, &dist) in &registry.economic_edges {
            let Some(neighbor_id) = key.other(&node.id) else {
                continue;
            };
            let Some(neighbor) = registry.nodes.get(neighbor_id) else {
                continue;
            };
            let discount = (1.0 - f64::from(dist) / cfg.expansion_range).max(0.1);
            for resource in &neighbor.resources {
                if let ResourceKind::Source { capacity, regen_ticks } = resource.kind {
                    let gross = f64::from(capacity) / f64::from(regen_ticks.max(1));
                    let work_parts = (gross / f64::from(HARVEST_POWER)).ceil();
                    let roi = gross * cfg.energy_value - work_parts * cfg.work_tick_cost;
                    value += roi * cfg.corp_roi_scale * discount;
                }
            }
        }
        value
    }

    /// A node is owned when its peak sits in an owned room or it claims
    /// our controller. Territory merely touching an owned room does not
    /// count: border nodes straddle rooms routinely.
    fn node_is_owned(node: &Node, owned_rooms: &BTreeSet<&RoomName>) -> bool {
        owned_rooms.contains(&node.peak.room)
            || node
                .resources
                .iter()
                .any(|r| matches!(r.kind, ResourceKind::Controller { owned: true, .. }))
    }
}

/// Whether a node contains anything haulers deliver to.
fn has_sink(node: &Node) -> bool {
    node.resources.iter().any(|r| {
        matches!(
            r.kind,
            ResourceKind::Controller { .. }
                | ResourceKind::Spawn { .. }
                | ResourceKind::Storage
                | ResourceKind::Container
        )
    })
}

/// Hop distances from the owned node set over spatial edges.
fn hops_from(owned: &BTreeSet<NodeId>, registry: &NodeRegistry) -> BTreeMap<NodeId, u32> {
    let mut dist: BTreeMap<NodeId, u32> = BTreeMap::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for id in owned {
        dist.insert(id.clone(), 0);
        queue.push_back(id.clone());
    }
    while let Some(id) = queue.pop_front() {
        let here = dist.get(&id).copied().unwrap_or(0);
        for (neighbor, _) in registry.neighbors(&id) {
            if !dist.contains_key(neighbor) {
                dist.insert(neighbor.clone(), here + 1);
                queue.push_back(neighbor.clone());
            }
        }
    }
    dist
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{EdgeKey, ResourceRecord, WorldPos};

    use super::*;

    fn source_record(room: &str, x: u8, y: u8, capacity: u32) -> ResourceRecord {
        ResourceRecord::new(
            format!("src-{room}-{x}-{y}").as_str(),
            WorldPos::new(room, x, y),
            ResourceKind::Source {
                capacity,
                regen_ticks: 300,
            },
        )
    }

    fn two_node_registry() -> NodeRegistry {
        let mut registry = NodeRegistry::new();

        let mut home = Node::new(WorldPos::new("W1N1", 25, 25), 5);
        home.rooms.insert("W1N1".into());
        home.territory_size = 81;
        home.resources.push(source_record("W1N1", 10, 10, 1500));
        home.resources.push(ResourceRecord::new(
            "ctl-W1N1",
            WorldPos::new("W1N1", 40, 40),
            ResourceKind::Controller { level: 2, owned: true },
        ));

        let mut frontier = Node::new(WorldPos::new("W2N1", 25, 25), 4);
        frontier.rooms.insert("W2N1".into());
        frontier.territory_size = 60;
        frontier.resources.push(source_record("W2N1", 30, 12, 1500));

        let edge = EdgeKey::new(home.id.clone(), frontier.id.clone());
        registry.spatial_edges.insert(edge.clone(), 60);
        registry.economic_edges.insert(edge, 60);
        registry.nodes.insert(home.id.clone(), home);
        registry.nodes.insert(frontier.id.clone(), frontier);
        registry
    }

    #[test]
    fn owned_node_lists_mining_and_upgrading() {
        let mut registry = two_node_registry();
        Surveyor::default().survey(&mut registry, &["W1N1".into()]);
        let home = registry.nodes.get(&NodeId::from("node-W1N1-25-25")).unwrap();
        let roi = home.roi.as_ref().unwrap();
        assert!(roi.is_owned);
        assert_eq!(roi.distance_from_owned, 0);
        assert!(roi
            .potential_corps
            .iter()
            .any(|c| c.kind == CorpKind::Harvest));
        assert!(roi
            .potential_corps
            .iter()
            .any(|c| c.kind == CorpKind::Upgrade));
        // Owned: corp value scaled, openness bonus, flat owned bonus.
        assert!(roi.score > roi.raw_corp_roi * 50.0);
    }

    #[test]
    fn unowned_node_pays_the_logistics_penalty() {
        let mut registry = two_node_registry();
        Surveyor::default().survey(&mut registry, &["W1N1".into()]);
        let frontier = registry.nodes.get(&NodeId::from("node-W2N1-25-25")).unwrap();
        let roi = frontier.roi.as_ref().unwrap();
        assert!(!roi.is_owned);
        assert_eq!(roi.distance_from_owned, 1);
        let base = roi.raw_corp_roi * 50.0 + 4.0 * 2.0;
        assert!((roi.score - base * 0.8).abs() < 1e-9);
        // Expansion ignores the distance penalty and adds neighbors.
        assert!(roi.expansion_score > roi.score);
    }

    #[test]
    fn frontier_source_sees_a_hauling_opportunity() {
        let mut registry = two_node_registry();
        Surveyor::default().survey(&mut registry, &["W1N1".into()]);
        let frontier = registry.nodes.get(&NodeId::from("node-W2N1-25-25")).unwrap();
        let roi = frontier.roi.as_ref().unwrap();
        // The home node holds a controller sink one edge away.
        assert!(roi.potential_corps.iter().any(|c| c.kind == CorpKind::Haul));
    }

    #[test]
    fn source_keeper_rooms_are_excluded_by_default() {
        let mut registry = NodeRegistry::new();
        let mut node = Node::new(WorldPos::new("W4N5", 25, 25), 6);
        node.rooms.insert("W4N5".into());
        node.resources.push(source_record("W4N5", 10, 10, 3000));
        registry.nodes.insert(node.id.clone(), node);

        Surveyor::default().survey(&mut registry, &[]);
        let roi = registry
            .nodes
            .get(&NodeId::from("node-W4N5-25-25"))
            .unwrap()
            .roi
            .as_ref()
            .unwrap()
            .clone();
        assert!(roi.potential_corps.is_empty());
        assert!(roi.score.abs() < f64::EPSILON);

        // Opting in restores the ROI.
        let surveyor = Surveyor::new(SurveyConfig {
            include_sk_rooms: true,
            ..Default::default()
        });
        surveyor.survey(&mut registry, &[]);
        let roi = registry
            .nodes
            .get(&NodeId::from("node-W4N5-25-25"))
            .unwrap()
            .roi
            .as_ref()
            .unwrap()
            .clone();
        assert!(!roi.potential_corps.is_empty());
    }
}
