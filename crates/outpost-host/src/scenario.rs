//! Scenario files: offline inputs for the efficiency evaluator and the
//! grid host.
//!
//! A scenario declares rooms with their resource nodes, plus a config block
//! of constraints (spawn capacity, buildable infrastructure, terrain
//! profiles of the routes between resources). The same file drives both the
//! edge-variant evaluator in isolation and a full grid-host simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use outpost_types::{
    EdgeConstraints, RoomName, TerrainProfile, SOURCE_CAPACITY_NEUTRAL,
};

use crate::error::HostError;
use crate::grid::GridHost;

/// Default spawn energy capacity when a scenario omits it.
const DEFAULT_SPAWN_CAPACITY: u32 = 300;

/// Default per-tick infrastructure budget when a scenario omits it.
const DEFAULT_INFRA_BUDGET: f64 = 1.0;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A resource node declared in a scenario room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNodeSpec {
    /// Kind: `source`, `controller`, `spawn`, or `mineral`.
    pub r#type: String,
    /// Tile position within the room.
    pub position: PositionSpec,
    /// Source capacity override.
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A tile position in scenario JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSpec {
    /// Local x.
    pub x: u32,
    /// Local y.
    pub y: u32,
}

/// One room and its resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRoom {
    /// The room name, compass-quadrant form.
    pub room_name: RoomName,
    /// Resources placed in the room.
    #[serde(default)]
    pub resource_nodes: Vec<ResourceNodeSpec>,
}

/// Terrain composition of a route, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RouteTerrainSpec {
    /// Road tiles.
    #[serde(default)]
    pub road: u32,
    /// Plain tiles.
    #[serde(default)]
    pub plain: u32,
    /// Swamp tiles.
    #[serde(default)]
    pub swamp: u32,
}

/// A source→sink route with its terrain profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Route origin (a resource id or room name, informational).
    pub from: String,
    /// Route destination, when named.
    #[serde(default)]
    pub to: Option<String>,
    /// Tile composition of the path.
    pub terrain: RouteTerrainSpec,
    /// Whether a container already exists at the origin.
    #[serde(default)]
    pub has_container: bool,
    /// Whether a link already exists at the origin.
    #[serde(default)]
    pub has_link: bool,
}

/// The scenario config block: evaluator constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    /// Free mining spots around the source, when pre-measured.
    #[serde(default)]
    pub mining_spots: Option<u32>,
    /// CARRY parts on the miner, when fixed by the scenario.
    #[serde(default)]
    pub miner_carry: Option<u32>,
    /// Energy cost assumed for a claimer, for expansion scenarios.
    #[serde(default)]
    pub claimer_cost: Option<u32>,
    /// Routes between resources.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    /// Spawn energy capacity for body composition.
    #[serde(default)]
    pub spawn_energy_capacity: Option<u32>,
    /// Whether containers may be built.
    #[serde(default)]
    pub can_build_container: Option<bool>,
    /// Whether links may be built.
    #[serde(default)]
    pub can_build_link: Option<bool>,
    /// Per-tick infrastructure amortization budget.
    #[serde(default)]
    pub infrastructure_budget: Option<f64>,
}

/// A complete scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// What the scenario exercises.
    #[serde(default)]
    pub purpose: String,
    /// Rooms and their resources.
    pub nodes: Vec<ScenarioRoom>,
    /// Evaluator constraints.
    #[serde(default)]
    pub config: ScenarioConfig,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Io`] if the file cannot be read, or
    /// [`HostError::Json`] if the content is not valid scenario JSON.
    pub fn from_file(path: &Path) -> Result<Self, HostError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Parse a scenario from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Json`] if the string is not valid scenario JSON.
    pub fn parse(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Terrain profile of a route.
    pub const fn route_profile(route: &RouteSpec) -> TerrainProfile {
        TerrainProfile::new(route.terrain.road, route.terrain.plain, route.terrain.swamp)
    }

    /// Evaluator constraints for a route, combining the config block with
    /// the route's own infrastructure flags.
    pub fn route_constraints(&self, route: &RouteSpec, source_capacity: u32) -> EdgeConstraints {
        EdgeConstraints {
            spawn_energy_capacity: self
                .config
                .spawn_energy_capacity
                .unwrap_or(DEFAULT_SPAWN_CAPACITY),
            can_build_container: route.has_container
                || self.config.can_build_container.unwrap_or(false),
            can_build_link: route.has_link || self.config.can_build_link.unwrap_or(false),
            infrastructure_budget: self
                .config
                .infrastructure_budget
                .unwrap_or(DEFAULT_INFRA_BUDGET),
            source_capacity,
            spawn_to_source_distance: Self::route_profile(route).len(),
            mining_spots: self.config.mining_spots.unwrap_or(1),
        }
    }

    /// Build a [`GridHost`] with every declared room and resource placed.
    ///
    /// Rooms come up plain with walled borders; exits are carved between
    /// declared lattice neighbors. The first owned controller's room (or
    /// the first room with a spawn) is marked owned.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnparsableRoomName`] for names off the lattice
    /// and [`HostError::PositionOutOfBounds`] for out-of-room resources.
    pub fn build_host(&self) -> Result<GridHost, HostError> {
        let mut host = GridHost::new();
        for room in &self.nodes {
            if room.room_name.grid_coords().is_none() {
                return Err(HostError::UnparsableRoomName {
                    room: room.room_name.clone(),
                });
            }
            host.add_open_room(room.room_name.clone());
        }
        host.carve_exits();
        for room in &self.nodes {
            // A controller is ours only where the scenario also gives us a
            // spawn; other rooms stay neutral.
            let has_spawn = room.resource_nodes.iter().any(|n| n.r#type == "spawn");
            for node in &room.resource_nodes {
                let (x, y) = Self::checked_pos(&room.room_name, node)?;
                match node.r#type.as_str() {
                    "source" => {
                        let capacity = node.capacity.unwrap_or(SOURCE_CAPACITY_NEUTRAL);
                        let _ = host.add_source(room.room_name.clone(), x, y, capacity);
                    }
                    "controller" => {
                        let _ =
                            host.add_controller(room.room_name.clone(), x, y, 1, has_spawn);
                    }
                    "spawn" => {
                        let capacity = self
                            .config
                            .spawn_energy_capacity
                            .unwrap_or(DEFAULT_SPAWN_CAPACITY);
                        let _ = host.add_spawn(room.room_name.clone(), x, y, capacity);
                    }
                    // Minerals and unknown kinds have no grid-host behavior.
                    _ => {}
                }
            }
        }
        Ok(host)
    }

    fn checked_pos(room: &RoomName, node: &ResourceNodeSpec) -> Result<(u8, u8), HostError> {
        let PositionSpec { x, y } = node.position;
        if x >= 50 || y >= 50 {
            return Err(HostError::PositionOutOfBounds {
                room: room.clone(),
                x,
                y,
            });
        }
        Ok((x as u8, y as u8))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SINGLE_SOURCE: &str = r#"{
        "name": "single-source-plain",
        "purpose": "one 1500 source, controller at distance 15, all plain",
        "nodes": [
            {
                "roomName": "W1N1",
                "resourceNodes": [
                    {"type": "source", "position": {"x": 10, "y": 10}, "capacity": 1500},
                    {"type": "controller", "position": {"x": 25, "y": 25}},
                    {"type": "spawn", "position": {"x": 25, "y": 20}}
                ]
            }
        ],
        "config": {
            "routes": [
                {"from": "src", "terrain": {"plain": 15}}
            ],
            "spawnEnergyCapacity": 550,
            "canBuildContainer": false,
            "canBuildLink": false,
            "infrastructureBudget": 0
        }
    }"#;

    #[test]
    fn parses_and_exposes_constraints() {
        let scenario = Scenario::parse(SINGLE_SOURCE).unwrap();
        assert_eq!(scenario.nodes.len(), 1);
        let route = &scenario.config.routes[0];
        let profile = Scenario::route_profile(route);
        assert_eq!(profile.plain, 15);
        assert_eq!(profile.len(), 15);
        let constraints = scenario.route_constraints(route, 1500);
        assert_eq!(constraints.spawn_energy_capacity, 550);
        assert!(!constraints.can_build_container);
        assert_eq!(constraints.spawn_to_source_distance, 15);
    }

    #[test]
    fn builds_a_grid_host() {
        let scenario = Scenario::parse(SINGLE_SOURCE).unwrap();
        let host = scenario.build_host().unwrap();
        use crate::engine::Host;
        let room = RoomName::from("W1N1");
        assert_eq!(host.spawn_energy(&room), (550, 550));
        assert_eq!(host.owned_rooms(), vec![room.clone()]);
        assert_eq!(host.room_objects(&room).len(), 3);
    }

    #[test]
    fn rejects_out_of_bounds_resources() {
        let json = r#"{
            "name": "bad",
            "nodes": [{"roomName": "W1N1", "resourceNodes": [
                {"type": "source", "position": {"x": 80, "y": 10}}
            ]}]
        }"#;
        let scenario = Scenario::parse(json).unwrap();
        assert!(scenario.build_host().is_err());
    }

    #[test]
    fn rejects_off_lattice_room_names() {
        let json = r#"{"name": "bad", "nodes": [{"roomName": "plaza"}]}"#;
        let scenario = Scenario::parse(json).unwrap();
        assert!(scenario.build_host().is_err());
    }
}
