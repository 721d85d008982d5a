//! Mining-mode / carry-size / mover-ratio variants for source→sink edges.
//!
//! A variant is one concrete way to run an edge: how the miner buffers
//! energy (drop, container, link), how many CARRY parts the miner itself
//! carries, and what MOVE:CARRY ratio its haulers are built with. The
//! evaluator in the corps crate enumerates and scores these; this module
//! holds the plain data and the terrain-derived ratio rule.

use serde::{Deserialize, Serialize};

use crate::terrain::ROAD_MOVE_COST;

// ---------------------------------------------------------------------------
// Mining modes
// ---------------------------------------------------------------------------

/// How mined energy is buffered at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MiningMode {
    /// Energy is dropped on the ground and decays until picked up.
    Drop,
    /// Energy accumulates in a container under the miner.
    Container,
    /// Energy is pushed through a link; no hauling leg at all.
    Link,
}

impl MiningMode {
    /// Stable lowercase name used in variant ids.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Container => "container",
            Self::Link => "link",
        }
    }

    /// Whether the mode buffers energy without decay, allowing a 0-carry
    /// harvester.
    pub const fn buffers(self) -> bool {
        matches!(self, Self::Container | Self::Link)
    }
}

impl core::fmt::Display for MiningMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Hauler ratios
// ---------------------------------------------------------------------------

/// Hauler CARRY:MOVE build ratio, chosen from the terrain of the edge so the
/// loaded hauler holds full speed on its slowest stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HaulRatio {
    /// `2:1` -- two CARRY per MOVE; only sufficient on an all-road path.
    RoadHeavy,
    /// `1:1` -- one MOVE per CARRY; full speed on plains.
    Balanced,
    /// `1:2` -- two MOVE per CARRY; needed to hold speed through swamp.
    SwampHeavy,
}

impl HaulRatio {
    /// The ratio label as it appears in variant ids, CARRY:MOVE.
    pub const fn label(self) -> &'static str {
        match self {
            Self::RoadHeavy => "2:1",
            Self::Balanced => "1:1",
            Self::SwampHeavy => "1:2",
        }
    }

    /// MOVE parts required for a given CARRY count.
    pub const fn moves_for(self, carry: u32) -> u32 {
        match self {
            Self::RoadHeavy => carry.div_ceil(2),
            Self::Balanced => carry,
            Self::SwampHeavy => carry * 2,
        }
    }
}

impl core::fmt::Display for HaulRatio {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Terrain profiles
// ---------------------------------------------------------------------------

/// Tile composition of a source→sink path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TerrainProfile {
    /// Tiles carrying a road.
    pub road: u32,
    /// Bare plain tiles.
    pub plain: u32,
    /// Bare swamp tiles.
    pub swamp: u32,
}

impl TerrainProfile {
    /// Create a profile.
    pub const fn new(road: u32, plain: u32, swamp: u32) -> Self {
        Self { road, plain, swamp }
    }

    /// Path length in tiles.
    pub const fn len(&self) -> u32 {
        self.road + self.plain + self.swamp
    }

    /// Whether the path has no tiles.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bare movement cost of the path, road=1, plain=2, swamp=10.
    pub const fn total_cost(&self) -> u32 {
        self.road * ROAD_MOVE_COST + self.plain * 2 + self.swamp * 10
    }

    /// Ratio that holds full speed on the slowest stretch: any swamp forces
    /// `1:2`, an all-road path affords `2:1`, anything else takes `1:1`.
    pub const fn ratio(&self) -> HaulRatio {
        if self.swamp > 0 {
            HaulRatio::SwampHeavy
        } else if self.plain == 0 && self.road > 0 {
            HaulRatio::RoadHeavy
        } else {
            HaulRatio::Balanced
        }
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// What the room and its infrastructure permit on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeConstraints {
    /// Energy capacity available for a single spawn order.
    pub spawn_energy_capacity: u32,
    /// Whether a container may be built at the source.
    pub can_build_container: bool,
    /// Whether a link may be built at the source.
    pub can_build_link: bool,
    /// Per-tick infrastructure amortization the edge may spend.
    pub infrastructure_budget: f64,
    /// Source capacity per regeneration cycle.
    pub source_capacity: u32,
    /// Walking distance from the spawn to the source.
    pub spawn_to_source_distance: u32,
    /// Non-wall tiles adjacent to the source.
    pub mining_spots: u32,
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// A fully scored edge variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeVariant {
    /// Variant id, e.g. `drop-1c-2:1`.
    pub id: String,
    /// How energy is buffered at the source.
    pub mode: MiningMode,
    /// CARRY parts on the harvester itself.
    pub carry_parts: u32,
    /// Hauler build ratio.
    pub ratio: HaulRatio,
    /// Steady-state energy income, `source_capacity / regen_ticks`.
    pub gross_per_tick: f64,
    /// Hauler round trip in ticks.
    pub round_trip_ticks: f64,
    /// Amortized harvester body + travel cost per tick.
    pub harvester_cost: f64,
    /// Amortized hauler fleet cost per tick.
    pub haul_cost: f64,
    /// Energy lost to ground decay per tick (drop mode only).
    pub decay_cost: f64,
    /// Amortized container/link cost per tick.
    pub infrastructure_cost: f64,
    /// Haulers required to keep up with gross income.
    pub haulers_needed: u32,
    /// CARRY parts per hauler.
    pub hauler_carry_parts: u32,
    /// Mining spots the variant occupies.
    pub mining_spots: u32,
    /// `net / gross`.
    pub efficiency: f64,
}

impl EdgeVariant {
    /// Compose the canonical variant id.
    pub fn compose_id(mode: MiningMode, carry_parts: u32, ratio: HaulRatio) -> String {
        format!("{}-{}c-{}", mode, carry_parts, ratio)
    }

    /// Net energy per tick after all amortized costs.
    pub fn net_per_tick(&self) -> f64 {
        self.gross_per_tick
            - self.harvester_cost
            - self.haul_cost
            - self.decay_cost
            - self.infrastructure_cost
    }
}
