//! Creep body parts, part costs, and roles.
//!
//! A creep body is an ordered list of parts. The controller only reasons
//! about part counts and total energy cost; the host engine owns everything
//! else about a live creep.

use serde::{Deserialize, Serialize};

/// Energy capacity of one CARRY part.
pub const CARRY_CAPACITY: u32 = 50;

/// Energy harvested per WORK part per tick.
pub const HARVEST_POWER: u32 = 2;

/// Controller progress per WORK part per upgrade tick.
pub const UPGRADE_POWER: u32 = 1;

/// Construction progress per WORK part per build tick.
pub const BUILD_POWER: u32 = 5;

/// Lifetime of a freshly spawned creep, in ticks.
pub const CREEP_LIFE_TIME: u32 = 1500;

/// Hard cap on parts in a single body.
pub const MAX_BODY_PARTS: u32 = 50;

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// A single body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Part {
    /// Offsets movement fatigue.
    Move,
    /// Harvests, builds, upgrades.
    Work,
    /// Stores energy in transit.
    Carry,
    /// Claims or reserves controllers.
    Claim,
}

impl Part {
    /// Energy cost of spawning this part.
    pub const fn cost(self) -> u32 {
        match self {
            Self::Move => 50,
            Self::Work => 100,
            Self::Carry => 50,
            Self::Claim => 600,
        }
    }
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// An ordered list of body parts forming one creep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Body {
    /// The parts in spawn order.
    pub parts: Vec<Part>,
}

impl Body {
    /// Build a body from per-part counts, in WORK, CARRY, MOVE order.
    ///
    /// Spawning WORK and CARRY before MOVE keeps the creep mobile for as
    /// long as possible when damaged from the front of the part list.
    pub fn from_counts(work: u32, carry: u32, moves: u32) -> Self {
        let mut parts =
            Vec::with_capacity(work as usize + carry as usize + moves as usize);
        parts.extend(core::iter::repeat_n(Part::Work, work as usize));
        parts.extend(core::iter::repeat_n(Part::Carry, carry as usize));
        parts.extend(core::iter::repeat_n(Part::Move, moves as usize));
        Self { parts }
    }

    /// Total energy cost of spawning this body.
    pub fn cost(&self) -> u32 {
        self.parts.iter().map(|p| p.cost()).sum()
    }

    /// Number of parts of the given kind.
    pub fn count(&self, part: Part) -> u32 {
        self.parts.iter().filter(|&&p| p == part).count() as u32
    }

    /// Total number of parts.
    pub fn len(&self) -> u32 {
        self.parts.len() as u32
    }

    /// Whether the body has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether the body fits the hard part cap.
    pub fn is_spawnable(&self) -> bool {
        !self.is_empty() && self.len() <= MAX_BODY_PARTS
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The role a creep is spawned for. Roles select the external micro
/// controller that drives the creep; the core only tracks assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreepRole {
    /// Parks at a source and harvests.
    Miner,
    /// Moves energy from sources to sinks.
    Hauler,
    /// Feeds the controller.
    Upgrader,
    /// Works construction sites.
    Builder,
    /// Crosses room boundaries and records intel.
    Scout,
    /// General-purpose bootstrap creep: mines and hauls.
    Jack,
}

impl CreepRole {
    /// Stable lowercase name used in creep names and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Miner => "miner",
            Self::Hauler => "hauler",
            Self::Upgrader => "upgrader",
            Self::Builder => "builder",
            Self::Scout => "scout",
            Self::Jack => "jack",
        }
    }
}

impl core::fmt::Display for CreepRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_cost_and_counts() {
        let body = Body::from_counts(5, 1, 3);
        assert_eq!(body.count(Part::Work), 5);
        assert_eq!(body.count(Part::Carry), 1);
        assert_eq!(body.count(Part::Move), 3);
        // 5*100 + 1*50 + 3*50
        assert_eq!(body.cost(), 700);
        assert!(body.is_spawnable());
    }

    #[test]
    fn oversized_body_is_not_spawnable() {
        let body = Body::from_counts(20, 20, 20);
        assert!(!body.is_spawnable());
        assert!(!Body::default().is_spawnable());
    }

    #[test]
    fn parts_spawn_work_first() {
        let body = Body::from_counts(1, 1, 1);
        assert_eq!(body.parts, vec![Part::Work, Part::Carry, Part::Move]);
    }
}
