//! Room names, world tiles, and direction/distance helpers.
//!
//! The world is a grid of 50×50 tile rooms joined edge-to-edge. Rooms are
//! addressed by compass-quadrant names (`W3N5`, `E0S12`); tiles by a
//! [`WorldPos`] of room plus local `(x, y)` with `0 <= x, y < 50`. Crossing
//! a room boundary is the host's concern (it describes exits); this module
//! only provides the pure coordinate arithmetic every subsystem shares.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Side length of a room in tiles.
pub const ROOM_SIZE: u8 = 50;

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the four exit directions out of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing y (north edge).
    Top,
    /// Toward increasing x (east edge).
    Right,
    /// Toward increasing y (south edge).
    Bottom,
    /// Toward decreasing x (west edge).
    Left,
}

impl Direction {
    /// All four directions in a fixed iteration order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The direction pointing back the way we came.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Unit offset `(dx, dy)` in room-grid coordinates.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::Right => (1, 0),
            Self::Bottom => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Room names
// ---------------------------------------------------------------------------

/// A room name in compass-quadrant notation, e.g. `W3N5` or `E0S12`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(pub String);

impl RoomName {
    /// Create a room name from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the quadrant notation into absolute room-grid coordinates.
    ///
    /// `E` rooms map to `x >= 0`, `W` rooms to `x < 0` (with `W0` at `-1`);
    /// likewise `S`/`N` for the y axis. Returns `None` for names that do not
    /// follow the convention -- callers that only need opaque adjacency go
    /// through the host's exit map instead.
    pub fn grid_coords(&self) -> Option<(i32, i32)> {
        let s = self.0.as_bytes();
        let (h_sign, rest) = match s.first().copied()? {
            b'E' | b'e' => (false, &s[1..]),
            b'W' | b'w' => (true, &s[1..]),
            _ => return None,
        };
        let split = rest
            .iter()
            .position(|&c| matches!(c, b'N' | b'n' | b'S' | b's'))?;
        let h_num: i32 = core::str::from_utf8(&rest[..split]).ok()?.parse().ok()?;
        let v_sign = !matches!(rest.get(split).copied()?, b'S' | b's');
        let v_num: i32 = core::str::from_utf8(&rest[split + 1..]).ok()?.parse().ok()?;
        let x = if h_sign { -1 - h_num } else { h_num };
        let y = if v_sign { -1 - v_num } else { v_num };
        Some((x, y))
    }

    /// Whether this room sits in the source-keeper ring of its sector.
    ///
    /// The heuristic: both name numbers taken modulo 10 fall in `4..=6`,
    /// excluding the sector center `(5, 5)`. Returns `false` for names that
    /// do not parse.
    pub fn is_source_keeper(&self) -> bool {
        let Some((h, v)) = self.sector_coords() else {
            return false;
        };
        (4..=6).contains(&h) && (4..=6).contains(&v) && !(h == 5 && v == 5)
    }

    /// In-sector coordinates: the name's numeric parts modulo 10.
    fn sector_coords(&self) -> Option<(u32, u32)> {
        let s = self.0.as_bytes();
        if !matches!(s.first().copied()?, b'E' | b'e' | b'W' | b'w') {
            return None;
        }
        let rest = &s[1..];
        let split = rest
            .iter()
            .position(|&c| matches!(c, b'N' | b'n' | b'S' | b's'))?;
        let h_num: u32 = core::str::from_utf8(&rest[..split]).ok()?.parse().ok()?;
        let v_num: u32 = core::str::from_utf8(&rest[split + 1..]).ok()?.parse().ok()?;
        Some((h_num % 10, v_num % 10))
    }
}

impl core::fmt::Display for RoomName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

// ---------------------------------------------------------------------------
// World tiles
// ---------------------------------------------------------------------------

/// A world tile: a room plus local coordinates within it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    /// The room this tile belongs to.
    pub room: RoomName,
    /// Local x coordinate, `0..50`.
    pub x: u8,
    /// Local y coordinate, `0..50`.
    pub y: u8,
}

impl WorldPos {
    /// Create a world tile.
    pub fn new(room: impl Into<RoomName>, x: u8, y: u8) -> Self {
        Self {
            room: room.into(),
            x,
            y,
        }
    }

    /// Chebyshev distance to another tile in the *same* room.
    ///
    /// Returns `None` when the rooms differ; cross-room distances require
    /// the room lattice built during spatial analysis.
    pub fn chebyshev(&self, other: &Self) -> Option<u32> {
        if self.room != other.room {
            return None;
        }
        let dx = (i32::from(self.x) - i32::from(other.x)).unsigned_abs();
        let dy = (i32::from(self.y) - i32::from(other.y)).unsigned_abs();
        Some(dx.max(dy))
    }

    /// The 4-neighborhood of this tile that stays within the same room.
    pub fn room_neighbors4(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(4);
        for (dx, dy) in [(0i32, -1i32), (1, 0), (0, 1), (-1, 0)] {
            if let Some(n) = self.offset_in_room(dx, dy) {
                out.push(n);
            }
        }
        out
    }

    /// The 8-neighborhood of this tile that stays within the same room.
    pub fn room_neighbors8(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(8);
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(n) = self.offset_in_room(dx, dy) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// Offset within the same room, or `None` if it would leave the room.
    pub fn offset_in_room(&self, dx: i32, dy: i32) -> Option<Self> {
        let nx = i32::from(self.x) + dx;
        let ny = i32::from(self.y) + dy;
        if (0..i32::from(ROOM_SIZE)).contains(&nx) && (0..i32::from(ROOM_SIZE)).contains(&ny) {
            Some(Self {
                room: self.room.clone(),
                x: nx as u8,
                y: ny as u8,
            })
        } else {
            None
        }
    }
}

impl core::fmt::Display for WorldPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{},{}", self.room, self.x, self.y)
    }
}

impl NodeId {
    /// Derive the deterministic node id for a peak at the given tile.
    ///
    /// Stable across rebuilds as long as the peak's tile remains the
    /// plateau's centroid.
    pub fn for_peak(peak: &WorldPos) -> Self {
        Self(format!("node-{}-{}-{}", peak.room, peak.x, peak.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_grid_coords() {
        assert_eq!(RoomName::from("E0S0").grid_coords(), Some((0, 0)));
        assert_eq!(RoomName::from("W0N0").grid_coords(), Some((-1, -1)));
        assert_eq!(RoomName::from("E3N5").grid_coords(), Some((3, -6)));
        assert_eq!(RoomName::from("W12S7").grid_coords(), Some((-13, 7)));
        assert_eq!(RoomName::from("plaza").grid_coords(), None);
    }

    #[test]
    fn source_keeper_heuristic() {
        assert!(RoomName::from("W4N5").is_source_keeper());
        assert!(RoomName::from("E6S4").is_source_keeper());
        // The sector center is a portal room, not a keeper room.
        assert!(!RoomName::from("W5N5").is_source_keeper());
        assert!(!RoomName::from("W1N1").is_source_keeper());
        assert!(!RoomName::from("home").is_source_keeper());
    }

    #[test]
    fn chebyshev_same_room_only() {
        let a = WorldPos::new("W1N1", 10, 10);
        let b = WorldPos::new("W1N1", 25, 14);
        let c = WorldPos::new("W1N2", 25, 14);
        assert_eq!(a.chebyshev(&b), Some(15));
        assert_eq!(a.chebyshev(&c), None);
    }

    #[test]
    fn neighbors_clip_at_room_border() {
        let corner = WorldPos::new("W1N1", 0, 0);
        assert_eq!(corner.room_neighbors4().len(), 2);
        assert_eq!(corner.room_neighbors8().len(), 3);
        let center = WorldPos::new("W1N1", 25, 25);
        assert_eq!(center.room_neighbors8().len(), 8);
    }

    #[test]
    fn node_id_is_derived_from_peak() {
        let peak = WorldPos::new("W1N1", 25, 25);
        assert_eq!(NodeId::for_peak(&peak).as_str(), "node-W1N1-25-25");
    }
}
