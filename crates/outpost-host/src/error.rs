//! Error types for host-boundary operations.

use outpost_types::RoomName;

/// Errors raised while loading scenarios or constructing a grid host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Failed to read a scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse scenario JSON.
    #[error("failed to parse scenario JSON: {source}")]
    Json {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// A scenario references a room it never declares.
    #[error("scenario references undeclared room {room}")]
    UnknownRoom {
        /// The missing room.
        room: RoomName,
    },

    /// A room name does not follow the compass-quadrant convention the
    /// grid host needs to lay rooms out on its lattice.
    #[error("room name {room} is not in compass-quadrant form")]
    UnparsableRoomName {
        /// The offending name.
        room: RoomName,
    },

    /// A resource node position falls outside the 50×50 room grid.
    #[error("resource position {x},{y} outside room bounds in {room}")]
    PositionOutOfBounds {
        /// Room the node was declared in.
        room: RoomName,
        /// Declared x.
        x: u32,
        /// Declared y.
        y: u32,
    },
}
