//! Centralized tuning constants for the Romanwalk core.
//!
//! Keeping them together ensures that gameplay and persistence behavior can
//! only be adjusted via code changes reviewed in version control, rather
//! than through external assets.

// Board / session tuning ---------------------------------------------------
/// Grid size the presentation layer renders by default (NxN).
pub const DEFAULT_VIEWPORT_SIZE: u32 = 11;
/// Smallest viewport accepted from any deserialized payload.
pub const MIN_VIEWPORT_SIZE: u32 = 5;
/// Level the player starts at.
pub const GENESIS_LEVEL: u32 = 1;
/// Placement charges at game start.
pub const STARTING_TILE_ITEMS: u32 = 1;
/// Highest level with an encodable quest string.
pub const MAX_LEVEL: u32 = crate::roman::MAX_ENCODABLE;

// Timeline tuning ----------------------------------------------------------
/// A checkpoint snapshot is stored every this many applied moves.
pub const CHECKPOINT_INTERVAL: usize = 50;
/// Abandoned worldlines retained in the session archive ring.
pub const WORLDLINE_CAPACITY: usize = 3;

// Persistence --------------------------------------------------------------
/// Auto-save slots in the local store record.
pub const MAX_AUTO_SLOTS: usize = 3;
/// Manual save slots in the local store record.
pub const MAX_MANUAL_SLOTS: usize = 3;
/// Version tag of the persisted local store record.
pub const SAVE_VERSION: u64 = 2;
/// Version tag of the compact clipboard encoding.
pub const COMPACT_VERSION: u64 = 2;
