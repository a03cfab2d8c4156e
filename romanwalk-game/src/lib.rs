//! Romanwalk Game Engine
//!
//! Platform-agnostic core logic for the Romanwalk numeral-walk puzzle.
//! This crate provides the full game transition, the replayable move-log
//! timeline (undo/redo/branch/seek with checkpoint caching), and the
//! persistence contracts, without UI or platform-specific dependencies.
//!
//! Every operation is a deterministic pure computation over immutable
//! values: rendering layers hold a snapshot and can never observe a torn
//! update, and the move log is always the single source of truth.

pub mod branch;
pub mod checkpoint;
pub mod constants;
pub mod engine;
pub mod roman;
pub mod session;
pub mod state;
pub mod store;
pub mod timeline;

// Re-export commonly used types
pub use branch::{ArchivedWorldline, BranchArchive, BranchPoint};
pub use checkpoint::CheckpointCache;
pub use engine::{
    GameStatus, MoveSet, StepOutcome, can_step, is_game_over, place_tile, required_char, status,
    step, valid_moves,
};
pub use roman::{ROMAN_CHARS, RomanChar, RomanError, is_roman_char};
pub use session::{GameSession, MoveOutcome};
pub use state::{Direction, GameState, PlacedTile, Position};
pub use store::{
    CURRENT_SLOT_ID, SaveData, SaveError, SaveSlot, SaveSlotType, decode_compact, encode_compact,
    moves_to_string, parse_moves,
};
pub use timeline::{AppendOutcome, GameTimeline, compute_level_up_indices};

/// Trait for abstracting persistence of the local save record.
/// Platform-specific implementations should provide this.
pub trait SaveStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the persisted record, `None` when nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store is unavailable. Callers are
    /// expected to recover by treating the store as empty
    /// ([`SaveData::default`]); storage failures never reach game logic.
    fn load(&self) -> Result<Option<SaveData>, Self::Error>;

    /// Persist the record, best effort.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails; the game continues unaffected.
    fn save(&self, data: &SaveData) -> Result<(), Self::Error>;
}
