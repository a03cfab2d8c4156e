//! Persistence contracts: the compact wire encoding, save slots, and the
//! local store record shape.
//!
//! The core never touches a clipboard or a key-value store itself; it only
//! defines the encodings and the [`crate::SaveStore`] seam the platform
//! implements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::branch::ArchivedWorldline;
use crate::constants::{
    COMPACT_VERSION, MAX_AUTO_SLOTS, MAX_MANUAL_SLOTS, MIN_VIEWPORT_SIZE, SAVE_VERSION,
};
use crate::state::Direction;
use crate::timeline::{self, GameTimeline};

/// Id of the rolling "current progress" auto slot.
pub const CURRENT_SLOT_ID: i32 = -1;

/// Errors from decoding persisted or pasted payloads.
///
/// Decoding is all-or-nothing: on any error the caller's in-memory game is
/// left untouched.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("malformed save payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Parsed, but not a payload shape we know.
    #[error("unrecognized save payload")]
    Unrecognized,
    /// Versioned payload from an unknown writer.
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u64),
    /// The version-1 format stored whole states instead of a move log;
    /// history cannot be recovered from it.
    #[error("legacy version-1 save: move history is not recoverable")]
    LegacyVersion,
    /// Move string contained a character outside `U/D/L/R`.
    #[error("invalid move character {0:?}")]
    BadMoveChar(char),
    /// Viewport below the supported minimum.
    #[error("viewport size {0} below minimum {MIN_VIEWPORT_SIZE}")]
    ViewportTooSmall(u32),
    /// Cursor outside the move log.
    #[error("cursor {index} outside move log of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Render moves in the one-character-per-move wire form.
#[must_use]
pub fn moves_to_string(moves: &[Direction]) -> String {
    moves.iter().map(|m| m.as_char()).collect()
}

/// Parse a `U/D/L/R` move string.
///
/// # Errors
///
/// Returns [`SaveError::BadMoveChar`] on the first unknown character.
pub fn parse_moves(s: &str) -> Result<Vec<Direction>, SaveError> {
    s.chars()
        .map(|c| Direction::try_from(c).map_err(|()| SaveError::BadMoveChar(c)))
        .collect()
}

/// Shared validation for compact payloads and save slots: viewport floor,
/// move alphabet, cursor bounds, and a marker recomputation by replay.
fn timeline_from_parts(
    viewport_size: u32,
    moves: &str,
    index: Option<usize>,
) -> Result<GameTimeline, SaveError> {
    if viewport_size < MIN_VIEWPORT_SIZE {
        return Err(SaveError::ViewportTooSmall(viewport_size));
    }
    let moves = parse_moves(moves)?;
    let current_index = index.unwrap_or(moves.len());
    if current_index > moves.len() {
        return Err(SaveError::IndexOutOfRange {
            index: current_index,
            len: moves.len(),
        });
    }
    let level_up_indices = timeline::compute_level_up_indices(viewport_size, &moves);
    Ok(GameTimeline {
        viewport_size,
        moves,
        current_index,
        level_up_indices,
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct CompactTimeline {
    v: u64,
    s: u32,
    m: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    i: Option<usize>,
}

/// Encode a timeline in the compact clipboard form:
/// `{"v":2,"s":11,"m":"UDLR...","i":4}`.
#[must_use]
pub fn encode_compact(timeline: &GameTimeline) -> String {
    let compact = CompactTimeline {
        v: COMPACT_VERSION,
        s: timeline.viewport_size,
        m: moves_to_string(&timeline.moves),
        i: Some(timeline.current_index),
    };
    serde_json::to_string(&compact).unwrap_or_default()
}

/// Decode a compact payload into a timeline.
///
/// Level-up markers are always recomputed by replay, never trusted from
/// input. An absent `i` defaults to the tip.
///
/// # Errors
///
/// Rejects wrong versions (the legacy version-1 whole-state format gets its
/// own error since only data loss could migrate it), non-`UDLR` move
/// strings, undersized viewports, and out-of-range cursors.
pub fn decode_compact(json: &str) -> Result<GameTimeline, SaveError> {
    let value: Value = serde_json::from_str(json)?;
    match value.get("v").and_then(Value::as_u64) {
        Some(COMPACT_VERSION) => {}
        Some(v) => return Err(SaveError::UnsupportedVersion(v)),
        None => {
            return Err(match value.get("version").and_then(Value::as_u64) {
                Some(1) => SaveError::LegacyVersion,
                Some(v) => SaveError::UnsupportedVersion(v),
                None => SaveError::Unrecognized,
            });
        }
    }
    let compact: CompactTimeline = serde_json::from_value(value)?;
    timeline_from_parts(compact.s, &compact.m, compact.i)
}

/// Which family a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveSlotType {
    Auto,
    Manual,
}

/// One persisted save: a timeline flattened to its wire fields plus display
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    pub id: i32,
    #[serde(rename = "type")]
    pub slot_type: SaveSlotType,
    pub viewport_size: u32,
    /// One character per move, `U/D/L/R`.
    pub moves: String,
    pub current_index: usize,
    /// Level at save time, for slot listings; the authoritative value comes
    /// from replay on load.
    pub level: u32,
    /// Caller-supplied epoch milliseconds; the core has no clock.
    pub updated_at: i64,
}

impl SaveSlot {
    /// Flatten a timeline into a slot.
    #[must_use]
    pub fn from_timeline(
        id: i32,
        slot_type: SaveSlotType,
        timeline: &GameTimeline,
        level: u32,
        updated_at: i64,
    ) -> Self {
        Self {
            id,
            slot_type,
            viewport_size: timeline.viewport_size,
            moves: moves_to_string(&timeline.moves),
            current_index: timeline.current_index,
            level,
            updated_at,
        }
    }

    /// Wrap an archived worldline as an auto slot.
    #[must_use]
    pub fn from_worldline(id: i32, worldline: &ArchivedWorldline, updated_at: i64) -> Self {
        Self {
            id,
            slot_type: SaveSlotType::Auto,
            viewport_size: worldline.viewport_size,
            moves: worldline.moves.clone(),
            current_index: worldline.current_index,
            level: worldline.level,
            updated_at,
        }
    }

    /// Re-inflate the slot into a playable timeline, revalidating the wire
    /// fields and recomputing level-up markers.
    ///
    /// # Errors
    ///
    /// Same validation failures as [`decode_compact`].
    pub fn to_timeline(&self) -> Result<GameTimeline, SaveError> {
        timeline_from_parts(self.viewport_size, &self.moves, Some(self.current_index))
    }
}

/// The single local-store record, one per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: u64,
    /// Worldline ring, newest first. Fixed length; empty slots are `null`.
    pub auto_slots: Vec<Option<SaveSlot>>,
    pub manual_slots: Vec<Option<SaveSlot>>,
    /// Rolling latest-progress save, refreshed on every auto-save tick.
    pub current_auto_slot: Option<SaveSlot>,
}

impl SaveData {
    /// Empty record at the current version, with the fixed slot counts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: SAVE_VERSION,
            auto_slots: vec![None; MAX_AUTO_SLOTS],
            manual_slots: vec![None; MAX_MANUAL_SLOTS],
            current_auto_slot: None,
        }
    }

    /// Write a manual slot in place. Returns false for ids outside the
    /// fixed slot range. Auto slots never accept manual writes.
    pub fn save_manual_slot(
        &mut self,
        slot_id: i32,
        timeline: &GameTimeline,
        level: u32,
        updated_at: i64,
    ) -> bool {
        let Ok(idx) = usize::try_from(slot_id) else {
            return false;
        };
        if idx >= self.manual_slots.len() {
            return false;
        }
        self.manual_slots[idx] = Some(SaveSlot::from_timeline(
            slot_id,
            SaveSlotType::Manual,
            timeline,
            level,
            updated_at,
        ));
        true
    }

    /// Clear a slot. Returns whether anything was deleted.
    pub fn delete_slot(&mut self, slot_id: i32, slot_type: SaveSlotType) -> bool {
        let Ok(idx) = usize::try_from(slot_id) else {
            return false;
        };
        let slots = match slot_type {
            SaveSlotType::Auto => &mut self.auto_slots,
            SaveSlotType::Manual => &mut self.manual_slots,
        };
        match slots.get_mut(idx) {
            Some(entry) => entry.take().is_some(),
            None => false,
        }
    }

    /// Refresh the rolling current-progress slot.
    pub fn set_current_auto(&mut self, timeline: &GameTimeline, level: u32, updated_at: i64) {
        self.current_auto_slot = Some(SaveSlot::from_timeline(
            CURRENT_SLOT_ID,
            SaveSlotType::Auto,
            timeline,
            level,
            updated_at,
        ));
    }

    /// Push an abandoned worldline into the auto-slot ring: entries shift
    /// down one position and are re-numbered, the oldest falls off the end.
    pub fn push_worldline_slot(&mut self, worldline: &ArchivedWorldline, updated_at: i64) {
        for i in (1..self.auto_slots.len()).rev() {
            let mut shifted = self.auto_slots[i - 1].take();
            if let Some(slot) = shifted.as_mut() {
                slot.id = i32::try_from(i).unwrap_or(slot.id);
            }
            self.auto_slots[i] = shifted;
        }
        if let Some(first) = self.auto_slots.first_mut() {
            *first = Some(SaveSlot::from_worldline(0, worldline, updated_at));
        }
    }

    /// Look up a slot; id -1 with the auto family means the current slot.
    #[must_use]
    pub fn slot(&self, slot_id: i32, slot_type: SaveSlotType) -> Option<&SaveSlot> {
        if slot_type == SaveSlotType::Auto && slot_id == CURRENT_SLOT_ID {
            return self.current_auto_slot.as_ref();
        }
        let slots = match slot_type {
            SaveSlotType::Auto => &self.auto_slots,
            SaveSlotType::Manual => &self.manual_slots,
        };
        slots.get(usize::try_from(slot_id).ok()?)?.as_ref()
    }

    /// Decode a persisted record, rejecting unknown versions.
    ///
    /// # Errors
    ///
    /// Same version policy as [`decode_compact`].
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let value: Value = serde_json::from_str(json)?;
        match value.get("version").and_then(Value::as_u64) {
            Some(SAVE_VERSION) => Ok(serde_json::from_value(value)?),
            Some(1) => Err(SaveError::LegacyVersion),
            Some(v) => Err(SaveError::UnsupportedVersion(v)),
            None => Err(SaveError::Unrecognized),
        }
    }

    /// Encode for the key-value store.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for SaveData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction::{Left, Right};
    use crate::state::GameState;

    fn leveled_timeline() -> GameTimeline {
        let mut timeline = GameTimeline::new(11);
        let mut state = GameState::new(11);
        for mv in [Right, Left, Right, Right, Right] {
            let outcome = timeline.append(mv, &state).unwrap();
            timeline = outcome.timeline;
            state = outcome.step.state;
        }
        timeline
    }

    #[test]
    fn compact_encoding_round_trips() {
        let timeline = leveled_timeline().seek(3);
        let json = encode_compact(&timeline);
        let decoded = decode_compact(&json).unwrap();
        assert_eq!(decoded, timeline);
    }

    #[test]
    fn compact_index_defaults_to_tip() {
        let decoded = decode_compact(r#"{"v":2,"s":11,"m":"RL"}"#).unwrap();
        assert_eq!(decoded.current_index, 2);
        assert_eq!(decoded.level_up_indices, vec![0, 2]);
    }

    #[test]
    fn compact_markers_are_recomputed_not_trusted() {
        let decoded = decode_compact(r#"{"v":2,"s":11,"m":"RLRRR","i":5}"#).unwrap();
        assert_eq!(decoded.level_up_indices, vec![0, 2, 5]);
    }

    #[test]
    fn compact_decode_rejects_malformed_payloads() {
        assert!(matches!(
            decode_compact("not json"),
            Err(SaveError::Malformed(_))
        ));
        assert!(matches!(
            decode_compact(r#"{"v":3,"s":11,"m":""}"#),
            Err(SaveError::UnsupportedVersion(3))
        ));
        assert!(matches!(
            decode_compact(r#"{"version":1,"state":{}}"#),
            Err(SaveError::LegacyVersion)
        ));
        assert!(matches!(
            decode_compact(r#"{"hello":"world"}"#),
            Err(SaveError::Unrecognized)
        ));
        assert!(matches!(
            decode_compact(r#"{"v":2,"s":11,"m":"RLQ"}"#),
            Err(SaveError::BadMoveChar('Q'))
        ));
        assert!(matches!(
            decode_compact(r#"{"v":2,"s":4,"m":"RL"}"#),
            Err(SaveError::ViewportTooSmall(4))
        ));
        assert!(matches!(
            decode_compact(r#"{"v":2,"s":11,"m":"RL","i":3}"#),
            Err(SaveError::IndexOutOfRange { index: 3, len: 2 })
        ));
    }

    #[test]
    fn slot_round_trips_timeline() {
        let timeline = leveled_timeline();
        let slot = SaveSlot::from_timeline(0, SaveSlotType::Manual, &timeline, 3, 1_700_000_000_000);
        assert_eq!(slot.moves, "RLRRR");
        let restored = slot.to_timeline().unwrap();
        assert_eq!(restored, timeline);
    }

    #[test]
    fn save_data_manual_slot_lifecycle() {
        let timeline = leveled_timeline();
        let mut data = SaveData::new();
        assert!(data.save_manual_slot(1, &timeline, 3, 42));
        assert!(!data.save_manual_slot(99, &timeline, 3, 42));
        assert_eq!(data.slot(1, SaveSlotType::Manual).unwrap().level, 3);
        assert!(data.slot(0, SaveSlotType::Manual).is_none());
        assert!(data.delete_slot(1, SaveSlotType::Manual));
        assert!(!data.delete_slot(1, SaveSlotType::Manual));
    }

    #[test]
    fn worldline_ring_shifts_and_renumbers() {
        let mut data = SaveData::new();
        for level in 1..=4u32 {
            let worldline = ArchivedWorldline {
                viewport_size: 11,
                moves: "RL".to_string(),
                current_index: 2,
                level,
            };
            data.push_worldline_slot(&worldline, i64::from(level));
        }
        let levels: Vec<Option<u32>> = data
            .auto_slots
            .iter()
            .map(|s| s.as_ref().map(|slot| slot.level))
            .collect();
        assert_eq!(levels, vec![Some(4), Some(3), Some(2)]);
        let ids: Vec<i32> = data
            .auto_slots
            .iter()
            .flatten()
            .map(|slot| slot.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn current_auto_slot_uses_reserved_id() {
        let timeline = leveled_timeline();
        let mut data = SaveData::new();
        data.set_current_auto(&timeline, 3, 7);
        let slot = data.slot(CURRENT_SLOT_ID, SaveSlotType::Auto).unwrap();
        assert_eq!(slot.id, CURRENT_SLOT_ID);
        assert_eq!(slot.current_index, 5);
    }

    #[test]
    fn save_data_json_round_trips_and_rejects_legacy() {
        let timeline = leveled_timeline();
        let mut data = SaveData::new();
        data.set_current_auto(&timeline, 3, 7);
        let json = data.to_json();
        assert_eq!(SaveData::from_json(&json).unwrap(), data);
        assert!(matches!(
            SaveData::from_json(r#"{"version":1,"slots":[]}"#),
            Err(SaveError::LegacyVersion)
        ));
        assert!(matches!(
            SaveData::from_json(r#"{"version":9}"#),
            Err(SaveError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn persisted_slot_shape_is_camel_case() {
        let timeline = leveled_timeline();
        let slot = SaveSlot::from_timeline(2, SaveSlotType::Auto, &timeline, 3, 99);
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["type"], "auto");
        assert_eq!(json["viewportSize"], 11);
        assert_eq!(json["currentIndex"], 5);
        assert_eq!(json["updatedAt"], 99);
    }
}
