//! Pure transition engine: move legality, automatic tile placement, quest
//! progress, and leveling.
//!
//! Every function here is a deterministic computation over an immutable
//! [`GameState`]. An illegal move is `None` at the call site, never an
//! error and never a panic.

use serde::Serialize;
use smallvec::SmallVec;

use crate::roman::{self, RomanChar};
use crate::state::{Direction, GameState, PlacedTile, Position};

/// Result of a legal step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// State after the move.
    pub state: GameState,
    /// Whether this step completed the quest and advanced the level.
    pub leveled_up: bool,
    /// Numeral auto-written onto a shelter cell, when a charge was spent.
    pub auto_placed: Option<RomanChar>,
}

/// Neighbor set with inline storage for the at-most-four candidates.
pub type MoveSet = SmallVec<[Position; 4]>;

/// Flat status snapshot consumed by presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    pub level: u32,
    pub tile_items: u32,
    pub current_quest: String,
    pub quest_progress: usize,
    pub is_on_quest: bool,
    pub required_char: Option<RomanChar>,
    /// Quest fully walked; only the return to a shelter remains.
    pub is_complete: bool,
    pub is_game_over: bool,
}

fn first_quest_char(state: &GameState) -> Option<RomanChar> {
    state
        .current_quest
        .chars()
        .next()
        .and_then(|c| RomanChar::try_from(c).ok())
}

/// The numeral the player must step on next.
///
/// At rest this is the first character of the current quest. On quest it is
/// the character at `quest_progress`, or `None` once the whole string has
/// been walked and only the return to a shelter remains.
#[must_use]
pub fn required_char(state: &GameState) -> Option<RomanChar> {
    if !state.is_on_quest {
        return first_quest_char(state);
    }
    state
        .current_quest
        .chars()
        .nth(state.quest_progress)
        .and_then(|c| RomanChar::try_from(c).ok())
}

/// Whether the player may step onto `target` from where they stand.
#[must_use]
pub fn can_step(state: &GameState, target: Position) -> bool {
    if !state.player_position.is_adjacent(target) {
        return false;
    }
    let current_tile = state.tile_at(state.player_position);
    let target_tile = state.tile_at(target);

    // At rest in a shelter, before the quest has started.
    if current_tile.is_none() && !state.is_on_quest {
        return match target_tile {
            // Stepping into an empty cell consumes a charge to auto-place.
            None => state.tile_items > 0,
            // Walking onto a pre-existing tile is free, first quest char only.
            Some(tile) => Some(tile) == first_quest_char(state),
        };
    }

    if state.is_on_quest {
        let Some(required) = required_char(state) else {
            // Quest fully walked: only a shelter cell completes it.
            return target_tile.is_none();
        };
        return match target_tile {
            None => state.tile_items > 0,
            Some(tile) => tile == required,
        };
    }

    false
}

/// Up-to-four neighbor cells the player can legally step onto.
#[must_use]
pub fn valid_moves(state: &GameState) -> MoveSet {
    Direction::ALL
        .iter()
        .map(|&dir| state.player_position.neighbor(dir))
        .filter(|&pos| can_step(state, pos))
        .collect()
}

/// Apply one step in `direction`.
///
/// Returns `None` when the move is illegal; the caller's state is untouched
/// and nothing else is reported. One edge shares the same refusal: a
/// level-up past [`roman::MAX_ENCODABLE`] has no quest string to advance
/// to, so the completing step is rejected like any other illegal move.
#[must_use]
pub fn step(state: &GameState, direction: Direction) -> Option<StepOutcome> {
    let target = state.player_position.neighbor(direction);
    if !can_step(state, target) {
        return None;
    }

    let target_tile = state.tile_at(target);
    let required = required_char(state);

    let mut next = state.clone();
    next.player_position = target;
    let mut leveled_up = false;
    let mut auto_placed = None;

    if target_tile.is_none() && !state.is_on_quest && state.tile_items > 0 {
        // Quest opener: write the first numeral into the shelter stepped on.
        if let Some(first) = first_quest_char(state) {
            next.tiles.insert(
                target,
                PlacedTile {
                    char: first,
                    level: state.level,
                },
            );
            next.tile_items = state.tile_items - 1;
            auto_placed = Some(first);
            next.is_on_quest = true;
            next.quest_progress = 1;
        }
    } else if target_tile.is_none()
        && state.is_on_quest
        && state.tile_items > 0
        && let Some(required) = required
    {
        // Mid-quest auto-placement of the required numeral.
        next.tiles.insert(
            target,
            PlacedTile {
                char: required,
                level: state.level,
            },
        );
        next.tile_items = state.tile_items - 1;
        auto_placed = Some(required);
        next.quest_progress = state.quest_progress + 1;
    } else if !state.is_on_quest && target_tile.is_some() {
        // Walking onto an existing tile from rest starts the quest. The
        // non-matching case cannot pass `can_step` today; progress simply
        // stays 0 if it ever does.
        next.is_on_quest = true;
        if target_tile == first_quest_char(state) {
            next.quest_progress = 1;
        }
    } else if state.is_on_quest {
        if let (Some(required), Some(tile)) = (required, target_tile) {
            if tile == required {
                next.quest_progress = state.quest_progress + 1;
            }
        }
        // Quest fully walked and standing on empty ground: level up.
        if next.quest_progress >= next.current_quest.len() && target_tile.is_none() {
            let next_level = state.level + 1;
            let quest = roman::encode(next_level).ok()?;
            next.level = next_level;
            next.tile_items = state.tile_items + 1;
            next.is_on_quest = false;
            next.quest_progress = 0;
            next.current_quest = quest;
            leveled_up = true;
        }
    }

    Some(StepOutcome {
        state: next,
        leveled_up,
        auto_placed,
    })
}

/// Manually write a numeral onto an empty cell, spending one charge.
///
/// Returns `None` when out of charges, when the cell is occupied, or when
/// the cell is under the player.
#[must_use]
pub fn place_tile(state: &GameState, position: Position, tile: RomanChar) -> Option<GameState> {
    if state.tile_items == 0
        || state.tiles.contains_key(&position)
        || position == state.player_position
    {
        return None;
    }
    let mut next = state.clone();
    next.tiles.insert(
        position,
        PlacedTile {
            char: tile,
            level: state.level,
        },
    );
    next.tile_items = state.tile_items - 1;
    Some(next)
}

/// No forward progress is possible.
///
/// On quest any stall is terminal. At rest the stall also requires the last
/// placement charge to be gone, since a charge always opens a new quest.
#[must_use]
pub fn is_game_over(state: &GameState) -> bool {
    if !state.is_on_quest {
        return valid_moves(state).is_empty() && state.tile_items == 0;
    }
    valid_moves(state).is_empty()
}

/// Status snapshot for the presentation layer.
#[must_use]
pub fn status(state: &GameState) -> GameStatus {
    let required = required_char(state);
    GameStatus {
        level: state.level,
        tile_items: state.tile_items,
        current_quest: state.current_quest.clone(),
        quest_progress: state.quest_progress,
        is_on_quest: state.is_on_quest,
        required_char: required,
        is_complete: state.is_on_quest && required.is_none(),
        is_game_over: is_game_over(state),
    }
}
