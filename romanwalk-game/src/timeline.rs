//! Append-only move-log timeline: undo/redo/seek, level-up markers, and
//! ground-truth replay.

use serde::{Deserialize, Serialize};

use crate::engine::{self, StepOutcome};
use crate::state::{Direction, GameState};

/// The authoritative replay log.
///
/// The game state is always derivable from a timeline by replaying
/// `moves[0..current_index]` from genesis, which makes the timeline the
/// single source of truth and any held `GameState` a cached view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTimeline {
    pub viewport_size: u32,
    /// Full move history, including any undone suffix past the cursor.
    pub moves: Vec<Direction>,
    /// The logical "now" pointer, in `[0, moves.len()]`.
    pub current_index: usize,
    /// Move counts at which a level-up landed. Ascending, 0 always present.
    pub level_up_indices: Vec<usize>,
}

/// A legal append: the updated timeline plus the step that extended it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    pub timeline: GameTimeline,
    pub step: StepOutcome,
}

impl GameTimeline {
    #[must_use]
    pub fn new(viewport_size: u32) -> Self {
        Self {
            viewport_size,
            moves: Vec::new(),
            current_index: 0,
            level_up_indices: vec![0],
        }
    }

    /// Append a move at the cursor.
    ///
    /// Any redo suffix beyond the cursor is silently discarded; callers
    /// wanting to preserve the abandoned future must detect the fork before
    /// calling this. Level-up markers past the cursor are dropped with it.
    /// Returns `None` (timeline untouched) when the move is illegal.
    #[must_use]
    pub fn append(&self, direction: Direction, current_state: &GameState) -> Option<AppendOutcome> {
        let step = engine::step(current_state, direction)?;
        let mut timeline = self.clone();
        timeline.moves.truncate(self.current_index);
        timeline.moves.push(direction);
        timeline.current_index = self.current_index + 1;
        timeline
            .level_up_indices
            .retain(|&i| i < timeline.current_index);
        if step.leveled_up {
            timeline.level_up_indices.push(timeline.current_index);
        }
        Some(AppendOutcome { timeline, step })
    }

    /// Step the cursor back one move; identity at the floor.
    #[must_use]
    pub fn undo(&self) -> Self {
        if self.current_index == 0 {
            return self.clone();
        }
        Self {
            current_index: self.current_index - 1,
            ..self.clone()
        }
    }

    /// Step the cursor forward one move; identity at the tip.
    #[must_use]
    pub fn redo(&self) -> Self {
        if self.current_index >= self.moves.len() {
            return self.clone();
        }
        Self {
            current_index: self.current_index + 1,
            ..self.clone()
        }
    }

    /// Jump back to the nearest level-up marker before the cursor, or 0.
    #[must_use]
    pub fn strong_undo(&self) -> Self {
        let target = self
            .level_up_indices
            .iter()
            .rev()
            .find(|&&i| i < self.current_index)
            .copied()
            .unwrap_or(0);
        Self {
            current_index: target,
            ..self.clone()
        }
    }

    /// Jump forward to the nearest level-up marker after the cursor, or the
    /// tip when no marker remains.
    #[must_use]
    pub fn strong_redo(&self) -> Self {
        let target = self
            .level_up_indices
            .iter()
            .find(|&&i| i > self.current_index)
            .copied()
            .unwrap_or(self.moves.len());
        Self {
            current_index: target,
            ..self.clone()
        }
    }

    /// Move the cursor to `target`, clamped into the log bounds.
    #[must_use]
    pub fn seek(&self, target: usize) -> Self {
        Self {
            current_index: target.min(self.moves.len()),
            ..self.clone()
        }
    }

    /// Ground truth: replay from genesis up to `index` (clamped to the log
    /// length). Illegal entries in a corrupt log replay as no-ops.
    #[must_use]
    pub fn state_at(&self, index: usize) -> GameState {
        let mut state = GameState::new(self.viewport_size);
        for &mv in &self.moves[..index.min(self.moves.len())] {
            if let Some(outcome) = engine::step(&state, mv) {
                state = outcome.state;
            }
        }
        state
    }

    /// Whether a redo suffix exists beyond the cursor.
    #[must_use]
    pub const fn has_redo_suffix(&self) -> bool {
        self.current_index < self.moves.len()
    }

    /// The recorded move the cursor would replay next, if any.
    #[must_use]
    pub fn pending_redo(&self) -> Option<Direction> {
        self.moves.get(self.current_index).copied()
    }
}

/// Recompute level-up markers by full replay.
///
/// Every deserialization path uses this; markers are never trusted from
/// input.
#[must_use]
pub fn compute_level_up_indices(viewport_size: u32, moves: &[Direction]) -> Vec<usize> {
    let mut indices = vec![0];
    let mut state = GameState::new(viewport_size);
    for (i, &mv) in moves.iter().enumerate() {
        if let Some(outcome) = engine::step(&state, mv) {
            if outcome.leveled_up {
                indices.push(i + 1);
            }
            state = outcome.state;
        }
    }
    indices
}
