//! Abandoned-worldline bookkeeping: tip snapshots and the recovery ring.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::WORLDLINE_CAPACITY;
use crate::state::{Direction, GameState};
use crate::timeline::{self, GameTimeline};

/// Snapshot of the timeline tip taken the first time the cursor leaves it.
///
/// Held by the session until the player either catches back up (cleared,
/// nothing was lost) or genuinely forks (archived before the append
/// truncates the suffix). Only the oldest unresolved divergence is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchPoint {
    pub timeline: GameTimeline,
    pub state: GameState,
}

/// Compact record of an abandoned future: the full move log plus the level
/// at the moment of abandonment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedWorldline {
    pub viewport_size: u32,
    /// One character per move, `U/D/L/R`.
    pub moves: String,
    pub current_index: usize,
    pub level: u32,
}

impl ArchivedWorldline {
    /// Collapse a branch point into its archivable form.
    #[must_use]
    pub fn from_branch_point(point: &BranchPoint) -> Self {
        Self {
            viewport_size: point.timeline.viewport_size,
            moves: point.timeline.moves.iter().map(|m| m.as_char()).collect(),
            current_index: point.timeline.current_index,
            level: point.state.level,
        }
    }

    /// Re-inflate into a playable timeline. Level-up markers are recomputed
    /// by replay; unknown move characters are dropped.
    #[must_use]
    pub fn to_timeline(&self) -> GameTimeline {
        let moves: Vec<Direction> = self
            .moves
            .chars()
            .filter_map(|c| Direction::try_from(c).ok())
            .collect();
        let level_up_indices = timeline::compute_level_up_indices(self.viewport_size, &moves);
        GameTimeline {
            viewport_size: self.viewport_size,
            current_index: self.current_index.min(moves.len()),
            moves,
            level_up_indices,
        }
    }
}

/// Fixed-capacity ring of the most recently abandoned worldlines, newest
/// first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchArchive {
    entries: VecDeque<ArchivedWorldline>,
}

impl BranchArchive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the newest abandoned worldline; the oldest beyond capacity is
    /// dropped.
    pub fn push(&mut self, worldline: ArchivedWorldline) {
        self.entries.push_front(worldline);
        self.entries.truncate(WORLDLINE_CAPACITY);
    }

    /// Archived worldlines, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &ArchivedWorldline> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ArchivedWorldline> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction::{Left, Right};

    fn worldline(level: u32) -> ArchivedWorldline {
        ArchivedWorldline {
            viewport_size: 11,
            moves: "RL".to_string(),
            current_index: 2,
            level,
        }
    }

    #[test]
    fn ring_keeps_newest_three() {
        let mut archive = BranchArchive::new();
        for level in 1..=5 {
            archive.push(worldline(level));
        }
        assert_eq!(archive.len(), WORLDLINE_CAPACITY);
        let levels: Vec<u32> = archive.iter().map(|w| w.level).collect();
        assert_eq!(levels, vec![5, 4, 3]);
        assert_eq!(archive.get(0).unwrap().level, 5);
        assert_eq!(archive.get(3), None);
    }

    #[test]
    fn archived_worldline_round_trips_through_timeline() {
        let mut timeline = GameTimeline::new(11);
        let mut state = GameState::new(11);
        for mv in [Right, Left] {
            let outcome = timeline.append(mv, &state).unwrap();
            timeline = outcome.timeline;
            state = outcome.step.state;
        }
        let point = BranchPoint {
            timeline: timeline.clone(),
            state,
        };
        let archived = ArchivedWorldline::from_branch_point(&point);
        assert_eq!(archived.moves, "RL");
        assert_eq!(archived.level, 2);

        let restored = archived.to_timeline();
        assert_eq!(restored, timeline);
    }

    #[test]
    fn unknown_move_characters_are_dropped_on_restore() {
        let archived = ArchivedWorldline {
            viewport_size: 11,
            moves: "R?L".to_string(),
            current_index: 3,
            level: 2,
        };
        let restored = archived.to_timeline();
        assert_eq!(restored.moves, vec![Right, Left]);
        assert_eq!(restored.current_index, 2);
    }
}
