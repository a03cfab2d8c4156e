//! Session value binding the timeline, its cached state view, checkpoint
//! snapshots, and worldline bookkeeping into one explicitly threaded
//! context.
//!
//! Everything observable a move can cause is carried in the returned
//! outcome values; the core never invokes presentation callbacks.

use crate::branch::{ArchivedWorldline, BranchArchive, BranchPoint};
use crate::checkpoint::CheckpointCache;
use crate::roman::RomanChar;
use crate::state::{Direction, GameState};
use crate::store::{self, SaveError};
use crate::timeline::GameTimeline;

/// What a single input attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// The cursor advanced (a fresh move or a redo-equivalent one).
    pub applied: bool,
    /// The input matched the recorded redo move and was replayed instead of
    /// appended.
    pub redo_equivalent: bool,
    /// A pending branch point was archived because the input diverged from
    /// the recorded future.
    pub forked: bool,
    pub leveled_up: bool,
    /// Numeral auto-written onto a shelter cell by this move.
    pub auto_placed: Option<RomanChar>,
    /// Level after the attempt, for display.
    pub level: u32,
}

/// One running game.
///
/// The timeline is authoritative; `state` is the cached view at the cursor.
/// The checkpoint cache and branch bookkeeping ride along so every consumer
/// sees one consistent value.
#[derive(Debug, Clone)]
pub struct GameSession {
    timeline: GameTimeline,
    state: GameState,
    cache: CheckpointCache,
    branch_point: Option<BranchPoint>,
    archive: BranchArchive,
}

impl GameSession {
    /// Fresh session at genesis.
    #[must_use]
    pub fn new(viewport_size: u32) -> Self {
        Self {
            timeline: GameTimeline::new(viewport_size),
            state: GameState::new(viewport_size),
            cache: CheckpointCache::default(),
            branch_point: None,
            archive: BranchArchive::new(),
        }
    }

    /// Adopt a deserialized timeline: the state is replayed, checkpoints are
    /// rebuilt, divergence bookkeeping starts clean.
    #[must_use]
    pub fn from_timeline(timeline: GameTimeline) -> Self {
        let mut cache = CheckpointCache::default();
        cache.rebuild(&timeline);
        let state = cache.resolve(&timeline, timeline.current_index);
        Self {
            timeline,
            state,
            cache,
            branch_point: None,
            archive: BranchArchive::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn timeline(&self) -> &GameTimeline {
        &self.timeline
    }

    /// Abandoned worldlines preserved by past forks, newest first.
    #[must_use]
    pub const fn archive(&self) -> &BranchArchive {
        &self.archive
    }

    #[must_use]
    pub const fn branch_point(&self) -> Option<&BranchPoint> {
        self.branch_point.as_ref()
    }

    /// Apply one directional input.
    ///
    /// Replaying the recorded future is a redo, not a new branch. A
    /// differing move while a redo suffix exists is a genuine fork: the
    /// pending branch point is archived before the append truncates the
    /// abandoned suffix.
    pub fn handle_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.timeline.pending_redo() == Some(direction) {
            self.timeline = self.timeline.redo();
            self.state = self.cache.resolve(&self.timeline, self.timeline.current_index);
            self.branch_point = None;
            return MoveOutcome {
                applied: true,
                redo_equivalent: true,
                level: self.state.level,
                ..MoveOutcome::default()
            };
        }

        let mut forked = false;
        if self.timeline.has_redo_suffix() {
            if let Some(point) = self.branch_point.take() {
                self.archive.push(ArchivedWorldline::from_branch_point(&point));
                forked = true;
            }
        }

        let Some(outcome) = self.timeline.append(direction, &self.state) else {
            return MoveOutcome {
                forked,
                level: self.state.level,
                ..MoveOutcome::default()
            };
        };
        self.timeline = outcome.timeline;
        self.state = outcome.step.state;
        self.cache
            .record_if_due(self.timeline.current_index, &self.state);
        MoveOutcome {
            applied: true,
            redo_equivalent: false,
            forked,
            leveled_up: outcome.step.leveled_up,
            auto_placed: outcome.step.auto_placed,
            level: self.state.level,
        }
    }

    /// Move the cursor back one step. Returns whether it moved.
    pub fn undo(&mut self) -> bool {
        let next = self.timeline.undo();
        self.apply_backward(next)
    }

    /// Jump back to the previous level-up boundary.
    pub fn strong_undo(&mut self) -> bool {
        let next = self.timeline.strong_undo();
        self.apply_backward(next)
    }

    /// Move the cursor forward one step.
    pub fn redo(&mut self) -> bool {
        let next = self.timeline.redo();
        self.apply_forward(next)
    }

    /// Jump forward to the next level-up boundary, or the tip.
    pub fn strong_redo(&mut self) -> bool {
        let next = self.timeline.strong_redo();
        self.apply_forward(next)
    }

    /// Jump the cursor to an arbitrary log index (clamped).
    pub fn seek(&mut self, index: usize) -> bool {
        let next = self.timeline.seek(index);
        if next.current_index == self.timeline.current_index {
            return false;
        }
        let was_at_tip = !self.timeline.has_redo_suffix();
        if self.branch_point.is_none() && was_at_tip && next.has_redo_suffix() {
            self.pin_branch_point();
        } else if !next.has_redo_suffix() {
            self.branch_point = None;
        }
        self.state = self.cache.resolve(&next, next.current_index);
        self.timeline = next;
        true
    }

    fn apply_backward(&mut self, next: GameTimeline) -> bool {
        if next.current_index == self.timeline.current_index {
            return false;
        }
        // First departure from the tip pins the branch point.
        if self.branch_point.is_none() && !self.timeline.has_redo_suffix() {
            self.pin_branch_point();
        }
        self.state = self.cache.resolve(&next, next.current_index);
        self.timeline = next;
        true
    }

    fn apply_forward(&mut self, next: GameTimeline) -> bool {
        if next.current_index == self.timeline.current_index {
            return false;
        }
        self.state = self.cache.resolve(&next, next.current_index);
        // Catching back up to the tip resolves the divergence unharmed.
        if !next.has_redo_suffix() {
            self.branch_point = None;
        }
        self.timeline = next;
        true
    }

    fn pin_branch_point(&mut self) {
        self.branch_point = Some(BranchPoint {
            timeline: self.timeline.clone(),
            state: self.state.clone(),
        });
    }

    /// Restart at genesis with the same viewport. Archived worldlines are
    /// already-preserved pasts and survive the reset.
    pub fn reset(&mut self) {
        let viewport = self.timeline.viewport_size;
        self.timeline = GameTimeline::new(viewport);
        self.state = GameState::new(viewport);
        self.cache.clear();
        self.branch_point = None;
    }

    /// Propagate a display-size change; history is untouched.
    pub fn set_viewport_size(&mut self, size: u32) {
        self.timeline.viewport_size = size;
        self.state.viewport_size = size;
    }

    /// Compact wire form of the current timeline.
    #[must_use]
    pub fn encode_compact(&self) -> String {
        store::encode_compact(&self.timeline)
    }

    /// Replace the session's history from a compact payload.
    ///
    /// The checkpoint cache is rebuilt and the pending branch point is
    /// dropped; the worldline archive survives. On error the session is
    /// untouched.
    ///
    /// # Errors
    ///
    /// Any [`SaveError`] from [`store::decode_compact`].
    pub fn load_compact(&mut self, json: &str) -> Result<(), SaveError> {
        let timeline = store::decode_compact(json)?;
        let archive = std::mem::take(&mut self.archive);
        *self = Self::from_timeline(timeline);
        self.archive = archive;
        Ok(())
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_VIEWPORT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction::{Down, Left, Right, Up};

    fn walked_session() -> GameSession {
        let mut session = GameSession::new(11);
        for mv in [Right, Left, Right, Right, Right] {
            assert!(session.handle_move(mv).applied);
        }
        session
    }

    #[test]
    fn moves_advance_and_level() {
        let mut session = GameSession::new(11);
        let opened = session.handle_move(Right);
        assert!(opened.applied);
        assert_eq!(opened.auto_placed, Some(RomanChar::I));
        let closed = session.handle_move(Left);
        assert!(closed.leveled_up);
        assert_eq!(closed.level, 2);
        assert_eq!(session.timeline().current_index, 2);
    }

    #[test]
    fn rejected_move_reports_unapplied() {
        let mut session = GameSession::new(11);
        session.handle_move(Right);
        session.handle_move(Left); // level 2, one charge held
        session.handle_move(Up); // opens "II", spends the charge
        // Mid-quest with no charge left, every neighboring shelter refuses.
        let refused = session.handle_move(Up);
        assert!(!refused.applied);
        assert!(!refused.leveled_up);
        assert_eq!(refused.auto_placed, None);
        assert_eq!(session.timeline().moves.len(), 3);
        assert_eq!(session.timeline().current_index, 3);
    }

    #[test]
    fn undo_redo_track_cursor_and_state() {
        let mut session = walked_session();
        assert_eq!(session.state().level, 3);
        assert!(session.undo());
        assert_eq!(session.timeline().current_index, 4);
        assert_eq!(session.state().level, 2);
        assert!(session.redo());
        assert_eq!(session.state().level, 3);
        // Bounds are idempotent.
        assert!(!session.redo());
        for _ in 0..10 {
            session.undo();
        }
        assert_eq!(session.timeline().current_index, 0);
        assert!(!session.undo());
        assert_eq!(session.state().level, 1);
    }

    #[test]
    fn first_undo_pins_branch_point_once() {
        let mut session = walked_session();
        assert!(session.branch_point().is_none());
        session.undo();
        let pinned = session.branch_point().cloned().unwrap();
        assert_eq!(pinned.timeline.current_index, 5);
        session.undo();
        // Still the original tip snapshot.
        assert_eq!(session.branch_point().unwrap().timeline.current_index, 5);
    }

    #[test]
    fn redo_equivalent_move_clears_branch_point_without_fork() {
        let mut session = walked_session();
        session.undo();
        session.undo();
        // Replay the recorded move "R".
        let outcome = session.handle_move(Right);
        assert!(outcome.applied);
        assert!(outcome.redo_equivalent);
        assert!(!outcome.forked);
        assert!(session.branch_point().is_none());
        assert_eq!(session.timeline().moves.len(), 5);
        assert!(session.archive().is_empty());
    }

    #[test]
    fn diverging_move_archives_the_worldline() {
        let mut session = walked_session();
        session.undo();
        session.undo();
        // Recorded next move is "R"; going Up diverges.
        let outcome = session.handle_move(Up);
        assert!(outcome.forked);
        assert!(session.branch_point().is_none());
        assert_eq!(session.archive().len(), 1);
        let archived = session.archive().get(0).unwrap();
        assert_eq!(archived.moves, "RLRRR");
        assert_eq!(archived.current_index, 5);
        assert_eq!(archived.level, 3);
        // The live log was truncated at the fork.
        assert_eq!(session.timeline().moves.len(), 4);
    }

    #[test]
    fn catching_up_to_tip_clears_branch_point() {
        let mut session = walked_session();
        session.undo();
        session.undo();
        assert!(session.branch_point().is_some());
        session.redo();
        session.redo();
        assert!(session.branch_point().is_none());
        // A later move is a plain append, no fork.
        let outcome = session.handle_move(Left);
        assert!(!outcome.forked);
        assert!(session.archive().is_empty());
    }

    #[test]
    fn strong_jumps_move_between_boundaries() {
        let mut session = walked_session();
        // Markers are [0, 2, 5].
        assert!(session.strong_undo());
        assert_eq!(session.timeline().current_index, 2);
        assert_eq!(session.state().level, 2);
        assert!(session.strong_undo());
        assert_eq!(session.timeline().current_index, 0);
        assert!(!session.strong_undo());
        assert!(session.strong_redo());
        assert_eq!(session.timeline().current_index, 2);
        assert!(session.strong_redo());
        assert_eq!(session.timeline().current_index, 5);
        assert!(!session.strong_redo());
    }

    #[test]
    fn seek_pins_and_clears_branch_point() {
        let mut session = walked_session();
        assert!(session.seek(1));
        assert!(session.branch_point().is_some());
        assert_eq!(session.state().level, 1);
        assert!(session.seek(5));
        assert!(session.branch_point().is_none());
        assert!(!session.seek(5));
    }

    #[test]
    fn reset_preserves_archive() {
        let mut session = walked_session();
        session.undo();
        session.handle_move(Down);
        assert_eq!(session.archive().len(), 1);
        session.reset();
        assert_eq!(session.timeline().moves.len(), 0);
        assert_eq!(session.state().level, 1);
        assert_eq!(session.archive().len(), 1);
        assert!(session.branch_point().is_none());
    }

    #[test]
    fn compact_round_trip_through_session() {
        let mut session = walked_session();
        session.undo();
        let json = session.encode_compact();
        let mut other = GameSession::new(11);
        other.load_compact(&json).unwrap();
        assert_eq!(other.timeline(), session.timeline());
        assert_eq!(other.state(), session.state());
        // Malformed input leaves the session untouched.
        let before = other.timeline().clone();
        assert!(other.load_compact("{\"v\":9}").is_err());
        assert_eq!(other.timeline(), &before);
    }

    #[test]
    fn viewport_change_touches_state_and_timeline() {
        let mut session = walked_session();
        session.set_viewport_size(7);
        assert_eq!(session.state().viewport_size, 7);
        assert_eq!(session.timeline().viewport_size, 7);
    }
}
