//! Sparse full-state snapshots bounding the cost of random timeline seeks.

use std::collections::HashMap;

use crate::constants::CHECKPOINT_INTERVAL;
use crate::engine;
use crate::state::GameState;
use crate::timeline::GameTimeline;

/// Memoized states at periodic move-log indices.
///
/// Purely a performance layer: [`CheckpointCache::resolve`] must produce
/// exactly what [`GameTimeline::state_at`] produces for every index.
#[derive(Debug, Clone)]
pub struct CheckpointCache {
    interval: usize,
    states: HashMap<usize, GameState>,
}

impl CheckpointCache {
    #[must_use]
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            states: HashMap::new(),
        }
    }

    /// Snapshot spacing in applied moves.
    #[must_use]
    pub const fn interval(&self) -> usize {
        self.interval
    }

    /// Number of snapshots currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Store a snapshot when `index` lands on the checkpoint interval.
    pub fn record_if_due(&mut self, index: usize, state: &GameState) {
        if index > 0 && index % self.interval == 0 {
            self.states.insert(index, state.clone());
        }
    }

    /// State at `index`, replayed forward from the nearest snapshot at or
    /// before it (genesis when none is cached).
    #[must_use]
    pub fn resolve(&self, timeline: &GameTimeline, index: usize) -> GameState {
        let index = index.min(timeline.moves.len());
        let (start, mut state) = self
            .states
            .iter()
            .filter(|&(&cached, _)| cached <= index)
            .max_by_key(|&(&cached, _)| cached)
            .map_or_else(
                || (0, GameState::new(timeline.viewport_size)),
                |(&cached, snapshot)| (cached, snapshot.clone()),
            );
        for &mv in &timeline.moves[start..index] {
            if let Some(outcome) = engine::step(&state, mv) {
                state = outcome.state;
            }
        }
        state
    }

    /// Drop every snapshot and repopulate by one full replay of `timeline`.
    pub fn rebuild(&mut self, timeline: &GameTimeline) {
        self.states.clear();
        let mut state = GameState::new(timeline.viewport_size);
        for (i, &mv) in timeline.moves.iter().enumerate() {
            if let Some(outcome) = engine::step(&state, mv) {
                state = outcome.state;
            }
            self.record_if_due(i + 1, &state);
        }
    }

    /// Wholesale invalidation. Indices stop meaning anything once the move
    /// log is replaced, so there is no partial flush.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for CheckpointCache {
    fn default() -> Self {
        Self::new(CHECKPOINT_INTERVAL)
    }
}
