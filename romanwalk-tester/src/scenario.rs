//! Pure-logic QA scenarios exercising the Romanwalk core end to end.

use anyhow::{Result, ensure};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Duration;

use romanwalk_game::{
    CheckpointCache, Direction, GameSession, SaveData, SaveSlotType, compute_level_up_indices,
    decode_compact, encode_compact, status,
};

/// Shared inputs for one scenario run.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx {
    pub seed: u64,
    /// Length of randomized walks.
    pub moves: usize,
    pub verbose: bool,
}

/// A named, self-contained check.
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(&ScenarioCtx) -> Result<()>,
}

/// Outcome of one scenario/seed pair, shaped for both report formats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// `None` means the run passed.
    pub failure: Option<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "smoke",
            description: "Scripted five-level walk with status and marker checks",
            run: run_smoke,
        },
        Scenario {
            name: "replay",
            description: "Seeded random walk verified against full replay and checkpoints",
            run: run_replay,
        },
        Scenario {
            name: "worldline",
            description: "Undo/diverge/fork cycles exercising the branch archive",
            run: run_worldline,
        },
        Scenario {
            name: "saves",
            description: "Compact and slot round-trips plus malformed-payload rejection",
            run: run_saves,
        },
    ]
}

pub fn find_scenario(name: &str) -> Option<Scenario> {
    all_scenarios()
        .into_iter()
        .find(|scenario| scenario.name == name)
}

/// Scripted walk clearing five quests by reusing previously laid numerals.
const FIVE_LEVEL_WALK: [Direction; 14] = [
    Direction::Right,
    Direction::Left, // level 2
    Direction::Right,
    Direction::Right,
    Direction::Right, // level 3
    Direction::Left,
    Direction::Left,
    Direction::Left,
    Direction::Left, // level 4
    Direction::Right,
    Direction::Up,
    Direction::Up, // level 5
    Direction::Down,
    Direction::Left, // level 6
];

fn run_smoke(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = GameSession::new(11);
    for (i, &mv) in FIVE_LEVEL_WALK.iter().enumerate() {
        let outcome = session.handle_move(mv);
        ensure!(outcome.applied, "scripted move {i} ({mv}) was refused");
        let snapshot = status(session.state());
        ensure!(
            snapshot.current_quest == romanwalk_game::roman::encode(snapshot.level)?,
            "quest string drifted from level at move {i}"
        );
        ensure!(
            snapshot.quest_progress <= snapshot.current_quest.len(),
            "quest progress overran its string at move {i}"
        );
        if ctx.verbose && outcome.leveled_up {
            println!("  level {} at move {}", outcome.level, i + 1);
        }
    }

    let state = session.state();
    ensure!(state.level == 6, "expected level 6, got {}", state.level);
    ensure!(state.tile_items == 2, "expected 2 charges banked");
    ensure!(
        session.timeline().level_up_indices == vec![0, 2, 5, 9, 12, 14],
        "level-up markers off: {:?}",
        session.timeline().level_up_indices
    );
    ensure!(!status(state).is_game_over, "walk ended in a dead position");
    Ok(())
}

/// Drive a seeded random walk through the session, then verify that every
/// index resolves identically through checkpoints and through full replay.
fn run_replay(ctx: &ScenarioCtx) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let mut session = GameSession::new(11);
    let mut applied = 0usize;
    for _ in 0..ctx.moves {
        let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        if session.handle_move(dir).applied {
            applied += 1;
        }
    }
    let timeline = session.timeline().clone();
    ensure!(applied == timeline.moves.len(), "log length drifted");
    if ctx.verbose {
        println!(
            "  {} applied moves, level {}",
            applied,
            session.state().level
        );
    }

    let mut cache = CheckpointCache::new(25);
    cache.rebuild(&timeline);
    for k in 0..=timeline.moves.len() {
        let via_cache = cache.resolve(&timeline, k);
        let via_replay = timeline.state_at(k);
        ensure!(via_cache == via_replay, "checkpoint divergence at index {k}");
    }

    // Cursor bounds are idempotent.
    let floored = timeline.seek(0);
    ensure!(floored.undo() == floored, "undo at floor mutated timeline");
    let capped = timeline.seek(timeline.moves.len());
    ensure!(capped.redo() == capped, "redo at cap mutated timeline");

    // Strong jumps land exactly on recomputed markers.
    let markers = compute_level_up_indices(11, &timeline.moves);
    ensure!(
        markers == timeline.level_up_indices,
        "live markers {:?} != recomputed {markers:?}",
        timeline.level_up_indices
    );
    for window in markers.windows(2) {
        let mid = (window[0] + window[1]).div_ceil(2);
        let jumped = timeline.seek(mid).strong_undo();
        ensure!(
            jumped.current_index == window[0],
            "strong undo from {mid} hit {} not {}",
            jumped.current_index,
            window[0]
        );
    }

    // Undo everything, redo everything: same state as the tip.
    let mut rewound = session.clone();
    while rewound.undo() {}
    ensure!(rewound.state().level == 1, "genesis should be level 1");
    while rewound.redo() {}
    ensure!(
        rewound.state() == session.state(),
        "undo/redo cycle lost the tip state"
    );
    Ok(())
}

fn run_worldline(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = GameSession::new(11);
    for &mv in &FIVE_LEVEL_WALK {
        ensure!(session.handle_move(mv).applied, "walk script broke");
    }

    // Catching back up is lossless.
    let tip = session.timeline().clone();
    session.undo();
    session.undo();
    ensure!(session.branch_point().is_some(), "undo left no branch point");
    let redone = session.handle_move(FIVE_LEVEL_WALK[12]);
    ensure!(redone.redo_equivalent, "recorded move was not treated as redo");
    session.redo();
    ensure!(session.timeline() == &tip, "catch-up altered the log");
    ensure!(session.branch_point().is_none(), "tip left a branch pinned");
    ensure!(session.archive().is_empty(), "nothing should be archived yet");

    // Diverging preserves the worldline.
    session.strong_undo();
    let cursor = session.timeline().current_index;
    let diverging = *Direction::ALL
        .iter()
        .find(|&&d| session.timeline().pending_redo() != Some(d))
        .expect("four directions, at most one recorded");
    let outcome = session.handle_move(diverging);
    ensure!(outcome.forked, "diverging move did not fork");
    ensure!(session.archive().len() == 1, "worldline not archived");
    let archived = session.archive().get(0).expect("archived entry");
    ensure!(
        archived.level == 6 && archived.current_index == 14,
        "archive captured the wrong tip: level {} index {}",
        archived.level,
        archived.current_index
    );
    let restored = archived.to_timeline();
    ensure!(
        restored.state_at(restored.moves.len()).level == 6,
        "restored worldline replays to the wrong level"
    );
    if ctx.verbose {
        println!(
            "  forked at {cursor} with {}, archived worldline of {} moves",
            diverging,
            archived.moves.len()
        );
    }

    // Seeded fork storm: the ring never exceeds capacity and stays newest
    // first.
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    for _ in 0..8 {
        if session.timeline().current_index > 0 {
            session.undo();
        }
        let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        session.handle_move(dir);
    }
    ensure!(
        session.archive().len() <= 3,
        "archive overflowed: {}",
        session.archive().len()
    );
    Ok(())
}

fn run_saves(ctx: &ScenarioCtx) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let mut session = GameSession::new(11);
    for _ in 0..ctx.moves.min(120) {
        let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        session.handle_move(dir);
    }

    // Compact round trip.
    let encoded = session.encode_compact();
    let decoded = decode_compact(&encoded)?;
    ensure!(
        &decoded == session.timeline(),
        "compact encoding did not round-trip"
    );
    ensure!(
        encode_compact(&decoded) == encoded,
        "re-encoding is not stable"
    );

    // Slot round trip through the store record.
    let now = chrono::Utc::now().timestamp_millis();
    let mut data = SaveData::new();
    ensure!(
        data.save_manual_slot(1, session.timeline(), session.state().level, now),
        "manual slot write refused"
    );
    data.set_current_auto(session.timeline(), session.state().level, now);
    let reloaded = SaveData::from_json(&data.to_json())?;
    let slot = reloaded
        .slot(1, SaveSlotType::Manual)
        .expect("manual slot present");
    let restored = slot.to_timeline()?;
    ensure!(
        &restored == session.timeline(),
        "slot did not restore the timeline"
    );
    ensure!(
        GameSession::from_timeline(restored).state() == session.state(),
        "slot restore replays to a different state"
    );

    // Rejection paths leave the session untouched.
    let before = session.timeline().clone();
    for bad in [
        "not json",
        r#"{"v":1,"s":11,"m":""}"#,
        r#"{"version":1,"state":{}}"#,
        r#"{"v":2,"s":11,"m":"RLXD"}"#,
        r#"{"v":2,"s":3,"m":"RL"}"#,
        r#"{"v":2,"s":11,"m":"RL","i":7}"#,
    ] {
        ensure!(
            session.load_compact(bad).is_err(),
            "malformed payload accepted: {bad}"
        );
        ensure!(
            session.timeline() == &before,
            "failed import mutated the session"
        );
    }
    if ctx.verbose {
        println!("  {} byte compact payload", encoded.len());
    }
    Ok(())
}
