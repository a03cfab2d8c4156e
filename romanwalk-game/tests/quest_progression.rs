use romanwalk_game::{
    Direction, GameState, Position, RomanChar, is_game_over, required_char, status, step,
    valid_moves,
};

use Direction::{Down, Left, Right, Up};

/// Scripted walk that clears five quests: each level is opened on fresh
/// shelter or walked over numerals laid down by earlier levels.
const FIVE_LEVEL_WALK: [Direction; 14] = [
    Right, Left, // level 2
    Right, Right, Right, // level 3
    Left, Left, Left, Left, // level 4
    Right, Up, Up, // level 5
    Down, Left, // level 6
];

fn apply_walk(moves: &[Direction]) -> GameState {
    let mut state = GameState::new(11);
    for &mv in moves {
        let outcome = step(&state, mv).expect("scripted move must be legal");
        state = outcome.state;
    }
    state
}

#[test]
fn genesis_level_up_round_trip() {
    let state = GameState::new(11);
    assert_eq!(state.current_quest, "I");
    assert_eq!(required_char(&state), Some(RomanChar::I));

    let out = step(&state, Direction::Up).expect("any shelter opens the quest");
    assert_eq!(out.auto_placed, Some(RomanChar::I));
    assert_eq!(out.state.tile_items, 0);
    assert!(out.state.is_on_quest);
    assert_eq!(out.state.quest_progress, 1);

    let back = step(&out.state, Direction::Down).expect("returning home completes");
    assert!(back.leveled_up);
    assert_eq!(back.state.level, 2);
    assert_eq!(back.state.tile_items, 1);
    assert_eq!(back.state.current_quest, "II");
}

#[test]
fn five_levels_by_reusing_laid_numerals() {
    let state = apply_walk(&FIVE_LEVEL_WALK);
    assert_eq!(state.level, 6);
    assert_eq!(state.current_quest, "VI");
    assert_eq!(state.player_position, Position::new(-1, -1));
    // Level 5 cost nothing: its quest was a single pre-existing V.
    assert_eq!(state.tile_items, 2);
    assert!(!state.is_on_quest);
}

#[test]
fn quest_tiles_remember_their_placement_level() {
    let state = apply_walk(&FIVE_LEVEL_WALK[..5]);
    // (1,0) was written during level 1, (2,0) during level 2.
    assert_eq!(
        state.placed_tile_at(Position::new(1, 0)).map(|t| t.level),
        Some(1)
    );
    assert_eq!(
        state.placed_tile_at(Position::new(2, 0)).map(|t| t.level),
        Some(2)
    );
}

#[test]
fn free_walk_over_existing_numerals_spends_no_charge() {
    // Level 3 ("III") starts at (3,0) with one charge and walks back west
    // over two already-placed I tiles before spending it.
    let state = apply_walk(&FIVE_LEVEL_WALK[..5]);
    assert_eq!(state.level, 3);
    let one_in = step(&state, Left).expect("existing numeral is walkable");
    assert_eq!(one_in.auto_placed, None);
    assert_eq!(one_in.state.tile_items, state.tile_items);
    assert_eq!(one_in.state.quest_progress, 1);
}

#[test]
fn wrong_numeral_is_never_walkable() {
    let state = apply_walk(&FIVE_LEVEL_WALK);
    // At rest at (-1,-1), quest "VI". The V at (0,-1) is the required
    // opener; every other legal target must be a shelter.
    let moves = valid_moves(&state);
    assert!(moves.contains(&Position::new(0, -1)), "opener tile walkable");
    for pos in &moves {
        let tile = state.tile_at(*pos);
        assert!(
            tile.is_none() || tile == Some(RomanChar::V),
            "only shelters or the required numeral may be entered, got {tile:?}"
        );
    }
}

#[test]
fn status_tracks_the_whole_loop() {
    let mut state = GameState::new(11);
    assert!(!status(&state).is_on_quest);

    state = step(&state, Right).unwrap().state;
    let mid = status(&state);
    assert!(mid.is_on_quest);
    assert!(mid.is_complete, "single-symbol quest walks in one step");
    assert_eq!(mid.required_char, None);

    state = step(&state, Left).unwrap().state;
    let done = status(&state);
    assert_eq!(done.level, 2);
    assert_eq!(done.current_quest, "II");
    assert!(!done.is_on_quest);
    assert!(!done.is_game_over);
}

#[test]
fn stranded_player_is_terminal() {
    let mut state = GameState::new(11);
    state.tile_items = 0;
    assert!(is_game_over(&state));

    // A single charge revives the game.
    state.tile_items = 1;
    assert!(!is_game_over(&state));
}
