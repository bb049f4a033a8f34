//! Same scenario and seed must replay identically, including across a save

use std::path::Path;

use hex_empires::game::Scenario;
use hex_empires::turn::play_round;
use hex_empires::{EventLog, GameState};

fn duel() -> Scenario {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/duel.toml");
    Scenario::load(&path).unwrap()
}

fn play(game: &mut GameState, log: &mut EventLog, rounds: u32) {
    for _ in 0..rounds {
        log.set_turn(game.turn);
        play_round(game, log);
    }
}

fn run(scenario: &Scenario, rounds: u32) -> (String, String) {
    let mut log = EventLog::new();
    let mut game = scenario.build(&mut log).unwrap();
    play(&mut game, &mut log, rounds);
    (serde_json::to_string(&log).unwrap(), game.to_json().unwrap())
}

#[test]
fn same_seed_same_game() {
    let scenario = duel();
    let (log_a, state_a) = run(&scenario, 40);
    let (log_b, state_b) = run(&scenario, 40);
    assert_eq!(log_a, log_b);
    assert_eq!(state_a, state_b);
}

#[test]
fn different_seed_diverges() {
    let mut scenario = duel();
    let (_, state_a) = run(&scenario, 40);
    scenario.seed += 1;
    let (_, state_b) = run(&scenario, 40);
    assert_ne!(state_a, state_b);
}

#[test]
fn saved_game_continues_identically() {
    let scenario = duel();
    let mut log = EventLog::new();
    let mut game = scenario.build(&mut log).unwrap();
    play(&mut game, &mut log, 15);

    let mut restored = GameState::from_json(&game.to_json().unwrap()).unwrap();
    let mut log_a = EventLog::new();
    let mut log_b = EventLog::new();
    play(&mut game, &mut log_a, 15);
    play(&mut restored, &mut log_b, 15);

    assert_eq!(restored.turn, 30);
    assert_eq!(
        serde_json::to_string(&log_a).unwrap(),
        serde_json::to_string(&log_b).unwrap()
    );
}
