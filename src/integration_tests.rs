//! End-to-end tests over the shipped card file and deck list.

use crate::card::CardRegistry;
use crate::sim::deck::{parse_deck, parse_deck_file};
use crate::sim::engine::run_game;
use crate::sim::stats;

fn registry() -> CardRegistry {
    CardRegistry::load("cards.json").expect("cards.json should load")
}

#[test]
fn shipped_deck_simulates() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).expect("deck.txt should parse");
    assert_eq!(deck.len(), 60);

    let result = run_game(&deck, 12345, false);
    if let Some(turn) = result.win_turn {
        assert!((1..=20).contains(&turn));
    }
}

#[test]
fn repeat_runs_are_identical() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).unwrap();

    let baseline = run_game(&deck, 54321, false);
    for _ in 0..4 {
        assert_eq!(run_game(&deck, 54321, false), baseline);
    }
}

#[test]
fn different_seeds_play_different_games() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).unwrap();

    let differing = (0u32..20)
        .map(|seed| run_game(&deck, seed, false))
        .collect::<Vec<_>>();
    let first = &differing[0];
    assert!(
        differing.iter().any(|r| r != first),
        "twenty seeds should not all agree"
    );
}

#[test]
fn the_deck_mostly_wins() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).unwrap();

    let results: Vec<_> = (0u32..200).map(|seed| run_game(&deck, seed, false)).collect();
    let summary = stats::summarize(&results);

    assert!(
        summary.wins * 2 > summary.games,
        "a dedicated combo deck should win a majority of goldfish games, won {}/{}",
        summary.wins,
        summary.games
    );
    assert!(
        summary.average_win_turn < 15.0,
        "wins should land well before the ceiling, averaged {:.2}",
        summary.average_win_turn
    );
    for (turn, _) in &summary.win_turns {
        assert!((1..=20).contains(turn));
    }
}

#[test]
fn color_tracking_reports_sane_turns() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).unwrap();

    for seed in 0u32..50 {
        if let Some(turn) = run_game(&deck, seed, false).ubg_turn {
            assert!((1..=20).contains(&turn), "seed {seed} reported turn {turn}");
        }
    }
}

#[test]
fn mill_heavy_deck_survives_an_empty_library() {
    let registry = registry();
    // far more milling than library: the deck runs dry mid-game and draws
    // become no-ops rather than crashes
    let deck = parse_deck(
        "20 Cache Grab\n16 Dredger's Insight\n24 Underground Mortuary\n",
        &registry,
    )
    .unwrap();

    for seed in 0u32..10 {
        let result = run_game(&deck, seed, false);
        if let Some(turn) = result.win_turn {
            assert!((1..=20).contains(&turn));
        }
    }
}

#[test]
fn analyzer_runs_over_the_shipped_deck() {
    let registry = registry();
    let deck = parse_deck_file("deck.txt", &registry).unwrap();

    let snapshots: Vec<_> = (0u32..30)
        .map(|seed| crate::sim::analyze::run_game_to_turn4(&deck, seed))
        .collect();
    let summary = crate::sim::analyze::aggregate(&snapshots);

    let classified: usize = summary.failure_counts.values().sum();
    assert_eq!(classified, 30, "every game lands in exactly one bucket");
}
