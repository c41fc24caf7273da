//! Turn-4 combo availability analysis: across many seeds, why was the
//! chain not ready at the start of turn 4's first main phase?

use std::collections::HashMap;
use std::fmt;

use crate::card::{names, Ability, Card, Color};
use crate::game::mana;
use crate::game::phases;
use crate::game::resolve;
use crate::game::state::{GameState, Phase};
use crate::rng::SimRng;
use crate::sim::engine;
use crate::sim::mulligan;

/// The first blocker found, checked in a fixed order so each game lands in
/// exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    InsufficientMana,
    MissingBlue,
    MissingBlack,
    MissingGreen,
    CopierNotInHand,
    ReanimatorNotBuried,
    NoDamageTrigger,
    ShortOfLethal,
    ComboAvailable,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InsufficientMana => "fewer than 4 mana",
            Self::MissingBlue => "no blue source",
            Self::MissingBlack => "no black source",
            Self::MissingGreen => "no green source",
            Self::CopierNotInHand => "copier not in hand",
            Self::ReanimatorNotBuried => "reanimator not in graveyard",
            Self::NoDamageTrigger => "no damage trigger anywhere useful",
            Self::ShortOfLethal => "chain short of lethal",
            Self::ComboAvailable => "combo available",
        };
        f.write_str(text)
    }
}

/// Everything the classifier needs from one game at the checkpoint.
#[derive(Debug, Clone)]
pub struct TurnFourSnapshot {
    pub primary_failure: FailureReason,
    pub mana_available: u32,
    /// (blue, black, green)
    pub colors: (bool, bool, bool),
}

#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub failure_counts: HashMap<FailureReason, usize>,
    pub average_mana: f64,
    /// Percent of games with each color available, (blue, black, green).
    pub color_rates: (f64, f64, f64),
}

fn classify(
    mana_available: u32,
    colors: (bool, bool, bool),
    copier_in_hand: bool,
    reanimator_buried: bool,
    trigger_available: bool,
    estimated_damage: u32,
    opponent_life: i32,
) -> FailureReason {
    if mana_available < 4 {
        return FailureReason::InsufficientMana;
    }
    let (blue, black, green) = colors;
    if !blue {
        return FailureReason::MissingBlue;
    }
    if !black {
        return FailureReason::MissingBlack;
    }
    if !green {
        return FailureReason::MissingGreen;
    }
    if !copier_in_hand {
        return FailureReason::CopierNotInHand;
    }
    if !reanimator_buried {
        return FailureReason::ReanimatorNotBuried;
    }
    if !trigger_available {
        return FailureReason::NoDamageTrigger;
    }
    if estimated_damage < opponent_life.max(0) as u32 {
        return FailureReason::ShortOfLethal;
    }
    FailureReason::ComboAvailable
}

/// Inspect a game at the start of turn 4's first main phase.
pub fn snapshot(state: &GameState) -> TurnFourSnapshot {
    let lands_fielded = state.battlefield.land_count();

    let mut colors = mana::potential_colors(state);
    // one land drop is still available; credit the best untapped land held
    let mut playable_land = false;
    for card in state.hand.cards() {
        let Some(land) = card.as_land() else { continue };
        if land.enters_tapped(lands_fielded, state.turn) {
            continue;
        }
        playable_land = true;
        colors = colors.union(land.nominal_colors());
    }

    let mana_available = lands_fielded as u32 + u32::from(playable_land);
    let color_flags = (
        colors.contains(Color::Blue),
        colors.contains(Color::Black),
        colors.contains(Color::Green),
    );

    let copier_in_hand = state.hand.contains_named(names::SPIDER_MAN);
    let reanimator_buried = state.graveyard.contains_named(names::BRINGER);
    let trigger_available = state.battlefield.count_with_ability(Ability::DamageOnEntry) > 0
        || state
            .graveyard
            .cards()
            .iter()
            .any(|c| c.has_ability(Ability::DamageOnEntry));

    let primary_failure = classify(
        mana_available,
        color_flags,
        copier_in_hand,
        reanimator_buried,
        trigger_available,
        resolve::estimate_combo_damage(state),
        state.opponent_life,
    );

    TurnFourSnapshot {
        primary_failure,
        mana_available,
        colors: color_flags,
    }
}

/// Play one game up to the turn-4 checkpoint and classify it.
pub fn run_game_to_turn4(deck: &[Card], seed: u32) -> TurnFourSnapshot {
    let mut rng = SimRng::new(seed);
    let mut state = GameState::new();

    state.on_the_play = rng.next_f64() < 0.5;
    let mut pile = deck.to_vec();
    rng.shuffle(&mut pile);
    let opening = mulligan::resolve_mulligans(&mut pile, &mut rng);
    state.library.restock(pile);
    for card in opening {
        state.hand.add(card);
    }

    for _ in 0..3 {
        engine::take_turn(&mut state, false, &mut rng);
    }

    // turn 4 up to the main-phase checkpoint: untap, upkeep, draw, sagas
    phases::begin_turn(&mut state);
    state.phase = Phase::Upkeep;
    phases::upkeep(&mut state);
    state.phase = Phase::Draw;
    phases::draw_step(&mut state, false);
    state.phase = Phase::Main1;
    phases::advance_sagas(&mut state, false, &mut rng);

    snapshot(&state)
}

pub fn aggregate(snapshots: &[TurnFourSnapshot]) -> AnalysisSummary {
    let mut summary = AnalysisSummary::default();
    if snapshots.is_empty() {
        return summary;
    }

    let mut mana_total = 0u64;
    let mut blue = 0usize;
    let mut black = 0usize;
    let mut green = 0usize;

    for snap in snapshots {
        *summary.failure_counts.entry(snap.primary_failure).or_insert(0) += 1;
        mana_total += u64::from(snap.mana_available);
        if snap.colors.0 {
            blue += 1;
        }
        if snap.colors.1 {
            black += 1;
        }
        if snap.colors.2 {
            green += 1;
        }
    }

    let n = snapshots.len() as f64;
    summary.average_mana = mana_total as f64 / n;
    summary.color_rates = (
        blue as f64 / n * 100.0,
        black as f64 / n * 100.0,
        green as f64 / n * 100.0,
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_order_is_fixed() {
        let all = (true, true, true);
        assert_eq!(
            classify(3, all, true, true, true, 30, 20),
            FailureReason::InsufficientMana
        );
        assert_eq!(
            classify(4, (false, true, true), true, true, true, 30, 20),
            FailureReason::MissingBlue
        );
        assert_eq!(
            classify(4, (true, false, true), true, true, true, 30, 20),
            FailureReason::MissingBlack
        );
        assert_eq!(
            classify(4, (true, true, false), true, true, true, 30, 20),
            FailureReason::MissingGreen
        );
        assert_eq!(
            classify(4, all, false, true, true, 30, 20),
            FailureReason::CopierNotInHand
        );
        assert_eq!(
            classify(4, all, true, false, true, 30, 20),
            FailureReason::ReanimatorNotBuried
        );
        assert_eq!(
            classify(4, all, true, true, false, 30, 20),
            FailureReason::NoDamageTrigger
        );
        assert_eq!(
            classify(4, all, true, true, true, 12, 20),
            FailureReason::ShortOfLethal
        );
        assert_eq!(
            classify(4, all, true, true, true, 25, 20),
            FailureReason::ComboAvailable
        );
    }

    #[test]
    fn aggregate_counts_and_rates() {
        let snaps = vec![
            TurnFourSnapshot {
                primary_failure: FailureReason::InsufficientMana,
                mana_available: 2,
                colors: (true, true, false),
            },
            TurnFourSnapshot {
                primary_failure: FailureReason::InsufficientMana,
                mana_available: 4,
                colors: (true, true, true),
            },
        ];
        let summary = aggregate(&snaps);
        assert_eq!(
            summary.failure_counts.get(&FailureReason::InsufficientMana),
            Some(&2)
        );
        assert!((summary.average_mana - 3.0).abs() < f64::EPSILON);
        assert!((summary.color_rates.2 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_of_nothing() {
        let summary = aggregate(&[]);
        assert!(summary.failure_counts.is_empty());
        assert_eq!(summary.average_mana, 0.0);
    }
}
