use crate::card::{names, Ability, Card};
use crate::game::resolve;
use crate::game::state::{GameState, Phase, HAND_LIMIT};
use crate::game::zones::Permanent;
use crate::rng::SimRng;
use crate::sim::decisions;

/// Untap step plus turn bookkeeping: everything untaps, the land drop and
/// the mana pool reset.
pub fn begin_turn(state: &mut GameState) {
    state.turn += 1;
    state.phase = Phase::Untap;
    for permanent in state.battlefield.permanents_mut() {
        permanent.tapped = false;
    }
    state.land_drop_used = false;
    state.pool.clear();
}

pub fn upkeep(_state: &mut GameState) {
    // nothing in this pool triggers at upkeep
}

/// Draw step. The player on the play skips the very first draw; an empty
/// library makes the draw a no-op rather than a loss.
pub fn draw_step(state: &mut GameState, verbose: bool) {
    if state.turn == 1 && state.on_the_play {
        if verbose {
            println!("[Draw] skipped (on the play)");
        }
        return;
    }
    if state.draw_card() {
        if verbose {
            if let Some(card) = state.hand.cards().last() {
                println!("[Draw] {}", card.name());
            }
        }
    } else if verbose {
        println!("[Draw] library is empty");
    }
}

/// Start of the first main phase: every saga that was not played this turn
/// gains a lore counter and resolves the matching chapter; a saga on its
/// last chapter is sacrificed afterwards.
pub fn advance_sagas(state: &mut GameState, verbose: bool, rng: &mut SimRng) {
    for i in (0..state.battlefield.len()).rev() {
        let skip = {
            let p = &state.battlefield.permanents()[i];
            !matches!(p.card, Card::Saga(_)) || p.turn_entered >= state.turn
        };
        if skip {
            continue;
        }

        let (name, chapter, finished) = {
            let p = &mut state.battlefield.permanents_mut()[i];
            p.add_time_counters(1);
            let lore = p.time_counters as usize;
            let Card::Saga(saga) = &p.card else { unreachable!() };
            (
                saga.name.clone(),
                saga.chapters.get(lore - 1).copied(),
                lore >= saga.chapters.len(),
            )
        };

        if verbose {
            println!("  [Saga] {name} advances");
        }
        if let Some(chapter) = chapter {
            resolve::resolve_chapter(state, chapter, verbose, rng);
        }
        if finished {
            if let Some(perm) = state.battlefield.remove(i) {
                if verbose {
                    println!("  [Saga] {name} completes");
                }
                state.graveyard.add(perm.card);
            }
        }
    }
}

fn is_demon(permanent: &Permanent) -> bool {
    permanent
        .card
        .as_creature()
        .is_some_and(|c| c.has_type(names::DEMON))
}

/// Combat: every awake, untapped creature past summoning sickness attacks;
/// nothing blocks. Demons ignore summoning sickness while a haste grantor
/// is fielded, and the graveyard-exile combat trigger fires first.
pub fn combat(state: &mut GameState, verbose: bool) -> u32 {
    if state.battlefield.count_with_ability(Ability::CombatExileToken) > 0 {
        resolve::combat_exile_token(state, verbose);
    }
    let demons_hasty = state.battlefield.count_with_ability(Ability::GrantDemonsHaste) > 0;

    let attackers: Vec<usize> = state
        .battlefield
        .permanents()
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            if !p.is_awake_creature() || p.tapped {
                return false;
            }
            let sick = p.turn_entered >= state.turn;
            !sick || (demons_hasty && is_demon(p))
        })
        .map(|(i, _)| i)
        .collect();

    let mut total = 0u32;
    for i in attackers {
        let permanent = &mut state.battlefield.permanents_mut()[i];
        permanent.tapped = true;
        total += permanent.power();
    }
    state.opponent_life -= total as i32;

    if verbose && total > 0 {
        println!("[Combat] {total} damage");
    }
    total
}

/// End step: impending clocks tick down on creature permanents only (sagas
/// count up elsewhere), then the hand is trimmed to the limit.
pub fn end_step(state: &mut GameState, verbose: bool) {
    for permanent in state.battlefield.permanents_mut() {
        if permanent.card.is_creature() && permanent.time_counters > 0 {
            permanent.tick_down();
            if verbose && permanent.time_counters == 0 {
                println!("  [End] {} wakes up", permanent.card.name());
            }
        }
    }

    while state.hand.len() > HAND_LIMIT {
        let Some(idx) = decisions::pick_discard(state.hand.cards()) else {
            break;
        };
        if let Some(card) = state.hand.remove(idx) {
            if verbose {
                println!("  [End] discarded {} to hand size", card.name());
            }
            state.graveyard.add(card);
        }
    }
}
