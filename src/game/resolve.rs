use crate::card::{
    names, Ability, BasicType, Card, Chapter, Color, Creature, ManaCost, Production,
    ReturnFilter, Saga,
};
use crate::game::state::GameState;
use crate::game::zones::Permanent;
use crate::rng::SimRng;
use crate::sim::decisions;

/// One creature arriving on the battlefield, for damage-trigger accounting.
struct Arrival {
    power: u32,
    /// Whether the arriving permanent itself counts as a damage-trigger
    /// instance (directly or as a copy); it never triggers for itself.
    is_trigger_instance: bool,
}

impl Arrival {
    fn of(permanent: &Permanent) -> Self {
        Arrival {
            power: permanent.power(),
            is_trigger_instance: permanent.has_ability(Ability::DamageOnEntry),
        }
    }
}

/// Damage-trigger resolution for a batch of creatures that just entered.
/// Each arrival deals its power once per trigger instance on the
/// battlefield, minus itself if it is one.
fn resolve_damage_triggers(state: &mut GameState, arrivals: &[Arrival], verbose: bool) {
    let instances = state.battlefield.count_with_ability(Ability::DamageOnEntry);
    if instances == 0 {
        return;
    }

    let mut total = 0u32;
    for arrival in arrivals {
        let triggers = instances - u32::from(arrival.is_trigger_instance);
        total += arrival.power * triggers;
    }

    if total > 0 {
        state.opponent_life -= total as i32;
        if verbose {
            println!(
                "    [Trigger] {} damage ({} instance(s), {} arrival(s))",
                total,
                instances,
                arrivals.len()
            );
        }
    }
}

/// Play a land from hand onto the battlefield, handling entry choices and
/// surveil. Callers guarantee the card is a land.
pub fn play_land(state: &mut GameState, card: Card, verbose: bool) {
    let land = match card.as_land() {
        Some(l) => l.clone(),
        None => panic!("play_land called with {}", card.name()),
    };

    let mut permanent = Permanent::new(card, state.turn);
    permanent.tapped = land.enters_tapped(state.battlefield.land_count(), state.turn);

    match land.production {
        Production::AnyForChosenType => {
            let chosen = choose_creature_type(state);
            if verbose {
                println!("    (creature type set to {chosen})");
            }
            permanent.chosen_type = Some(chosen);
        }
        Production::ChosenBasic => {
            let chosen = choose_basic_type(state);
            if verbose {
                println!("    (basic type set to {chosen:?})");
            }
            permanent.chosen_basic = Some(chosen);
        }
        _ => {}
    }

    state.battlefield.add(permanent);
    state.land_drop_used = true;

    if land.surveil > 0 {
        resolve_surveil(state, land.surveil, verbose);
    }
}

/// Creature type for a type-choosing land. Defaults to Human (the cheap
/// creatures and the combo piece); later copies cover whichever reanimation
/// target is actually stuck in hand.
fn choose_creature_type(state: &GameState) -> String {
    let hand = &state.hand;
    let has_human_choice = state.battlefield.permanents().iter().any(|p| {
        p.card
            .as_land()
            .is_some_and(|l| matches!(l.production, Production::AnyForChosenType))
            && p.chosen_type.as_deref() == Some("Human")
    });
    let more_choosers_in_hand = hand
        .cards()
        .iter()
        .filter(|c| {
            c.as_land()
                .is_some_and(|l| matches!(l.production, Production::AnyForChosenType))
        })
        .count();
    let kiora_in_hand = hand.contains_named(names::KIORA);
    let big_target_in_hand =
        hand.contains_named(names::BRINGER) || hand.contains_named(names::TERROR);

    // Kiora first when she has something to pitch and another chooser covers
    // Human later.
    if !has_human_choice && kiora_in_hand && big_target_in_hand && more_choosers_in_hand >= 1 {
        return "Noble".to_string();
    }

    if has_human_choice {
        if hand.contains_named(names::BRINGER) {
            return "Demon".to_string();
        }
        if kiora_in_hand {
            return "Noble".to_string();
        }
        if hand.contains_named(names::OVERLORD) {
            return "Avatar".to_string();
        }
        if hand.contains_named(names::TERROR) {
            return "Dragon".to_string();
        }
        return "Demon".to_string();
    }

    "Human".to_string()
}

/// Basic type for a basic-choosing land: plug the first missing color the
/// hand actually needs, blue-leaning by default.
fn choose_basic_type(state: &GameState) -> BasicType {
    // only untapped sources count as "have" for this turn's planning
    let have = state
        .battlefield
        .lands()
        .filter(|p| !p.tapped)
        .map(|p| crate::game::mana::producible_colors(p, state, None))
        .fold(crate::card::ColorSet::EMPTY, crate::card::ColorSet::union);

    let mut needed = crate::card::ColorSet::EMPTY;
    for card in state.hand.cards() {
        for (color, count) in card.cost().pips.iter() {
            if count > 0 {
                needed.insert(color);
            }
        }
    }

    for (color, basic) in [
        (Color::Green, BasicType::Forest),
        (Color::Blue, BasicType::Island),
        (Color::Black, BasicType::Swamp),
    ] {
        if needed.contains(color) && !have.contains(color) {
            return basic;
        }
    }
    for (color, basic) in [
        (Color::Blue, BasicType::Island),
        (Color::Black, BasicType::Swamp),
        (Color::Green, BasicType::Forest),
    ] {
        if !have.contains(color) {
            return basic;
        }
    }
    BasicType::Island
}

/// Surveil: peek the top card repeatedly; reanimation fodder goes to the
/// graveyard, the first card worth keeping stops the surveil with the card
/// left in place.
pub fn resolve_surveil(state: &mut GameState, count: u32, verbose: bool) {
    let mut binned: Vec<String> = Vec::new();
    for _ in 0..count {
        let Some(top) = state.library.peek() else { break };
        // re-checked every iteration: the Kiora rule depends on hand contents
        let to_graveyard = match top.name() {
            names::BRINGER | names::TERROR | names::OVERLORD | names::ARDYN
            | names::TOWN_GREETER => true,
            names::KIORA => state.hand.contains_named(names::KIORA),
            _ => false,
        };
        if !to_graveyard {
            if verbose {
                println!("    Surveil keeps {} on top", top.name());
            }
            break;
        }
        if let Some(card) = state.library.draw() {
            binned.push(card.name().to_string());
            state.graveyard.add(card);
        }
    }
    if verbose && !binned.is_empty() {
        println!("    Surveil -> graveyard: {}", binned.join(", "));
    }
}

/// Mill `count`, then maybe return one card to hand by the shared priority
/// rules. The two cards the combo wants dead stay in the graveyard.
pub fn resolve_mill_return(
    state: &mut GameState,
    count: u32,
    filter: ReturnFilter,
    verbose: bool,
) {
    let milled = state.library.mill(count);
    if verbose && !milled.is_empty() {
        let shown: Vec<&str> = milled.iter().map(Card::name).collect();
        println!("    Mill {}: {}", milled.len(), shown.join(", "));
    }

    let keep = match filter {
        ReturnFilter::Permanent => decisions::pick_permanent_return(&milled, state),
        ReturnFilter::Land => decisions::pick_land_return(&milled, state),
    };

    for (idx, card) in milled.into_iter().enumerate() {
        if Some(idx) == keep {
            if verbose {
                println!("    -> returned to hand: {}", card.name());
            }
            state.hand.add(card);
        } else {
            state.graveyard.add(card);
        }
    }
}

/// Draw then discard; the discard scan runs after the draws so a card drawn
/// this resolution can be pitched immediately.
pub fn resolve_draw_discard(state: &mut GameState, draw: u32, discard: u32, verbose: bool) {
    let before = state.hand.len();
    for _ in 0..draw {
        state.draw_card();
    }
    if verbose {
        let drawn: Vec<&str> = state.hand.cards()[before..].iter().map(Card::name).collect();
        if !drawn.is_empty() {
            println!("    Drew: {}", drawn.join(", "));
        }
    }

    let mut pitched: Vec<String> = Vec::new();
    for _ in 0..discard {
        let Some(idx) = decisions::pick_discard(state.hand.cards()) else { break };
        if let Some(card) = state.hand.remove(idx) {
            pitched.push(card.name().to_string());
            state.graveyard.add(card);
        }
    }
    if verbose && !pitched.is_empty() {
        println!("    Discarded: {}", pitched.join(", "));
    }
}

/// Put a creature from hand onto the battlefield and resolve its entry.
pub fn enter_creature(
    state: &mut GameState,
    card: Card,
    use_impending: bool,
    verbose: bool,
    rng: &mut SimRng,
) {
    let counters = if use_impending {
        card.as_creature()
            .and_then(|c| c.impending)
            .map_or(0, |i| i.counters)
    } else {
        0
    };

    let mut permanent = Permanent::new(card, state.turn);
    permanent.add_time_counters(counters);
    let idx = state.battlefield.add(permanent);

    let arrival = Arrival::of(&state.battlefield.permanents()[idx]);
    resolve_damage_triggers(state, &[arrival], verbose);

    let abilities: Vec<Ability> = state.battlefield.permanents()[idx].card.abilities().to_vec();
    run_abilities(state, idx, &abilities, true, verbose, rng);
}

/// Resolve entry abilities for the permanent at `idx`.
/// `allow_reanimation` is cleared while resolving a reanimated batch so the
/// chain cannot re-enter itself.
fn run_abilities(
    state: &mut GameState,
    idx: usize,
    abilities: &[Ability],
    allow_reanimation: bool,
    verbose: bool,
    rng: &mut SimRng,
) {
    for &ability in abilities {
        match ability {
            Ability::MillThenReturn { count, filter } => {
                resolve_mill_return(state, count, filter, verbose)
            }
            Ability::DrawThenDiscard { draw, discard } => {
                resolve_draw_discard(state, draw, discard, verbose)
            }
            Ability::CopyFromGraveyard => {
                resolve_copy_from_graveyard(state, idx, allow_reanimation, verbose, rng)
            }
            Ability::MassReanimate => {
                if allow_reanimation {
                    resolve_mass_reanimation(state, idx, verbose, rng)
                }
            }
            // static or separately-triggered abilities: nothing on entry
            Ability::DamageOnEntry
            | Ability::GrantDemonsHaste
            | Ability::CombatExileToken => {}
        }
    }
}

/// Entry effect of the combo piece: copy a creature card out of the
/// graveyard. Copying exiles the original, takes its identity, and resolves
/// its entry effect.
fn resolve_copy_from_graveyard(
    state: &mut GameState,
    idx: usize,
    allow_reanimation: bool,
    verbose: bool,
    rng: &mut SimRng,
) {
    // the reanimator itself: the whole point
    if allow_reanimation {
        if let Some(target) = state.graveyard.take_named(names::BRINGER) {
            if verbose {
                println!("    *** {} copies {} ***", names::SPIDER_MAN, target.name());
            }
            let abilities: Vec<Ability> = target.abilities().to_vec();
            state.battlefield.permanents_mut()[idx].copy_of = Some(Box::new(target.clone()));
            state.exile.add(target);
            run_abilities(state, idx, &abilities, true, verbose, rng);
            return;
        }
    } else if let Some(target) = state.graveyard.take_named(names::TERROR) {
        // mid-reanimation there is nothing left to reanimate; taking the
        // damage trigger's identity scales the batch instead
        if verbose {
            println!("    {} copies {}", names::SPIDER_MAN, target.name());
        }
        state.battlefield.permanents_mut()[idx].copy_of = Some(Box::new(target.clone()));
        state.exile.add(target);
        return;
    }

    // the secondary line: only worth it with raw material for its combat
    // trigger
    let other_creatures = state
        .graveyard
        .cards()
        .iter()
        .filter(|c| c.is_creature() && c.name() != names::ARDYN)
        .count();
    if other_creatures >= 1 {
        if let Some(target) = state.graveyard.take_named(names::ARDYN) {
            if verbose {
                println!("    {} copies {}", names::SPIDER_MAN, target.name());
            }
            let abilities: Vec<Ability> = target.abilities().to_vec();
            state.battlefield.permanents_mut()[idx].copy_of = Some(Box::new(target.clone()));
            state.exile.add(target);
            run_abilities(state, idx, &abilities, allow_reanimation, verbose, rng);
            return;
        }
    }

    // with a second copy in hand, keep digging instead
    let copier_name = state.battlefield.permanents()[idx].card.name().to_string();
    let spare_in_hand = state.hand.count_named(&copier_name) >= 1;
    if spare_in_hand {
        for engine in names::MILL_ENGINES {
            if let Some(target) = state.graveyard.take_named(engine) {
                if verbose {
                    println!("    {} copies {} to keep digging", copier_name, target.name());
                }
                let abilities: Vec<Ability> = target.abilities().to_vec();
                state.battlefield.permanents_mut()[idx].copy_of = Some(Box::new(target.clone()));
                state.exile.add(target);
                run_abilities(state, idx, &abilities, allow_reanimation, verbose, rng);
                return;
            }
        }
    }

    if verbose {
        println!("    {} enters with no copy target", copier_name);
    }
}

/// The mass-reanimation entry effect: clear the board of other awake
/// creatures, then return every creature card in the graveyard at once.
fn resolve_mass_reanimation(
    state: &mut GameState,
    source_idx: usize,
    verbose: bool,
    rng: &mut SimRng,
) {
    // 1. sacrifice everything else that is currently a creature; impending
    // shells survive
    let doomed: Vec<usize> = state
        .battlefield
        .permanents()
        .iter()
        .enumerate()
        .filter(|(i, p)| *i != source_idx && p.is_awake_creature())
        .map(|(i, _)| i)
        .collect();

    if verbose && !doomed.is_empty() {
        let shown: Vec<&str> = doomed
            .iter()
            .map(|&i| state.battlefield.permanents()[i].card.name())
            .collect();
        println!("    Sacrifice: {}", shown.join(", "));
    }
    for &i in doomed.iter().rev() {
        if let Some(perm) = state.battlefield.remove(i) {
            if !perm.is_token {
                state.graveyard.add(perm.card);
            }
        }
    }

    // 2. every graveyard creature returns simultaneously
    let returning = state.graveyard.drain_creatures();
    if verbose && !returning.is_empty() {
        let shown: Vec<&str> = returning.iter().map(Card::name).collect();
        println!("    Reanimate: {}", shown.join(", "));
    }

    let mut arrivals_at: Vec<usize> = Vec::with_capacity(returning.len());
    for card in returning {
        arrivals_at.push(state.battlefield.add(Permanent::new(card, state.turn)));
    }

    // 3. entry effects of the reanimated, in order; reanimation itself is
    // not re-entered
    for &i in &arrivals_at {
        let abilities: Vec<Ability> = state.battlefield.permanents()[i].card.abilities().to_vec();
        run_abilities(state, i, &abilities, false, verbose, rng);
    }

    // 4. one damage-trigger pass for the whole batch
    let arrivals: Vec<Arrival> = arrivals_at
        .iter()
        .map(|&i| Arrival::of(&state.battlefield.permanents()[i]))
        .collect();
    resolve_damage_triggers(state, &arrivals, verbose);
}

/// Beginning-of-combat trigger of the secondary combo creature: exile the
/// best creature card in the graveyard and put a 5/5 Demon token copy of it
/// onto the battlefield.
pub fn combat_exile_token(state: &mut GameState, verbose: bool) {
    let mut best: Option<(usize, u32)> = None;
    for (i, card) in state.graveyard.cards().iter().enumerate() {
        let Some(creature) = card.as_creature() else { continue };
        let score = creature.power
            + if card.has_ability(Ability::MassReanimate) {
                100
            } else if card.has_ability(Ability::DamageOnEntry) {
                50
            } else {
                0
            };
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }

    let Some((idx, _)) = best else { return };
    let Some(original) = state.graveyard.remove(idx) else { return };
    if verbose {
        println!("    [Combat] exiled {} for a 5/5 Demon token", original.name());
    }

    let token_card = Card::Creature(Creature {
        name: format!("{} (Starscourge token)", original.name()),
        cost: ManaCost::default(),
        power: 5,
        toughness: 5,
        types: vec![names::DEMON.to_string()],
        abilities: vec![],
        impending: None,
    });
    state.exile.add(original.clone());

    let mut token = Permanent::token(token_card, state.turn);
    token.copy_of = Some(Box::new(original));
    let at = state.battlefield.add(token);

    let arrival = Arrival::of(&state.battlefield.permanents()[at]);
    resolve_damage_triggers(state, &[arrival], verbose);
}

/// Resolve one saga chapter.
pub fn resolve_chapter(state: &mut GameState, chapter: Chapter, verbose: bool, rng: &mut SimRng) {
    match chapter {
        Chapter::Skip => {
            if verbose {
                println!("    Chapter: no target while goldfishing");
            }
        }
        Chapter::Mill { count } => {
            let milled = state.library.mill(count);
            if verbose && !milled.is_empty() {
                let shown: Vec<&str> = milled.iter().map(Card::name).collect();
                println!("    Chapter mill {}: {}", milled.len(), shown.join(", "));
            }
            for card in milled {
                state.graveyard.add(card);
            }
        }
        Chapter::RecoverCreature => {
            let from_graveyard = state
                .graveyard
                .cards()
                .iter()
                .position(|c| c.is_creature())
                .and_then(|i| state.graveyard.remove(i));
            if let Some(card) = from_graveyard {
                if verbose {
                    println!("    Chapter returns {} to hand", card.name());
                }
                state.hand.add(card);
                return;
            }

            let found = state
                .library
                .take_named(names::SPIDER_MAN)
                .or_else(|| state.library.take_named(names::KIORA))
                .or_else(|| state.library.take_where(Card::is_land));
            if let Some(card) = found {
                if verbose {
                    println!("    Chapter searches up {}", card.name());
                }
                state.hand.add(card);
                state.library.shuffle(rng);
            }
        }
    }
}

/// Put a freshly cast saga onto the battlefield and run its first chapter.
pub fn enter_saga(state: &mut GameState, card: Card, verbose: bool, rng: &mut SimRng) {
    let saga: Saga = match &card {
        Card::Saga(s) => s.clone(),
        _ => panic!("enter_saga called with {}", card.name()),
    };
    let mut permanent = Permanent::new(card, state.turn);
    permanent.add_time_counters(1);
    let idx = state.battlefield.add(permanent);

    if let Some(first) = saga.chapters.first() {
        resolve_chapter(state, *first, verbose, rng);
    }
    if saga.chapters.len() <= 1 {
        if let Some(perm) = state.battlefield.remove(idx) {
            state.graveyard.add(perm.card);
        }
    }
}

/// Resolve a cast card after its cost is paid. Lands are played, not cast.
pub fn cast_resolved(
    state: &mut GameState,
    card: Card,
    use_impending: bool,
    verbose: bool,
    rng: &mut SimRng,
) {
    match &card {
        Card::Creature(_) => enter_creature(state, card, use_impending, verbose, rng),
        Card::Instant(spell) | Card::Sorcery(spell) => {
            let abilities = spell.abilities.clone();
            for ability in abilities {
                match ability {
                    Ability::MillThenReturn { count, filter } => {
                        resolve_mill_return(state, count, filter, verbose)
                    }
                    Ability::DrawThenDiscard { draw, discard } => {
                        resolve_draw_discard(state, draw, discard, verbose)
                    }
                    // permanent-bound effects cannot ride on an instant or
                    // sorcery in this pool
                    _ => {}
                }
            }
            state.graveyard.add(card);
        }
        Card::Enchantment(_) => {
            let idx = state.battlefield.add(Permanent::new(card, state.turn));
            let abilities: Vec<Ability> =
                state.battlefield.permanents()[idx].card.abilities().to_vec();
            run_abilities(state, idx, &abilities, true, verbose, rng);
        }
        Card::Saga(_) => enter_saga(state, card, verbose, rng),
        Card::Land(_) => panic!("cast_resolved called with land {}", card.name()),
    }
}

/// Damage the whole chain would deal if the combo were cast right now.
///
/// Counts (a) trigger damage for everything that would enter, scaled by
/// damage-trigger instances on the battlefield plus in the graveyard, and
/// (b) combat damage from creatures already able to attack. Reanimated
/// creatures cannot attack the turn they enter and are left out of (b).
pub fn estimate_combo_damage(state: &GameState) -> u32 {
    let graveyard_creatures: Vec<&Creature> = state
        .graveyard
        .cards()
        .iter()
        .filter_map(Card::as_creature)
        .collect();

    let instances_fielded = state.battlefield.count_with_ability(Ability::DamageOnEntry);
    let instances_buried = graveyard_creatures
        .iter()
        .filter(|c| c.abilities.contains(&Ability::DamageOnEntry))
        .count() as u32;

    let copier_power = state
        .hand
        .cards()
        .iter()
        .filter_map(Card::as_creature)
        .find(|c| c.abilities.contains(&Ability::CopyFromGraveyard))
        .map_or(0, |c| c.power);

    let mut damage = 0u32;

    // the copier enters first and only sees what is already fielded
    damage += copier_power * instances_fielded;

    for creature in &graveyard_creatures {
        let is_instance = creature.abilities.contains(&Ability::DamageOnEntry);
        let triggers = instances_fielded + instances_buried - u32::from(is_instance);
        damage += creature.power * triggers;
    }

    // creatures already past summoning sickness still get their attack in
    let combat: u32 = state
        .battlefield
        .permanents()
        .iter()
        .filter(|p| p.is_awake_creature() && !p.tapped && p.turn_entered < state.turn)
        .map(Permanent::power)
        .sum();

    damage + combat
}

/// Whether executing the combo right now finishes the game.
pub fn combo_is_lethal(state: &GameState) -> bool {
    estimate_combo_damage(state) >= state.opponent_life.max(0) as u32
}
