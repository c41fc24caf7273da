//! Pure heuristics driving play. None of these consult the RNG; ties fall
//! to list order so a fixed seed replays identically.

use crate::card::{names, Ability, Card, Chapter, Color, ColorSet, Land};
use crate::game::mana;
use crate::game::state::GameState;

/// Cards that feed the graveyard, for mulligan keeps and cast ordering.
pub fn is_mill_enabler(card: &Card) -> bool {
    match card {
        Card::Saga(s) => s
            .chapters
            .iter()
            .any(|c| matches!(c, Chapter::Mill { .. })),
        _ => card.abilities().iter().any(|a| {
            matches!(
                a,
                Ability::MillThenReturn { .. } | Ability::DrawThenDiscard { .. }
            )
        }),
    }
}

fn cost_colors(card: &Card) -> ColorSet {
    let mut needed = ColorSet::EMPTY;
    for (color, count) in card.cost().pips.iter() {
        if count > 0 {
            needed.insert(color);
        }
    }
    needed
}

fn covered(card: &Card, colors: ColorSet) -> bool {
    cost_colors(card).iter().all(|c| colors.contains(c))
}

/// Pick the land to play this turn.
///
/// Order of preference: a land that lets some spell in hand be cast this
/// very turn; then one providing a color the hand is missing; then a
/// surveil land; then a land that enters tapped, saving untapped lands.
pub fn choose_land(hand: &[Card], state: &GameState) -> Option<usize> {
    let lands: Vec<(usize, &Land)> = hand
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_land().map(|l| (i, l)))
        .collect();
    if lands.is_empty() {
        return None;
    }

    let lands_fielded = state.battlefield.land_count();
    let untapped_now = state.battlefield.untapped_land_count() as u32;
    let colors_now = state
        .battlefield
        .lands()
        .filter(|p| !p.tapped)
        .map(|p| mana::producible_colors(p, state, None))
        .fold(ColorSet::EMPTY, ColorSet::union);

    let spells: Vec<&Card> = hand.iter().filter(|c| !c.is_land()).collect();
    let mut missing = ColorSet::EMPTY;
    for spell in &spells {
        for color in cost_colors(spell).iter() {
            if !colors_now.contains(color) {
                missing.insert(color);
            }
        }
    }

    let enters_tapped = |l: &Land| l.enters_tapped(lands_fielded, state.turn);
    let provides_missing =
        |l: &Land| l.nominal_colors().iter().any(|c| missing.contains(c));
    let enables_cast = |l: &Land| {
        if enters_tapped(l) {
            return false;
        }
        let colors_after = colors_now.union(l.nominal_colors());
        spells
            .iter()
            .any(|s| s.mana_value() <= untapped_now + 1 && covered(s, colors_after))
    };

    let mut ranked = lands;
    ranked.sort_by(|&(_, a), &(_, b)| {
        use std::cmp::Ordering;
        let (a_cast, b_cast) = (enables_cast(a), enables_cast(b));
        if a_cast != b_cast {
            return if a_cast { Ordering::Less } else { Ordering::Greater };
        }
        if !a_cast {
            let (a_miss, b_miss) = (provides_missing(a), provides_missing(b));
            if a_miss != b_miss {
                return if a_miss { Ordering::Less } else { Ordering::Greater };
            }
            let (a_sur, b_sur) = (a.surveil > 0, b.surveil > 0);
            if a_sur != b_sur {
                return if a_sur { Ordering::Less } else { Ordering::Greater };
            }
            let (a_tap, b_tap) = (enters_tapped(a), enters_tapped(b));
            if a_tap != b_tap {
                return if a_tap { Ordering::Less } else { Ordering::Greater };
            }
            return Ordering::Equal;
        }
        let (a_sur, b_sur) = (a.surveil > 0, b.surveil > 0);
        if a_sur != b_sur {
            return if a_sur { Ordering::Less } else { Ordering::Greater };
        }
        b.nominal_colors().len().cmp(&a.nominal_colors().len())
    });

    ranked.first().map(|(i, _)| *i)
}

/// Which milled card, if any, comes back to hand. The reanimation targets
/// never do; everything else follows one fixed priority ladder.
pub fn pick_permanent_return(milled: &[Card], state: &GameState) -> Option<usize> {
    if milled.is_empty() {
        return None;
    }

    let eligible = |c: &Card| !names::NEVER_RETURN.contains(&c.name());
    let position_of = |name: &str| milled.iter().position(|c| c.name() == name);

    // the castable combo piece, unless already held
    if !state.hand.contains_named(names::SPIDER_MAN) {
        if let Some(i) = position_of(names::SPIDER_MAN) {
            return Some(i);
        }
    }
    // the discard engine, when a reanimation target is stuck in hand
    let stuck = state.hand.contains_named(names::BRINGER)
        || state.hand.contains_named(names::TERROR);
    if stuck {
        if let Some(i) = position_of(names::KIORA) {
            return Some(i);
        }
    }
    // a land only when genuinely starved
    let lands_fielded = state.battlefield.land_count();
    if lands_fielded <= 1 && state.hand.count_lands() == 0 {
        if let Some(i) = milled.iter().position(|c| c.is_land()) {
            return Some(i);
        }
    }
    // keep the engine running
    if let Some(i) = milled.iter().position(|c| {
        c.is_creature() && names::MILL_ENGINES.contains(&c.name())
    }) {
        return Some(i);
    }
    // shore up the mana base
    if lands_fielded < 4 {
        if let Some(i) = milled.iter().position(|c| c.is_land()) {
            return Some(i);
        }
    }
    // any creature that is not reanimation fuel
    if let Some(i) = milled
        .iter()
        .position(|c| c.is_creature() && eligible(c))
    {
        return Some(i);
    }
    // any other permanent
    milled
        .iter()
        .position(|c| c.is_permanent() && eligible(c))
}

/// Best land from a milled set: untapped entries first, then wider color
/// production.
pub fn pick_land_return(milled: &[Card], state: &GameState) -> Option<usize> {
    let lands_fielded = state.battlefield.land_count();
    let mut best: Option<(usize, (bool, u32))> = None;
    for (i, card) in milled.iter().enumerate() {
        let Some(land) = card.as_land() else { continue };
        let key = (
            !land.enters_tapped(lands_fielded, state.turn),
            land.nominal_colors().len(),
        );
        if best.map_or(true, |(_, k)| key > k) {
            best = Some((i, key));
        }
    }
    best.map(|(i, _)| i)
}

/// Static discard priority. Reanimation targets score highest because the
/// graveyard is where they work; the castable combo pieces are protected
/// and only go when nothing else is left.
pub fn discard_score(card: &Card, hand: &[Card]) -> i32 {
    match card.name() {
        names::BRINGER => return 100,
        names::TERROR => return 90,
        names::ARDYN => return 80,
        names::SPIDER_MAN => return -100,
        names::KIORA => return -50,
        _ => {}
    }
    if card.is_land() {
        let lands = hand.iter().filter(|c| c.is_land()).count();
        return if lands > 2 { 60 } else { 5 };
    }
    let duplicates = hand.iter().filter(|c| c.name() == card.name()).count();
    if card.is_creature() && duplicates >= 2 {
        return 40;
    }
    if card.mana_value() <= 2 {
        return 20;
    }
    10
}

/// Index of the card to discard; highest score, first on ties.
pub fn pick_discard(hand: &[Card]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (i, card) in hand.iter().enumerate() {
        let score = discard_score(card, hand);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// What the cast loop knows when ranking spells.
#[derive(Debug, Clone, Copy)]
pub struct CastContext {
    /// Executing the combo right now would win.
    pub lethal: bool,
    /// A reanimation target is stranded in hand.
    pub combo_piece_stuck: bool,
}

/// Lower tier casts first; mana value breaks ties, hand order after that.
pub fn cast_tier(card: &Card, ctx: &CastContext) -> u8 {
    if ctx.lethal && card.has_ability(Ability::CopyFromGraveyard) {
        return 0;
    }
    if ctx.combo_piece_stuck
        && card
            .abilities()
            .iter()
            .any(|a| matches!(a, Ability::DrawThenDiscard { .. }))
    {
        return 1;
    }
    if card
        .abilities()
        .iter()
        .any(|a| matches!(a, Ability::MillThenReturn { .. }))
    {
        return 2;
    }
    if matches!(card, Card::Saga(_)) {
        return 3;
    }
    4
}

/// Pick the next spell to cast from the castable set.
pub fn pick_cast(castable: &[(usize, &Card)], ctx: &CastContext) -> Option<usize> {
    castable
        .iter()
        .min_by_key(|(_, c)| (cast_tier(c, ctx), c.mana_value()))
        .map(|(i, _)| *i)
}

/// Colors the deck leans on, for availability tracking.
pub const DECK_COLORS: [Color; 3] = [Color::Blue, Color::Black, Color::Green];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        BasicType, Creature, EntersTapped, ManaCost, PipCounts, Production, ReturnFilter,
    };
    use crate::game::zones::Permanent;

    fn pips(entries: &[(Color, u32)]) -> PipCounts {
        let mut p = PipCounts::default();
        for &(c, n) in entries {
            p.add(c, n);
        }
        p
    }

    fn creature(name: &str, mv: u32, abilities: Vec<Ability>) -> Card {
        Card::Creature(Creature {
            name: name.into(),
            cost: ManaCost {
                generic: mv.saturating_sub(1),
                pips: pips(&[(Color::Black, 1)]),
            },
            power: 2,
            toughness: 2,
            types: vec![],
            abilities,
            impending: None,
        })
    }

    fn land(name: &str, colors: &[Color], timing: EntersTapped, surveil: u32) -> Card {
        Card::Land(Land {
            name: name.into(),
            basic_types: vec![BasicType::Swamp],
            production: Production::Fixed {
                colors: colors.to_vec(),
            },
            timing,
            surveil,
        })
    }

    fn bringer() -> Card {
        creature(names::BRINGER, 8, vec![Ability::MassReanimate])
    }

    fn spider() -> Card {
        creature(names::SPIDER_MAN, 4, vec![Ability::CopyFromGraveyard])
    }

    fn kiora() -> Card {
        creature(
            names::KIORA,
            3,
            vec![Ability::DrawThenDiscard { draw: 2, discard: 2 }],
        )
    }

    #[test]
    fn mill_return_prefers_the_combo_piece() {
        let state = GameState::new();
        let milled = vec![land("Swamp", &[Color::Black], EntersTapped::Never, 0), spider()];
        assert_eq!(pick_permanent_return(&milled, &state), Some(1));
    }

    #[test]
    fn mill_return_skips_held_combo_piece() {
        let mut state = GameState::new();
        state.hand.add(spider());
        // four lands fielded so land priorities stay quiet
        for _ in 0..4 {
            state.battlefield.add(Permanent::new(
                land("Swamp", &[Color::Black], EntersTapped::Never, 0),
                1,
            ));
        }
        let milled = vec![spider(), creature("Filler", 3, vec![])];
        assert_eq!(pick_permanent_return(&milled, &state), Some(1));
    }

    #[test]
    fn mill_return_never_takes_reanimation_targets() {
        let mut state = GameState::new();
        state.hand.add(spider());
        for _ in 0..4 {
            state.battlefield.add(Permanent::new(
                land("Swamp", &[Color::Black], EntersTapped::Never, 0),
                1,
            ));
        }
        let milled = vec![
            bringer(),
            creature(names::TERROR, 4, vec![Ability::DamageOnEntry]),
        ];
        assert_eq!(pick_permanent_return(&milled, &state), None);
    }

    #[test]
    fn mill_return_fetches_discard_engine_when_stuck() {
        let mut state = GameState::new();
        state.hand.add(spider());
        state.hand.add(bringer());
        let milled = vec![creature("Filler", 3, vec![]), kiora()];
        assert_eq!(pick_permanent_return(&milled, &state), Some(1));
    }

    #[test]
    fn mill_return_takes_land_when_starved() {
        let mut state = GameState::new();
        state.hand.add(spider());
        let milled = vec![
            creature("Filler", 3, vec![]),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
        ];
        // no lands anywhere: the land outranks the filler creature
        assert_eq!(pick_permanent_return(&milled, &state), Some(1));
    }

    #[test]
    fn land_return_prefers_untapped_then_colors() {
        let state = GameState::new();
        let milled = vec![
            land("Taplands", &[Color::Blue, Color::Black], EntersTapped::Always, 1),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
            land("Dual", &[Color::Blue, Color::Black], EntersTapped::Never, 0),
        ];
        assert_eq!(pick_land_return(&milled, &state), Some(2));
    }

    #[test]
    fn discard_protects_the_combo_piece() {
        let hand = vec![spider(), creature("Filler", 2, vec![])];
        assert_eq!(pick_discard(&hand), Some(1));
    }

    #[test]
    fn discard_prefers_reanimation_targets() {
        let hand = vec![
            creature("Filler", 2, vec![]),
            bringer(),
            creature(names::TERROR, 4, vec![Ability::DamageOnEntry]),
        ];
        assert_eq!(pick_discard(&hand), Some(1));
    }

    #[test]
    fn discard_sheds_excess_lands() {
        let hand = vec![
            creature("Filler", 5, vec![]),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
        ];
        assert_eq!(pick_discard(&hand), Some(1));
    }

    #[test]
    fn cast_order_holds_copier_until_lethal() {
        let not_lethal = CastContext {
            lethal: false,
            combo_piece_stuck: false,
        };
        let lethal = CastContext {
            lethal: true,
            combo_piece_stuck: false,
        };
        let s = spider();
        let k = kiora();
        assert!(cast_tier(&s, &not_lethal) > cast_tier(&k, &not_lethal));
        assert_eq!(cast_tier(&s, &lethal), 0);
    }

    #[test]
    fn cast_order_prioritizes_discard_engine_when_stuck() {
        let ctx = CastContext {
            lethal: false,
            combo_piece_stuck: true,
        };
        let k = kiora();
        let mill = creature(
            names::TOWN_GREETER,
            1,
            vec![Ability::MillThenReturn {
                count: 4,
                filter: ReturnFilter::Land,
            }],
        );
        assert!(cast_tier(&k, &ctx) < cast_tier(&mill, &ctx));
    }

    #[test]
    fn pick_cast_breaks_ties_by_mana_value_then_order() {
        let ctx = CastContext {
            lethal: false,
            combo_piece_stuck: false,
        };
        let cheap = creature("Cheap", 2, vec![]);
        let costly = creature("Costly", 5, vec![]);
        let castable: Vec<(usize, &Card)> = vec![(0, &costly), (1, &cheap)];
        assert_eq!(pick_cast(&castable, &ctx), Some(1));
    }

    #[test]
    fn land_choice_enables_a_cast() {
        let mut state = GameState::new();
        state.turn = 2;
        state.battlefield.add(Permanent::new(
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
            1,
        ));

        // a two-drop needing B is castable only if the new land is untapped
        let hand = vec![
            creature("Two Drop", 2, vec![]),
            land("Tapped Dual", &[Color::Blue, Color::Black], EntersTapped::Always, 0),
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
        ];
        assert_eq!(choose_land(&hand, &state), Some(2));
    }

    #[test]
    fn land_choice_prefers_tapped_when_nothing_castable() {
        let state = GameState::new();
        // no spells in hand: hold untapped lands for later
        let hand = vec![
            land("Swamp", &[Color::Black], EntersTapped::Never, 0),
            land("Tapped Dual", &[Color::Blue, Color::Black], EntersTapped::Always, 0),
        ];
        assert_eq!(choose_land(&hand, &state), Some(1));
    }

    #[test]
    fn saga_counts_as_mill_enabler() {
        let saga = Card::Saga(crate::card::Saga {
            name: names::AWAKEN.into(),
            cost: ManaCost::default(),
            chapters: vec![Chapter::Skip, Chapter::Mill { count: 3 }],
        });
        assert!(is_mill_enabler(&saga));
        assert!(is_mill_enabler(&kiora()));
        assert!(!is_mill_enabler(&spider()));
    }
}
