use crate::card::{Card, Color, ColorSet, Creature, ManaCost, PipCounts, Production};
use crate::game::state::GameState;
use crate::game::zones::Permanent;

/// Mana floated within a single payment. Cleared every untap step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManaPool(PipCounts);

impl ManaPool {
    pub fn new() -> Self {
        ManaPool::default()
    }

    pub fn add(&mut self, color: Color, amount: u32) {
        self.0.add(color, amount);
    }

    pub fn get(&self, color: Color) -> u32 {
        self.0.get(color)
    }

    pub fn total(&self) -> u32 {
        self.0.total()
    }

    pub fn can_cover(&self, cost: &ManaCost) -> bool {
        for (color, need) in cost.pips.iter() {
            if self.0.get(color) < need {
                return false;
            }
        }
        self.0.total() - cost.pips.total() >= cost.generic
    }

    /// Deduct a cost. Pips first, then generic from colorless before colors.
    pub fn pay(&mut self, cost: &ManaCost) -> bool {
        if !self.can_cover(cost) {
            return false;
        }
        for (color, need) in cost.pips.iter() {
            self.0.subtract(color, need);
        }
        let mut generic = cost.generic;
        for color in [
            Color::Colorless,
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
        ] {
            if generic == 0 {
                break;
            }
            let take = self.0.get(color).min(generic);
            self.0.subtract(color, take);
            generic -= take;
        }
        generic == 0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Colors a land's production rule yields in the current game state,
/// ignoring the tapped flag.
fn production_colors(
    permanent: &Permanent,
    state: &GameState,
    casting: Option<&Creature>,
) -> ColorSet {
    let Some(land) = permanent.card.as_land() else {
        return ColorSet::EMPTY;
    };

    match &land.production {
        Production::Fixed { colors } => ColorSet::of(colors),
        Production::AnyForChosenType => {
            let matches_choice = match (casting, &permanent.chosen_type) {
                (Some(creature), Some(chosen)) => creature.has_type(chosen),
                _ => false,
            };
            if matches_choice {
                ColorSet::ANY
            } else {
                ColorSet::only(Color::Colorless)
            }
        }
        Production::Verge {
            base,
            bonus,
            unlocked_by,
        } => {
            let unlocked = state.battlefield.lands().any(|p| {
                p.card
                    .as_land()
                    .is_some_and(|other| {
                        other.basic_types.iter().any(|t| unlocked_by.contains(t))
                    })
            });
            if unlocked {
                ColorSet::of(&[*base, *bonus])
            } else {
                ColorSet::only(*base)
            }
        }
        Production::ChosenBasic => match permanent.chosen_basic {
            Some(basic) => ColorSet::only(basic.color()),
            None => ColorSet::EMPTY,
        },
        Production::LifeFueled => {
            if state.life > 1 {
                ColorSet::ANY
            } else {
                ColorSet::only(Color::Colorless)
            }
        }
    }
}

/// Colors an individual land can actually tap for right now.
pub fn producible_colors(
    permanent: &Permanent,
    state: &GameState,
    casting: Option<&Creature>,
) -> ColorSet {
    if permanent.tapped {
        return ColorSet::EMPTY;
    }
    production_colors(permanent, state, casting)
}

/// Union of every battlefield land's production, tapped or not. Used for
/// color-availability tracking, not for payment.
pub fn potential_colors(state: &GameState) -> ColorSet {
    state
        .battlefield
        .lands()
        .map(|p| production_colors(p, state, None))
        .fold(ColorSet::EMPTY, ColorSet::union)
}

/// One land tapped for one specific color.
type Assignment = (usize, Color);

/// Work out which lands would pay `cost`, without touching state.
///
/// Colors are satisfied rarest first, and within a color the least flexible
/// land is taken first, so naive land order cannot strand a payable cost.
fn plan_payment(
    cost: &ManaCost,
    state: &GameState,
    casting: Option<&Creature>,
) -> Option<Vec<Assignment>> {
    let candidates: Vec<(usize, ColorSet)> = state
        .battlefield
        .permanents()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.card.is_land() && !p.tapped)
        .filter_map(|(idx, p)| {
            let colors = producible_colors(p, state, casting);
            (!colors.is_empty()).then_some((idx, colors))
        })
        .collect();

    if (candidates.len() as u32) < cost.mana_value() {
        return None;
    }

    let mut plan: Vec<Assignment> = Vec::new();
    let mut used = vec![false; candidates.len()];

    let mut required: Vec<(Color, u32)> =
        cost.pips.iter().filter(|(_, n)| *n > 0).collect();
    // rarest color first; ties keep WUBRGC order
    required.sort_by_key(|(color, _)| {
        candidates
            .iter()
            .filter(|(_, colors)| colors.contains(*color))
            .count()
    });

    for (color, amount) in required {
        let mut usable: Vec<usize> = (0..candidates.len())
            .filter(|&k| !used[k] && candidates[k].1.contains(color))
            .collect();
        // least flexible first, battlefield order breaking ties
        usable.sort_by_key(|&k| candidates[k].1.len());

        if (usable.len() as u32) < amount {
            return None;
        }
        for &k in usable.iter().take(amount as usize) {
            used[k] = true;
            plan.push((candidates[k].0, color));
        }
    }

    let mut leftovers: Vec<usize> = (0..candidates.len()).filter(|&k| !used[k]).collect();
    leftovers.sort_by_key(|&k| candidates[k].1.len());
    if (leftovers.len() as u32) < cost.generic {
        return None;
    }
    for &k in leftovers.iter().take(cost.generic as usize) {
        // generic mana is happiest colorless (free on the life-fueled land)
        let set = candidates[k].1;
        let color = if set.contains(Color::Colorless) {
            Color::Colorless
        } else {
            set.first()
                .expect("candidate lands always produce at least one color")
        };
        plan.push((candidates[k].0, color));
    }

    Some(plan)
}

/// Whether `cost` is payable from untapped lands right now.
pub fn can_pay(cost: &ManaCost, state: &GameState, casting: Option<&Creature>) -> bool {
    plan_payment(cost, state, casting).is_some()
}

/// Pay `cost` by tapping lands. On failure nothing is tapped.
pub fn pay(cost: &ManaCost, state: &mut GameState, casting: Option<&Creature>) -> bool {
    let Some(plan) = plan_payment(cost, state, casting) else {
        return false;
    };

    for &(idx, color) in &plan {
        let life_fueled = {
            let perm = &mut state.battlefield.permanents_mut()[idx];
            debug_assert!(!perm.tapped, "payment plan reuses a tapped land");
            perm.tapped = true;
            matches!(
                perm.card.as_land().map(|l| &l.production),
                Some(Production::LifeFueled)
            )
        };
        if life_fueled && color != Color::Colorless {
            state.life -= 1;
        }
        state.pool.add(color, 1);
    }

    let paid = state.pool.pay(cost);
    debug_assert!(paid, "planned payment must cover the cost");
    paid
}

/// Whether a card in hand could be cast right now (lands are played, not
/// cast). Creatures check their impending cost as well.
pub fn can_cast(card: &Card, state: &GameState) -> bool {
    match card {
        Card::Land(_) => false,
        Card::Creature(c) => {
            if let Some(impending) = &c.impending {
                if can_pay(&impending.cost, state, Some(c)) {
                    return true;
                }
            }
            can_pay(&c.cost, state, Some(c))
        }
        _ => can_pay(&card.cost(), state, None),
    }
}
