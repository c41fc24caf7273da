use serde::{Deserialize, Serialize};

use crate::card::ability::{Ability, Chapter};
use crate::card::cost::{Color, ColorSet, ManaCost};

/// Basic land types. Duals carry these too; verge lands check for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicType {
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
}

impl BasicType {
    pub fn color(self) -> Color {
        match self {
            BasicType::Plains => Color::White,
            BasicType::Island => Color::Blue,
            BasicType::Swamp => Color::Black,
            BasicType::Mountain => Color::Red,
            BasicType::Forest => Color::Green,
        }
    }
}

/// How a land produces mana. Conditional lands resolve their color set
/// against live game state, so this is rules data, not a static color list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Production {
    Fixed { colors: Vec<Color> },
    /// Any color, but only while casting a creature of the type chosen when
    /// the land entered; colorless otherwise.
    AnyForChosenType,
    /// `base` always; `bonus` too once a land with one of the listed basic
    /// types is already on the battlefield.
    Verge {
        base: Color,
        bonus: Color,
        unlocked_by: Vec<BasicType>,
    },
    /// The single color of the basic type chosen when the land entered.
    ChosenBasic,
    /// Colorless for free, or any color for 1 life while life stays above 1.
    LifeFueled,
}

/// When a land enters tapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntersTapped {
    #[default]
    Never,
    Always,
    /// Tapped once three or more lands are already down.
    FourthLandOnward,
    /// Untapped on turns 1-3 only.
    AfterThirdTurn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Land {
    pub name: String,
    #[serde(default)]
    pub basic_types: Vec<BasicType>,
    pub production: Production,
    #[serde(default)]
    pub timing: EntersTapped,
    #[serde(default)]
    pub surveil: u32,
}

impl Land {
    /// Whether this land would enter tapped right now.
    pub fn enters_tapped(&self, lands_on_field: usize, turn: u32) -> bool {
        match self.timing {
            EntersTapped::Never => false,
            EntersTapped::Always => true,
            EntersTapped::FourthLandOnward => lands_on_field >= 3,
            EntersTapped::AfterThirdTurn => turn > 3,
        }
    }

    /// Optimistic color set used by planning heuristics. Payment uses the
    /// state-aware production rules instead.
    pub fn nominal_colors(&self) -> ColorSet {
        match &self.production {
            Production::Fixed { colors } => ColorSet::of(colors),
            Production::AnyForChosenType => ColorSet::only(Color::Colorless),
            Production::Verge { base, bonus, .. } => ColorSet::of(&[*base, *bonus]),
            Production::ChosenBasic => ColorSet::of(&[
                Color::White,
                Color::Blue,
                Color::Black,
                Color::Red,
                Color::Green,
            ]),
            Production::LifeFueled => ColorSet::ANY,
        }
    }
}

/// Alternate entry: cheaper cost, but the permanent spends `counters` turns
/// as a non-creature before waking up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impending {
    pub cost: ManaCost,
    pub counters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    #[serde(default)]
    pub cost: ManaCost,
    pub power: u32,
    pub toughness: u32,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub impending: Option<Impending>,
}

impl Creature {
    pub fn has_type(&self, creature_type: &str) -> bool {
        self.types.iter().any(|t| t == creature_type)
    }
}

/// Instants, sorceries and plain enchantments share a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    #[serde(default)]
    pub cost: ManaCost,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saga {
    pub name: String,
    #[serde(default)]
    pub cost: ManaCost,
    pub chapters: Vec<Chapter>,
}

/// A card definition. Zones hold value copies; the registry owns the source
/// of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Card {
    Land(Land),
    Creature(Creature),
    Instant(Spell),
    Sorcery(Spell),
    Enchantment(Spell),
    Saga(Saga),
}

impl Card {
    pub fn name(&self) -> &str {
        match self {
            Card::Land(c) => &c.name,
            Card::Creature(c) => &c.name,
            Card::Instant(c) | Card::Sorcery(c) | Card::Enchantment(c) => &c.name,
            Card::Saga(c) => &c.name,
        }
    }

    pub fn cost(&self) -> ManaCost {
        match self {
            Card::Land(_) => ManaCost::default(),
            Card::Creature(c) => c.cost,
            Card::Instant(c) | Card::Sorcery(c) | Card::Enchantment(c) => c.cost,
            Card::Saga(c) => c.cost,
        }
    }

    pub fn mana_value(&self) -> u32 {
        self.cost().mana_value()
    }

    pub fn is_land(&self) -> bool {
        matches!(self, Card::Land(_))
    }

    pub fn is_creature(&self) -> bool {
        matches!(self, Card::Creature(_))
    }

    /// Anything that stays on the battlefield when it resolves.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, Card::Instant(_) | Card::Sorcery(_))
    }

    pub fn as_creature(&self) -> Option<&Creature> {
        match self {
            Card::Creature(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_land(&self) -> Option<&Land> {
        match self {
            Card::Land(l) => Some(l),
            _ => None,
        }
    }

    pub fn power(&self) -> u32 {
        self.as_creature().map_or(0, |c| c.power)
    }

    pub fn abilities(&self) -> &[Ability] {
        match self {
            Card::Creature(c) => &c.abilities,
            Card::Instant(c) | Card::Sorcery(c) | Card::Enchantment(c) => &c.abilities,
            Card::Land(_) | Card::Saga(_) => &[],
        }
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities().contains(&ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::cost::PipCounts;

    fn pips(entries: &[(Color, u32)]) -> PipCounts {
        let mut p = PipCounts::default();
        for &(c, n) in entries {
            p.add(c, n);
        }
        p
    }

    #[test]
    fn land_mana_value_is_zero() {
        let forest = Card::Land(Land {
            name: "Forest".into(),
            basic_types: vec![BasicType::Forest],
            production: Production::Fixed {
                colors: vec![Color::Green],
            },
            timing: EntersTapped::Never,
            surveil: 0,
        });
        assert_eq!(forest.mana_value(), 0);
        assert!(forest.is_land());
        assert!(forest.is_permanent());
    }

    #[test]
    fn fastland_timing_depends_on_land_count() {
        let marsh = Land {
            name: "Blooming Marsh".into(),
            basic_types: vec![],
            production: Production::Fixed {
                colors: vec![Color::Black, Color::Green],
            },
            timing: EntersTapped::FourthLandOnward,
            surveil: 0,
        };
        assert!(!marsh.enters_tapped(2, 5));
        assert!(marsh.enters_tapped(3, 5));
    }

    #[test]
    fn town_timing_depends_on_turn() {
        let town = Land {
            name: "Starting Town".into(),
            basic_types: vec![],
            production: Production::LifeFueled,
            timing: EntersTapped::AfterThirdTurn,
            surveil: 0,
        };
        assert!(!town.enters_tapped(0, 3));
        assert!(town.enters_tapped(0, 4));
    }

    #[test]
    fn card_json_shape() {
        let kiora = Card::Creature(Creature {
            name: "Kiora, the Rising Tide".into(),
            cost: ManaCost {
                generic: 2,
                pips: pips(&[(Color::Blue, 1)]),
            },
            power: 4,
            toughness: 5,
            types: vec!["Noble".into(), "Octopus".into()],
            abilities: vec![Ability::DrawThenDiscard { draw: 2, discard: 2 }],
            impending: None,
        });
        let json = serde_json::to_string(&kiora).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kiora);
        assert_eq!(back.mana_value(), 3);
        assert!(back.has_ability(Ability::DrawThenDiscard { draw: 2, discard: 2 }));
    }
}
