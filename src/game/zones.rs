use crate::card::{Ability, BasicType, Card};
use crate::rng::SimRng;

/// A card on the battlefield plus its battlefield-only state.
///
/// `time_counters` serves two distinct clocks: impending creatures count
/// down to creaturehood, sagas count up through chapters. The two are
/// advanced by separate code paths and must never share one.
#[derive(Debug, Clone)]
pub struct Permanent {
    pub card: Card,
    pub tapped: bool,
    pub turn_entered: u32,
    pub time_counters: u32,
    /// Creature type picked when a type-choosing land entered.
    pub chosen_type: Option<String>,
    /// Basic type picked when a basic-choosing land entered.
    pub chosen_basic: Option<BasicType>,
    /// Static definition of the card this permanent copies, if any. The
    /// permanent keeps its own power and toughness but answers for the
    /// copied card's identity and abilities.
    pub copy_of: Option<Box<Card>>,
    /// Tokens exist only on the battlefield and are not counted against the
    /// deck.
    pub is_token: bool,
}

impl Permanent {
    pub fn new(card: Card, turn_entered: u32) -> Self {
        Permanent {
            card,
            tapped: false,
            turn_entered,
            time_counters: 0,
            chosen_type: None,
            chosen_basic: None,
            copy_of: None,
            is_token: false,
        }
    }

    pub fn token(card: Card, turn_entered: u32) -> Self {
        Permanent {
            is_token: true,
            ..Permanent::new(card, turn_entered)
        }
    }

    pub fn add_time_counters(&mut self, amount: u32) {
        self.time_counters += amount;
    }

    /// Remove one time counter; counters never go negative.
    pub fn tick_down(&mut self) {
        debug_assert!(self.time_counters > 0, "tick_down on zero counters");
        self.time_counters = self.time_counters.saturating_sub(1);
    }

    /// This card's name or the name of what it copies.
    pub fn answers_to(&self, name: &str) -> bool {
        self.card.name() == name
            || self.copy_of.as_deref().is_some_and(|c| c.name() == name)
    }

    /// Ability on the card itself or granted by the copied definition.
    pub fn has_ability(&self, ability: Ability) -> bool {
        self.card.has_ability(ability)
            || self.copy_of.as_deref().is_some_and(|c| c.has_ability(ability))
    }

    /// A creature card that is not stuck in its impending shell.
    pub fn is_awake_creature(&self) -> bool {
        self.card.is_creature() && self.time_counters == 0
    }

    pub fn power(&self) -> u32 {
        self.card.power()
    }
}

/// The deck during play. Ordered; index 0 is the top.
#[derive(Debug, Clone, Default)]
pub struct Library {
    cards: Vec<Card>,
}

impl Library {
    pub fn new() -> Self {
        Library::default()
    }

    pub fn restock(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// Remove and return the top card. Empty library is a quiet no-op.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Remove up to `count` cards off the top.
    pub fn mill(&mut self, count: u32) -> Vec<Card> {
        let take = (count as usize).min(self.cards.len());
        self.cards.drain(..take).collect()
    }

    /// Find a card by name anywhere in the library and remove it.
    pub fn take_named(&mut self, name: &str) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.name() == name)?;
        Some(self.cards.remove(idx))
    }

    pub fn take_where(&mut self, pred: impl Fn(&Card) -> bool) -> Option<Card> {
        let idx = self.cards.iter().position(|c| pred(c))?;
        Some(self.cards.remove(idx))
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.cards.iter().any(|c| c.name() == name)
    }

    pub fn shuffle(&mut self, rng: &mut SimRng) {
        rng.shuffle(&mut self.cards);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// An unordered holding zone: hand, graveyard and exile are all piles.
#[derive(Debug, Clone, Default)]
pub struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    pub fn new() -> Self {
        Pile::default()
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn take_named(&mut self, name: &str) -> Option<Card> {
        let idx = self.position_named(name)?;
        Some(self.cards.remove(idx))
    }

    pub fn position_named(&self, name: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.name() == name)
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.position_named(name).is_some()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.cards.iter().filter(|c| c.name() == name).count()
    }

    pub fn count_lands(&self) -> usize {
        self.cards.iter().filter(|c| c.is_land()).count()
    }

    /// Remove and return every creature card, preserving order.
    pub fn drain_creatures(&mut self) -> Vec<Card> {
        let (creatures, rest): (Vec<Card>, Vec<Card>) =
            self.cards.drain(..).partition(Card::is_creature);
        self.cards = rest;
        creatures
    }

    pub fn drain(&mut self) -> Vec<Card> {
        self.cards.drain(..).collect()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Ordered list of permanents under the player's control.
#[derive(Debug, Clone, Default)]
pub struct Battlefield {
    permanents: Vec<Permanent>,
}

impl Battlefield {
    pub fn new() -> Self {
        Battlefield::default()
    }

    pub fn add(&mut self, permanent: Permanent) -> usize {
        self.permanents.push(permanent);
        self.permanents.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Permanent> {
        (index < self.permanents.len()).then(|| self.permanents.remove(index))
    }

    pub fn permanents(&self) -> &[Permanent] {
        &self.permanents
    }

    pub fn permanents_mut(&mut self) -> &mut [Permanent] {
        &mut self.permanents
    }

    pub fn lands(&self) -> impl Iterator<Item = &Permanent> {
        self.permanents.iter().filter(|p| p.card.is_land())
    }

    pub fn land_count(&self) -> usize {
        self.lands().count()
    }

    pub fn untapped_land_count(&self) -> usize {
        self.lands().filter(|p| !p.tapped).count()
    }

    pub fn any_answers_to(&self, name: &str) -> bool {
        self.permanents.iter().any(|p| p.answers_to(name))
    }

    pub fn count_with_ability(&self, ability: Ability) -> u32 {
        self.permanents
            .iter()
            .filter(|p| p.has_ability(ability))
            .count() as u32
    }

    pub fn len(&self) -> usize {
        self.permanents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permanents.is_empty()
    }

    /// Battlefield cards that came from the deck (tokens excluded).
    pub fn deck_card_count(&self) -> usize {
        self.permanents.iter().filter(|p| !p.is_token).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Color, Creature, Land, ManaCost, PipCounts, Production};

    fn creature(name: &str, power: u32) -> Card {
        Card::Creature(Creature {
            name: name.into(),
            cost: ManaCost {
                generic: 1,
                pips: PipCounts::default(),
            },
            power,
            toughness: power,
            types: vec![],
            abilities: vec![],
            impending: None,
        })
    }

    fn forest() -> Card {
        Card::Land(Land {
            name: "Forest".into(),
            basic_types: vec![BasicType::Forest],
            production: Production::Fixed {
                colors: vec![Color::Green],
            },
            timing: Default::default(),
            surveil: 0,
        })
    }

    #[test]
    fn library_draw_from_top() {
        let mut lib = Library::new();
        lib.restock(vec![creature("A", 1), creature("B", 2)]);
        assert_eq!(lib.peek().unwrap().name(), "A");
        assert_eq!(lib.draw().unwrap().name(), "A");
        assert_eq!(lib.draw().unwrap().name(), "B");
        assert!(lib.draw().is_none());
    }

    #[test]
    fn mill_stops_at_empty() {
        let mut lib = Library::new();
        lib.restock(vec![creature("A", 1), creature("B", 2)]);
        let milled = lib.mill(5);
        assert_eq!(milled.len(), 2);
        assert!(lib.is_empty());
    }

    #[test]
    fn take_named_removes_exactly_one() {
        let mut lib = Library::new();
        lib.restock(vec![creature("A", 1), creature("B", 2), creature("A", 1)]);
        assert!(lib.take_named("A").is_some());
        assert_eq!(lib.len(), 2);
        assert!(lib.contains_named("A"));
    }

    #[test]
    fn pile_drain_creatures_keeps_rest() {
        let mut pile = Pile::new();
        pile.add(creature("A", 1));
        pile.add(forest());
        pile.add(creature("B", 2));
        let creatures = pile.drain_creatures();
        assert_eq!(creatures.len(), 2);
        assert_eq!(creatures[0].name(), "A");
        assert_eq!(pile.len(), 1);
        assert!(pile.cards()[0].is_land());
    }

    #[test]
    fn permanent_copy_identity() {
        let mut perm = Permanent::new(creature("Stand-In", 4), 3);
        assert!(perm.answers_to("Stand-In"));
        perm.copy_of = Some(Box::new(creature("Original", 6)));
        assert!(perm.answers_to("Original"));
        assert!(perm.answers_to("Stand-In"));
        // power stays the permanent's own
        assert_eq!(perm.power(), 4);
    }

    #[test]
    fn impending_shell_is_not_awake() {
        let mut perm = Permanent::new(creature("Sleeper", 6), 1);
        perm.add_time_counters(2);
        assert!(!perm.is_awake_creature());
        perm.tick_down();
        perm.tick_down();
        assert!(perm.is_awake_creature());
    }

    #[test]
    fn tokens_excluded_from_deck_count() {
        let mut field = Battlefield::new();
        field.add(Permanent::new(creature("A", 1), 1));
        field.add(Permanent::token(creature("T", 5), 1));
        assert_eq!(field.len(), 2);
        assert_eq!(field.deck_card_count(), 1);
    }
}
