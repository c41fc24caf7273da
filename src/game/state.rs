use crate::game::mana::ManaPool;
use crate::game::zones::{Battlefield, Library, Pile};

pub const STARTING_LIFE: i32 = 20;
pub const MAX_TURNS: u32 = 20;
pub const HAND_LIMIT: usize = 7;

/// Turn phases in fixed cyclic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main1,
    Combat,
    Main2,
    End,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Untap => Phase::Upkeep,
            Phase::Upkeep => Phase::Draw,
            Phase::Draw => Phase::Main1,
            Phase::Main1 => Phase::Combat,
            Phase::Combat => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::End => Phase::Untap,
        }
    }
}

/// All mutable state for one game. Created once per game, never shared.
#[derive(Debug, Clone)]
pub struct GameState {
    pub library: Library,
    pub hand: Pile,
    pub graveyard: Pile,
    pub exile: Pile,
    pub battlefield: Battlefield,

    pub turn: u32,
    pub phase: Phase,
    pub on_the_play: bool,
    pub land_drop_used: bool,

    pub life: i32,
    pub opponent_life: i32,

    pub pool: ManaPool,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            library: Library::new(),
            hand: Pile::new(),
            graveyard: Pile::new(),
            exile: Pile::new(),
            battlefield: Battlefield::new(),
            turn: 0,
            phase: Phase::Untap,
            on_the_play: false,
            land_drop_used: false,
            life: STARTING_LIFE,
            opponent_life: STARTING_LIFE,
            pool: ManaPool::new(),
        }
    }

    /// Move the top library card to hand. False when the library is empty;
    /// running out of cards is not a loss here.
    pub fn draw_card(&mut self) -> bool {
        match self.library.draw() {
            Some(card) => {
                self.hand.add(card);
                true
            }
            None => false,
        }
    }

    pub fn has_won(&self) -> bool {
        self.opponent_life <= 0
    }

    /// Every deck card currently tracked across all zones. Constant for the
    /// whole game; checked by tests after destructive resolutions.
    pub fn deck_card_total(&self) -> usize {
        self.library.len()
            + self.hand.len()
            + self.graveyard.len()
            + self.exile.len()
            + self.battlefield.deck_card_count()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
