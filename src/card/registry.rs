use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::card::model::Card;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read card file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed card data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown card: {0}")]
    UnknownCard(String),
    #[error("card registry is empty")]
    Empty,
}

/// Immutable card database, loaded once at startup and only read afterwards.
pub struct CardRegistry {
    cards: HashMap<String, Card>,
}

impl CardRegistry {
    /// Load definitions from a JSON array of cards.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        let defs: Vec<Card> = serde_json::from_str(&raw)?;
        if defs.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self::from_cards(defs))
    }

    pub fn from_cards(defs: Vec<Card>) -> Self {
        let cards = defs
            .into_iter()
            .map(|card| (card.name().to_string(), card))
            .collect();
        CardRegistry { cards }
    }

    /// Fetch an owned copy of a definition; unknown names are hard errors so
    /// a bad deck list fails before any game starts.
    pub fn get(&self, name: &str) -> Result<Card, RegistryError> {
        self.cards
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCard(name.to_string()))
    }

    pub fn lookup(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cards.keys().map(String::as_str)
    }
}
