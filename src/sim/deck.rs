use std::path::Path;

use thiserror::Error;

use crate::card::{Card, CardRegistry, RegistryError};

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("failed to read deck file: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad deck line {line}: {reason}")]
    BadLine { line: usize, reason: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Parse a deck list into the expanded card sequence. Lines are
/// `"<count> <card name>"`; `#` and `//` start comments. Unknown names are
/// fatal before any game starts.
pub fn parse_deck_file(
    path: impl AsRef<Path>,
    registry: &CardRegistry,
) -> Result<Vec<Card>, DeckError> {
    let raw = std::fs::read_to_string(path)?;
    parse_deck(&raw, registry)
}

pub fn parse_deck(raw: &str, registry: &CardRegistry) -> Result<Vec<Card>, DeckError> {
    let mut deck = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        let Some((count_str, name)) = trimmed.split_once(' ') else {
            return Err(DeckError::BadLine {
                line: i + 1,
                reason: "expected '<count> <card name>'".into(),
            });
        };
        let count: usize = count_str.parse().map_err(|_| DeckError::BadLine {
            line: i + 1,
            reason: format!("'{count_str}' is not a count"),
        })?;

        let card = registry.get(name.trim())?;
        deck.extend(std::iter::repeat_with(|| card.clone()).take(count));
    }
    Ok(deck)
}

/// Count each named card in a deck list, keeping only non-lands. The land
/// optimizer holds these fixed while it searches the mana base.
pub fn spell_counts(deck: &[Card]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for card in deck.iter().filter(|c| !c.is_land()) {
        match counts.iter_mut().find(|(name, _)| name == card.name()) {
            Some((_, n)) => *n += 1,
            None => counts.push((card.name().to_string(), 1)),
        }
    }
    counts
}
