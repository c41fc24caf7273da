//! Random-search land optimizer: hold the spells fixed, resample the mana
//! base, and keep whatever wins fastest.

use std::collections::BTreeMap;
use std::io::Write as _;

use crate::card::{Card, CardRegistry, RegistryError};
use crate::rng::SimRng;

/// A mana base: land name to copy count. Ordered so printing and iteration
/// are deterministic.
pub type LandConfig = BTreeMap<String, usize>;

#[derive(Debug, Clone, Copy)]
pub struct LandSlot {
    pub name: &'static str,
    pub max: usize,
}

pub const LAND_BUDGET: usize = 24;

/// Every land the searcher may use, with per-deck copy limits.
pub fn land_pool() -> Vec<LandSlot> {
    vec![
        LandSlot { name: "Forest", max: 4 },
        LandSlot { name: "Island", max: 4 },
        LandSlot { name: "Swamp", max: 4 },
        LandSlot { name: "Watery Grave", max: 4 },
        LandSlot { name: "Undercity Sewers", max: 4 },
        LandSlot { name: "Underground Mortuary", max: 4 },
        LandSlot { name: "Cavern of Souls", max: 4 },
        LandSlot { name: "Restless Cottage", max: 1 },
        LandSlot { name: "Wastewood Verge", max: 4 },
        LandSlot { name: "Gloomlake Verge", max: 4 },
        LandSlot { name: "Multiversal Passage", max: 4 },
        LandSlot { name: "Blooming Marsh", max: 4 },
        LandSlot { name: "Starting Town", max: 4 },
    ]
}

/// Weighted strategy: random counts per land type under the copy limits,
/// topping up until the budget is spent.
pub fn random_config_weighted(rng: &mut SimRng) -> LandConfig {
    let mut config = LandConfig::new();
    let mut remaining = LAND_BUDGET;
    let mut pool = land_pool();
    rng.shuffle(&mut pool);

    for slot in &pool {
        let ceiling = slot.max.min(remaining);
        let count = rng.index(ceiling + 1);
        if count > 0 {
            config.insert(slot.name.to_string(), count);
        }
        remaining -= count;
    }

    let mut attempts = 0;
    while remaining > 0 && attempts < 1000 {
        let slot = &pool[rng.index(pool.len())];
        let entry = config.entry(slot.name.to_string()).or_insert(0);
        if *entry < slot.max {
            *entry += 1;
            remaining -= 1;
        }
        attempts += 1;
    }

    config
}

/// Shuffle strategy: shuffle a pool holding max copies of everything and
/// take the first budget's worth.
pub fn random_config_shuffle(rng: &mut SimRng) -> LandConfig {
    let mut pool: Vec<&'static str> = Vec::new();
    for slot in land_pool() {
        pool.extend(std::iter::repeat(slot.name).take(slot.max));
    }
    rng.shuffle(&mut pool);

    let mut config = LandConfig::new();
    for name in pool.into_iter().take(LAND_BUDGET) {
        *config.entry(name.to_string()).or_insert(0) += 1;
    }
    config
}

/// Assemble a full deck: the fixed spell package plus the sampled lands.
pub fn build_deck(
    config: &LandConfig,
    spells: &[(String, usize)],
    registry: &CardRegistry,
) -> Result<Vec<Card>, RegistryError> {
    let mut deck = Vec::new();
    for (name, count) in spells {
        let card = registry.get(name)?;
        deck.extend(std::iter::repeat_with(|| card.clone()).take(*count));
    }
    for (name, count) in config {
        let card = registry.get(name)?;
        deck.extend(std::iter::repeat_with(|| card.clone()).take(*count));
    }
    Ok(deck)
}

/// One-line description, highest counts first, names breaking ties.
pub fn config_line(config: &LandConfig) -> String {
    let mut entries: Vec<(&String, &usize)> =
        config.iter().filter(|(_, count)| **count > 0).collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .iter()
        .map(|(name, count)| format!("{count} {name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything worth recording alongside a saved configuration.
pub struct SaveParams<'a> {
    pub win_rate: f64,
    pub average_win_turn: f64,
    pub games_per_config: usize,
    pub strategy: &'a str,
    pub win_turns: &'a BTreeMap<u32, usize>,
    pub spells: &'a [(String, usize)],
}

/// Write the winning deck to a timestamped file and return its name.
pub fn save_deck(config: &LandConfig, params: &SaveParams) -> std::io::Result<String> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("optimized-deck-{stamp}.txt");
    let mut file = std::fs::File::create(&filename)?;

    writeln!(file, "# optimized mana base ({} strategy)", params.strategy)?;
    writeln!(
        file,
        "# win rate {:.1}% over {} games, average win turn {:.3}",
        params.win_rate * 100.0,
        params.games_per_config,
        params.average_win_turn
    )?;
    if !params.win_turns.is_empty() {
        let spread: Vec<String> = params
            .win_turns
            .iter()
            .map(|(turn, count)| format!("t{turn}:{count}"))
            .collect();
        writeln!(file, "# win turns: {}", spread.join(" "))?;
    }
    writeln!(file)?;
    for (name, count) in params.spells {
        writeln!(file, "{count} {name}")?;
    }
    writeln!(file)?;
    let mut lands: Vec<(&String, &usize)> =
        config.iter().filter(|(_, count)| **count > 0).collect();
    lands.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (name, count) in lands {
        writeln!(file, "{count} {name}")?;
    }

    Ok(filename)
}
