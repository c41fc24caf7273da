use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five mana colors plus colorless.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "C")]
    Colorless,
}

pub const ALL_COLORS: [Color; 6] = [
    Color::White,
    Color::Blue,
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Colorless,
];

impl Color {
    fn slot(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Colorless => 'C',
        }
    }
}

/// Small set of colors, one bit per color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const EMPTY: ColorSet = ColorSet(0);
    pub const ANY: ColorSet = ColorSet(0b11_1111);

    pub fn of(colors: &[Color]) -> Self {
        let mut set = ColorSet::EMPTY;
        for &c in colors {
            set.insert(c);
        }
        set
    }

    pub fn only(color: Color) -> Self {
        ColorSet(1 << color.slot())
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= 1 << color.slot();
    }

    pub fn contains(self, color: Color) -> bool {
        self.0 & (1 << color.slot()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn union(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    /// Lowest-ordered member, WUBRGC order.
    pub fn first(self) -> Option<Color> {
        ALL_COLORS.iter().copied().find(|&c| self.contains(c))
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        ALL_COLORS.into_iter().filter(move |&c| self.contains(c))
    }
}

/// Per-color counters. Backs both cost pips and the mana pool.
///
/// Serialized as a map of color letters to counts, e.g. `{"U": 1, "B": 2}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Color, u32>", into = "BTreeMap<Color, u32>")]
pub struct PipCounts([u32; 6]);

impl PipCounts {
    pub fn get(&self, color: Color) -> u32 {
        self.0[color.slot()]
    }

    pub fn add(&mut self, color: Color, amount: u32) {
        self.0[color.slot()] += amount;
    }

    pub fn subtract(&mut self, color: Color, amount: u32) {
        debug_assert!(
            self.0[color.slot()] >= amount,
            "counter for {color:?} would go negative"
        );
        self.0[color.slot()] = self.0[color.slot()].saturating_sub(amount);
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn clear(&mut self) {
        self.0 = [0; 6];
    }

    /// `(color, count)` pairs in fixed WUBRGC order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        ALL_COLORS.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl From<BTreeMap<Color, u32>> for PipCounts {
    fn from(map: BTreeMap<Color, u32>) -> Self {
        let mut pips = PipCounts::default();
        for (color, count) in map {
            pips.add(color, count);
        }
        pips
    }
}

impl From<PipCounts> for BTreeMap<Color, u32> {
    fn from(pips: PipCounts) -> Self {
        pips.iter().filter(|(_, n)| *n > 0).collect()
    }
}

/// A mana cost: a generic amount plus per-color pip requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaCost {
    #[serde(default)]
    pub generic: u32,
    #[serde(default)]
    pub pips: PipCounts,
}

impl ManaCost {
    pub fn mana_value(&self) -> u32 {
        self.generic + self.pips.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_set_basics() {
        let mut set = ColorSet::EMPTY;
        assert!(set.is_empty());
        set.insert(Color::Blue);
        set.insert(Color::Green);
        assert!(set.contains(Color::Blue));
        assert!(!set.contains(Color::Black));
        assert_eq!(set.len(), 2);
        assert_eq!(set.first(), Some(Color::Blue));
    }

    #[test]
    fn pip_counts_roundtrip_serde() {
        let mut pips = PipCounts::default();
        pips.add(Color::Blue, 1);
        pips.add(Color::Black, 2);
        let json = serde_json::to_string(&pips).unwrap();
        assert_eq!(json, r#"{"U":1,"B":2}"#);
        let back: PipCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pips);
    }

    #[test]
    fn mana_value_sums_all_components() {
        let cost = ManaCost {
            generic: 2,
            pips: {
                let mut p = PipCounts::default();
                p.add(Color::Black, 1);
                p.add(Color::Green, 1);
                p
            },
        };
        assert_eq!(cost.mana_value(), 4);
    }

    #[test]
    fn cost_deserializes_with_defaults() {
        let cost: ManaCost = serde_json::from_str(r#"{"generic": 5}"#).unwrap();
        assert_eq!(cost.generic, 5);
        assert_eq!(cost.pips.total(), 0);
    }
}
