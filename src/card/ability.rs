use serde::{Deserialize, Serialize};

/// Which milled cards a mill-and-return effect may pick back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnFilter {
    /// Any non-instant, non-sorcery card.
    Permanent,
    /// Lands only.
    Land,
}

/// Closed set of ability effects. Resolution dispatches on this enum so the
/// compiler checks exhaustiveness; cards reference effects, not the other way
/// around, and new cards can reuse an existing effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Ability {
    /// Mill `count`, then optionally return one matching card to hand.
    MillThenReturn { count: u32, filter: ReturnFilter },
    /// Draw, then discard, in that order.
    DrawThenDiscard { draw: u32, discard: u32 },
    /// On entry, copy a creature card out of the graveyard (exiling it) and
    /// resolve the copied card's own entry effect.
    CopyFromGraveyard,
    /// On entry, sacrifice every other non-impending creature, then return
    /// all creature cards from the graveyard to the battlefield.
    MassReanimate,
    /// Whenever another creature enters, deal damage equal to its power.
    DamageOnEntry,
    /// Static: Demons can attack the turn they enter.
    GrantDemonsHaste,
    /// At the beginning of combat, exile a creature card from the graveyard
    /// and create a 5/5 Demon token copy of it.
    CombatExileToken,
}

/// Saga chapter effects, resolved as lore counters accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Chapter {
    /// Chapter whose effect has no target while goldfishing.
    Skip,
    Mill { count: u32 },
    /// Return a creature card from the graveyard to hand, or failing that,
    /// search the library for one.
    RecoverCreature,
}
