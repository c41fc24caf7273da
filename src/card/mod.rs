pub mod ability;
pub mod cost;
pub mod model;
pub mod names;
pub mod registry;

pub use ability::{Ability, Chapter, ReturnFilter};
pub use cost::{Color, ColorSet, ManaCost, PipCounts, ALL_COLORS};
pub use model::{
    BasicType, Card, Creature, EntersTapped, Impending, Land, Production, Saga, Spell,
};
pub use registry::{CardRegistry, RegistryError};
