//! Card names the heuristics key on. Kept in one place so decision code
//! never scatters string literals.

pub const SPIDER_MAN: &str = "Superior Spider-Man";
pub const BRINGER: &str = "Bringer of the Last Gift";
pub const TERROR: &str = "Terror of the Peaks";
pub const ARDYN: &str = "Ardyn, the Usurper";
pub const OVERLORD: &str = "Overlord of the Balemurk";
pub const KIORA: &str = "Kiora, the Rising Tide";
pub const TOWN_GREETER: &str = "Town Greeter";
pub const CACHE_GRAB: &str = "Cache Grab";
pub const DREDGERS_INSIGHT: &str = "Dredger's Insight";
pub const AWAKEN: &str = "Awaken the Honored Dead";

pub const DEMON: &str = "Demon";

/// Cheap creatures that dig the library; reanimating one keeps the chain
/// going when no better copy target exists.
pub const MILL_ENGINES: [&str; 3] = [OVERLORD, KIORA, TOWN_GREETER];

/// Cards that must stay in the graveyard for the reanimation to matter.
/// Mill-return effects never pick these back up.
pub const NEVER_RETURN: [&str; 2] = [BRINGER, TERROR];
