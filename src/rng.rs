/// Seeded pseudo-random generator used for every in-game random decision.
///
/// The mixing function is fixed by contract: game traces must reproduce
/// bit-for-bit across implementations given the same 32-bit seed, so the
/// generator cannot be swapped for a library RNG.
#[derive(Debug, Clone)]
pub struct SimRng {
    state: u32,
    seed: u32,
}

impl SimRng {
    pub fn new(seed: u32) -> Self {
        SimRng { state: seed, seed }
    }

    /// The seed this generator was constructed with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    /// Uniform index in [0, bound). Consumes exactly one draw.
    pub fn index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "index bound must be positive");
        (self.next_f64() * bound as f64) as usize
    }

    /// Fisher-Yates shuffle, one draw per swap, last index down to 1.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
