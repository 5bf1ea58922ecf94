use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform integer source the engine and presenter draw from. Swapped for a
/// seeded or scripted source in tests.
pub trait UniformSource {
    /// Uniform value in `[0, upper)`. `upper` must be non-zero.
    fn below(&mut self, upper: u32) -> u32;

    /// Uniform value in `[low, high]`
    fn between_inclusive(&mut self, low: u32, high: u32) -> u32 {
        low + self.below(high - low + 1)
    }
}

/// Production source backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RandSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandSource<StdRng> {
    /// Entropy-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformSource for RandSource<R> {
    fn below(&mut self, upper: u32) -> u32 {
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of values, cycling when exhausted. Values are
/// reduced into range, so a script can be written in terms of the outcome
/// it wants (`below(10)` fed `3` returns `3`).
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, next: 0 }
    }

    fn pop(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

impl UniformSource for ScriptedSource {
    fn below(&mut self, upper: u32) -> u32 {
        self.pop() % upper
    }

    fn between_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.pop().clamp(low, high)
    }
}
