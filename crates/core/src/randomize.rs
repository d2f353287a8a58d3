use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Element, Node};
use crate::model::markup::for_each_element_mut;

/// Values a placeholder can take.
pub const PLACEHOLDER_RANGE: RangeInclusive<u32> = 1..=12;

/// Where a `Randomizer` draws its numbers from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomSource {
    /// Seeded from the operating system; every run differs.
    #[default]
    Entropy,
    /// Deterministic stream, for tests.
    Seeded(u64),
}

/// Fills numeric placeholders in instantiated fragments.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    #[must_use]
    pub fn new(source: RandomSource) -> Self {
        let rng = match source {
            RandomSource::Entropy => StdRng::from_os_rng(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(seed),
        };
        Self { rng }
    }

    /// One uniform draw from [`PLACEHOLDER_RANGE`].
    pub fn draw(&mut self) -> u32 {
        self.rng.random_range(PLACEHOLDER_RANGE)
    }

    /// Replaces the text of every element carrying `marker` with a fresh
    /// draw. Returns how many placeholders were filled.
    pub fn fill(&mut self, nodes: &mut [Node], marker: &str) -> usize {
        let mut filled = 0;
        for_each_element_mut(nodes, &mut |el: &mut Element| {
            if el.has_attr(marker) {
                el.set_text(self.draw().to_string());
                filled += 1;
            }
        });
        filled
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(RandomSource::Entropy)
    }
}
