use crate::Rand;
use xrand::distributions::Alphanumeric;
use xrand::rngs::{OsRng, StdRng};
use xrand::{Rng, RngCore, SeedableRng};

fn below<R: RngCore>(rng: &mut R, bound: u32) -> u32 {
    assert!(bound > 0, "the bound must be greater than zero");
    rng.gen_range(0..bound)
}

fn alphanumeric<R: RngCore>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 默认使用OsRng <br>
#[derive(Copy, Clone, Default)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }

    fn rand_below(&mut self, bound: u32) -> u32 {
        below(&mut self.rng, bound)
    }

    fn rand_alphanumeric(&mut self, len: usize) -> String {
        alphanumeric(&mut self.rng, len)
    }
}

/// Deterministic generator, the same seed always yields the same stream.
///
/// Only meant for reproducible tests and fixtures, never for real keys.
#[derive(Clone)]
pub struct SeedRand {
    rng: StdRng,
}

impl SeedRand {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Rand for SeedRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }

    fn rand_below(&mut self, bound: u32) -> u32 {
        below(&mut self.rng, bound)
    }

    fn rand_alphanumeric(&mut self, len: usize) -> String {
        alphanumeric(&mut self.rng, len)
    }
}
