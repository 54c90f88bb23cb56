//! Deterministic random streams
//!
//! Every pipeline stage draws from its own ChaCha8 stream whose seed is mixed
//! from the master seed and the stage name. A stream's draws therefore depend
//! only on (seed, name), never on which other stages ran before it.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> StageRng<'_> {
        let seed = derive_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        StageRng { inner: entry }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

fn derive_seed(master_seed: u64, name: &str) -> u64 {
    // FNV-1a over the stream name, then mixed into the master seed
    let mut name_hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        name_hash ^= byte as u64;
        name_hash = name_hash.wrapping_mul(0x0100_0000_01b3);
    }
    let mut seed = master_seed;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= name_hash;
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub struct StageRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StageRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);

        let val1: f64 = a.stream("regions").gen();
        let val2: f64 = b.stream("regions").gen();

        assert_eq!(val1, val2, "Same seed should produce same values");
    }

    #[test]
    fn streams_do_not_depend_on_request_order() {
        let mut a = RngManager::new(7);
        let _: u64 = a.stream("dates").gen();
        let first: u64 = a.stream("severity").gen();

        let mut b = RngManager::new(7);
        let second: u64 = b.stream("severity").gen();

        assert_eq!(first, second);
    }

    #[test]
    fn named_streams_diverge() {
        let mut rng = RngManager::new(42);

        let val1: u64 = rng.stream("gdp").gen();
        let val2: u64 = rng.stream("density").gen();

        assert_ne!(val1, val2);
    }

    #[test]
    fn stream_state_persists_between_requests() {
        let mut rng = RngManager::new(42);
        let val1: u64 = rng.stream("aid").gen();
        let val2: u64 = rng.stream("aid").gen();
        assert_ne!(val1, val2);
    }
}
