//! Secret key generation.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use secp256k1::SecretKey;

use crate::error::MiningError;

/// Secret key length in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// Supplies each worker with its own random stream.
pub trait EntropySource: Send + Sync + 'static {
    type Rng: RngCore + Send + 'static;

    /// Creates the stream for one worker. Fails when no secure randomness
    /// is available on this host.
    fn rng_for(&self, worker_id: usize) -> Result<Self::Rng, MiningError>;
}

/// Operating-system entropy.
///
/// Each worker gets a ChaCha-based `StdRng` seeded from the OS source, so the
/// hot loop never issues a syscall per key.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    type Rng = StdRng;

    fn rng_for(&self, _worker_id: usize) -> Result<StdRng, MiningError> {
        StdRng::from_rng(OsRng).map_err(|e| MiningError::EntropyUnavailable(e.to_string()))
    }
}

/// Reproducible key streams for tests and benchmarks.
///
/// Never use for keys that will hold funds.
#[derive(Debug, Clone, Copy)]
pub struct SeededEntropy {
    seed: u64,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl EntropySource for SeededEntropy {
    type Rng = StdRng;

    fn rng_for(&self, worker_id: usize) -> Result<StdRng, MiningError> {
        let worker_seed = self
            .seed
            .wrapping_add((worker_id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Ok(StdRng::seed_from_u64(worker_seed))
    }
}

/// Draws secret keys from a random stream.
pub struct KeyGenerator<R> {
    rng: R,
    buf: [u8; SECRET_KEY_LEN],
}

impl<R: RngCore> KeyGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            buf: [0u8; SECRET_KEY_LEN],
        }
    }

    /// Produces the next secret key.
    ///
    /// Draws that are zero or not below the curve order are discarded and
    /// redrawn.
    #[inline]
    pub fn next_key(&mut self) -> Result<SecretKey, MiningError> {
        loop {
            self.rng
                .try_fill_bytes(&mut self.buf)
                .map_err(|e| MiningError::EntropyUnavailable(e.to_string()))?;

            if let Ok(secret_key) = SecretKey::from_slice(&self.buf) {
                return Ok(secret_key);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FailingRng;
    use super::*;

    #[test]
    fn test_os_keys_differ() {
        let mut keys = KeyGenerator::new(OsEntropy.rng_for(0).unwrap());
        let first = keys.next_key().unwrap();
        let second = keys.next_key().unwrap();
        assert_ne!(first.secret_bytes(), second.secret_bytes());
    }

    #[test]
    fn test_seeded_stream_is_reproducible() {
        let entropy = SeededEntropy::new(7);
        let mut a = KeyGenerator::new(entropy.rng_for(3).unwrap());
        let mut b = KeyGenerator::new(entropy.rng_for(3).unwrap());
        for _ in 0..4 {
            assert_eq!(
                a.next_key().unwrap().secret_bytes(),
                b.next_key().unwrap().secret_bytes()
            );
        }
    }

    #[test]
    fn test_seeded_workers_get_distinct_streams() {
        let entropy = SeededEntropy::new(7);
        let mut a = KeyGenerator::new(entropy.rng_for(0).unwrap());
        let mut b = KeyGenerator::new(entropy.rng_for(1).unwrap());
        assert_ne!(
            a.next_key().unwrap().secret_bytes(),
            b.next_key().unwrap().secret_bytes()
        );
    }

    #[test]
    fn test_exhausted_entropy_is_reported() {
        let mut keys = KeyGenerator::new(FailingRng);
        match keys.next_key() {
            Err(MiningError::EntropyUnavailable(message)) => {
                assert!(message.contains("offline"));
            }
            other => panic!("unexpected: {:?}", other.map(|k| k.secret_bytes())),
        }
    }
}
