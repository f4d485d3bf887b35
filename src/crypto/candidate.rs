//! Per-iteration candidate: a secret key and its derived address.

use rand::RngCore;
use secp256k1::SecretKey;

use crate::error::MiningError;

use super::{Address, AddressDeriver, KeyGenerator};

/// One generated key and the address it derives to.
///
/// Lives on the worker's stack for a single iteration and is dropped unless
/// it matches.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    secret_key: SecretKey,
    address: Address,
}

impl Candidate {
    /// Draws a fresh key and derives its address.
    #[inline]
    pub fn generate<R: RngCore>(
        keys: &mut KeyGenerator<R>,
        deriver: &AddressDeriver,
    ) -> Result<Self, MiningError> {
        let secret_key = keys.next_key()?;
        let address = deriver.derive(&secret_key);
        Ok(Self {
            secret_key,
            address,
        })
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_address_from_hex, EntropySource, SeededEntropy};

    #[test]
    fn test_candidate_generation() {
        let mut keys = KeyGenerator::new(SeededEntropy::new(1).rng_for(0).unwrap());
        let candidate = Candidate::generate(&mut keys, &AddressDeriver::new()).unwrap();
        assert_eq!(candidate.private_key_hex().len(), 64);
        assert_eq!(candidate.address().as_bytes().len(), 20);
    }

    #[test]
    fn test_private_key_reproduces_address() {
        let mut keys = KeyGenerator::new(SeededEntropy::new(2).rng_for(0).unwrap());
        let candidate = Candidate::generate(&mut keys, &AddressDeriver::new()).unwrap();
        assert_eq!(
            derive_address_from_hex(&candidate.private_key_hex()).unwrap(),
            candidate.address().to_hex_prefixed()
        );
    }
}
