//! Private key to address derivation.

use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};
use tiny_keccak::{Hasher, Keccak};

use crate::error::MiningError;

use super::address::{Address, ADDRESS_LEN, ADDRESS_MARKER};
use super::keygen::SECRET_KEY_LEN;

/// Derives addresses from secret keys.
///
/// Holds a signing-only secp256k1 context so the (expensive) precomputed
/// tables are built once per worker rather than once per key.
pub struct AddressDeriver {
    secp: Secp256k1<SignOnly>,
}

impl AddressDeriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
        }
    }

    /// Derives the address for a secret key.
    #[inline]
    pub fn derive(&self, secret_key: &SecretKey) -> Address {
        let public_key = PublicKey::from_secret_key(&self.secp, secret_key);
        public_key_address(&public_key)
    }
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives an address from a secp256k1 public key.
///
/// Process:
/// 1. Serialize the public key in uncompressed form (65 bytes)
/// 2. Remove the first byte (0x04 prefix)
/// 3. Hash the remaining 64 bytes with Keccak-256
/// 4. Take the last 20 bytes of the hash
#[inline]
pub fn public_key_address(public_key: &PublicKey) -> Address {
    let public_key_bytes = public_key.serialize_uncompressed();

    let mut hasher = Keccak::v256();
    hasher.update(&public_key_bytes[1..]);

    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut address_bytes = [0u8; ADDRESS_LEN];
    address_bytes.copy_from_slice(&hash[32 - ADDRESS_LEN..]);

    Address::from_bytes(address_bytes)
}

/// Derives the lowercase `0x`-prefixed address for a secret key.
pub fn derive_address(secret_key: &SecretKey) -> String {
    AddressDeriver::new().derive(secret_key).to_hex_prefixed()
}

/// Derives the lowercase address for a hex-encoded private key.
///
/// Accepts the key with or without a `0x` marker.
pub fn derive_address_from_hex(private_key: &str) -> Result<String, MiningError> {
    let digits = private_key
        .strip_prefix(ADDRESS_MARKER)
        .unwrap_or(private_key);

    let bytes = hex::decode(digits).map_err(|e| MiningError::InvalidPrivateKey(e.to_string()))?;
    if bytes.len() != SECRET_KEY_LEN {
        return Err(MiningError::InvalidPrivateKey(format!(
            "expected {} bytes, got {}",
            SECRET_KEY_LEN,
            bytes.len()
        )));
    }

    let secret_key =
        SecretKey::from_slice(&bytes).map_err(|e| MiningError::InvalidPrivateKey(e.to_string()))?;
    Ok(derive_address(&secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_known_address() {
        // Address for private key = 1 is well-known
        assert_eq!(
            derive_address_from_hex(KEY_ONE).unwrap(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_accepts_marker() {
        let with_marker = format!("0x{}", KEY_ONE);
        assert_eq!(
            derive_address_from_hex(&with_marker).unwrap(),
            derive_address_from_hex(KEY_ONE).unwrap()
        );
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let secret_key = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let deriver = AddressDeriver::new();
        assert_eq!(deriver.derive(&secret_key), deriver.derive(&secret_key));
        assert_eq!(derive_address(&secret_key), derive_address(&secret_key));
        assert_eq!(
            derive_address(&secret_key),
            deriver.derive(&secret_key).to_hex_prefixed()
        );
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(derive_address_from_hex("zz").is_err());
        assert!(derive_address_from_hex("0101").is_err());
        // Zero is not a valid scalar
        assert!(derive_address_from_hex(&"0".repeat(64)).is_err());
    }
}
