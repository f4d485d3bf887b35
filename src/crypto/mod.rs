//! Cryptographic operations for key generation and address derivation.
//!
//! This module provides:
//! - Secret key generation from a pluggable entropy source
//! - Address derivation (secp256k1 public key, Keccak-256, last 20 bytes)
//! - Address encodings (lowercase hex and EIP-55 checksum)

mod address;
mod candidate;
mod deriver;
mod keygen;

pub use address::{Address, AddressEncoding, ADDRESS_LEN, ADDRESS_MARKER, ENCODED_LEN};
pub use candidate::Candidate;
pub use deriver::{derive_address, derive_address_from_hex, public_key_address, AddressDeriver};
pub use keygen::{EntropySource, KeyGenerator, OsEntropy, SeededEntropy, SECRET_KEY_LEN};

#[cfg(test)]
pub(crate) use keygen::testing;
