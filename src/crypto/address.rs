//! Address value type and its textual encodings.

use std::fmt;

use tiny_keccak::{Hasher, Keccak};

/// Raw address length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Marker prepended to every encoded address.
pub const ADDRESS_MARKER: &str = "0x";

/// Length of an encoded address: marker plus two hex digits per byte.
pub const ENCODED_LEN: usize = ADDRESS_MARKER.len() + ADDRESS_LEN * 2;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// How an address is rendered before it is matched or reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressEncoding {
    /// Lowercase hex, `0x` marker.
    #[default]
    Lowercase,
    /// EIP-55 mixed-case checksum, `0x` marker.
    Checksum,
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the address as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Renders the address into a caller-owned buffer and returns it.
    ///
    /// This is the hot-path encoder: no heap allocation, the buffer is
    /// reused across iterations by the worker.
    #[inline]
    pub fn encode_into<'a>(
        &self,
        encoding: AddressEncoding,
        buf: &'a mut [u8; ENCODED_LEN],
    ) -> &'a [u8] {
        let marker = ADDRESS_MARKER.len();
        buf[..marker].copy_from_slice(ADDRESS_MARKER.as_bytes());

        for (i, byte) in self.0.iter().enumerate() {
            buf[marker + 2 * i] = HEX_DIGITS[(byte >> 4) as usize];
            buf[marker + 2 * i + 1] = HEX_DIGITS[(byte & 0x0f) as usize];
        }

        if encoding == AddressEncoding::Checksum {
            apply_checksum(&mut buf[marker..]);
        }

        &buf[..]
    }

    /// Renders the address as an owned string.
    pub fn encode(&self, encoding: AddressEncoding) -> String {
        let mut buf = [0u8; ENCODED_LEN];
        self.encode_into(encoding, &mut buf)
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the lowercase address with 0x prefix.
    pub fn to_hex_prefixed(&self) -> String {
        self.encode(AddressEncoding::Lowercase)
    }

    /// Returns the address with checksum encoding (EIP-55).
    pub fn to_checksum(&self) -> String {
        self.encode(AddressEncoding::Checksum)
    }
}

/// Uppercases every letter whose nibble in keccak(lowercase hex) is >= 8.
fn apply_checksum(hex_addr: &mut [u8]) {
    let mut hasher = Keccak::v256();
    hasher.update(hex_addr);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    for (i, c) in hex_addr.iter_mut().enumerate() {
        let hash_byte = hash[i / 2];
        let hash_nibble = if i % 2 == 0 {
            hash_byte >> 4
        } else {
            hash_byte & 0x0f
        };

        if c.is_ascii_alphabetic() && hash_nibble >= 8 {
            c.make_ascii_uppercase();
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_prefixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(hex_str: &str) -> Address {
        let bytes: [u8; ADDRESS_LEN] = hex::decode(hex_str).unwrap().try_into().unwrap();
        Address::from_bytes(bytes)
    }

    #[test]
    fn test_checksum_address() {
        // Test vector from EIP-55
        let addr = address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(addr.to_checksum(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_checksum_all_caps_vector() {
        let addr = address("52908400098527886E0F7030069857D2E4169EE7");
        assert_eq!(addr.to_checksum(), "0x52908400098527886E0F7030069857D2E4169EE7");
    }

    #[test]
    fn test_hex_output() {
        let addr = Address::from_bytes([0u8; ADDRESS_LEN]);
        assert_eq!(addr.to_hex(), "0000000000000000000000000000000000000000");
        assert_eq!(
            addr.to_hex_prefixed(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let mut buf = [0u8; ENCODED_LEN];
        let first = address("deadbeef00000000000000000000000000000001");
        let second = address("00000000000000000000000000000000cafebabe");

        let rendered = first.encode_into(AddressEncoding::Lowercase, &mut buf).to_vec();
        assert_eq!(rendered, first.to_hex_prefixed().into_bytes());

        let rendered = second.encode_into(AddressEncoding::Lowercase, &mut buf);
        assert_eq!(rendered, second.to_hex_prefixed().as_bytes());
    }
}
