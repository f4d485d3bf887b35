//! # vanity_miner
//!
//! Parallel vanity address miner: finds a secp256k1 private key whose
//! Keccak-256 derived address starts and/or ends with chosen hex digits.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and address derivation
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Search workers and the session coordinator
//! - `config`: Search requests and CLI configuration
//! - `error`: Error types

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod worker;

pub use config::{default_worker_count, Config, MiningRequest};
pub use crypto::{derive_address, derive_address_from_hex, Address, AddressEncoding, Candidate};
pub use error::{ConfigError, MiningError};
pub use matcher::{matches, Pattern};
pub use worker::{Coordinator, CoordinatorOptions, MinerEvent, MiningResult};
