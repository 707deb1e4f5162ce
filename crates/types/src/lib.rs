//! Canonical value objects for the four ledger entities a verifying client
//! re-hashes: block headers, transactions, accounts and transaction
//! receipts.
//!
//! Every type is built fresh from an untrusted JSON-RPC payload (or from
//! raw canonical bytes), normalizes its fields through
//! [`ethcanon_primitives::buffer`], and serializes to the exact byte
//! sequence whose keccak256 digest the caller compares against the remote
//! node's claim.

pub mod account;
pub mod conversions;
pub mod error;
pub mod header;
pub mod receipt;
mod rpc;
pub mod transaction;

pub use account::Account;
pub use conversions::{header_from_hex, header_to_hex};
pub use error::ObjectError;
pub use header::BlockHeader;
pub use receipt::Receipt;
pub use transaction::Transaction;

pub use ethcanon_primitives::{Item, EMPTY_HASH, EMPTY_TRIE_ROOT};
