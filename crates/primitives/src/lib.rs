//! Byte-level primitives shared by the `ethcanon` crates: conversion of
//! loosely-typed RPC values into canonical byte buffers, the nested RLP
//! item type, and the two well-known "empty" digests.
//!
//! Everything here is pure and allocation-only; no I/O, no shared state.

use alloy_primitives::{b256, B256};

pub mod buffer;
pub mod item;

pub use buffer::{to_buffer, to_u64, to_variable_buffer, ByteWidth, ConversionError};
pub use item::Item;

/// keccak256 of the RLP encoding of the empty byte string (`0x80`).
///
/// The root of an empty Merkle-Patricia trie; the default `storageRoot`
/// of an account with no storage.
pub const EMPTY_TRIE_ROOT: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// keccak256 of the empty byte string.
///
/// The default `codeHash` of an account with no code, and the substitute
/// for mandatory header fields the RPC payload did not supply.
pub const EMPTY_HASH: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
