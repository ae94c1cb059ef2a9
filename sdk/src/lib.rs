// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # VELA Client SDK
//!
//! The codec and confirmation core for talking to the VELA network:
//! everything between "I want to send this transaction" and "the chain
//! has seen it", *except* the network itself. Transport, key storage, and
//! contract conveniences live elsewhere; this crate is pure computation
//! plus one carefully-fenced background task.
//!
//! ## Architecture
//!
//! The modules mirror the actual layers of the wire format:
//!
//! - **rlp** — The canonical recursive binary encoding everything else
//!   is built on. Strict: every value has exactly one encoding, and the
//!   decoder proves it by rejecting the rest.
//! - **abi** — The 32-byte-word parameter encoding for contract calls.
//!   Type names in, call data out, hard errors in between.
//! - **crypto** — Keccak-256, secp256k1 keypairs, recoverable
//!   signatures, address derivation. Nothing exotic; no unsafe.
//! - **account** — The on-chain authorization model, from "one key, one
//!   address" up to weighted multi-signature and role-based composites.
//! - **transaction** — Every supported transaction kind as a typed
//!   value: field order, signing digest, wire encoding, and signer
//!   recovery per variant.
//! - **confirm** — Three strategies for learning whether a submitted
//!   hash made it into a block, from fire-and-forget to a background
//!   sweep with callbacks.
//!
//! ## Design Philosophy
//!
//! 1. Decode failure is mandatory, never advisory — a value that exists
//!    upholds its invariants.
//! 2. The codec layers are pure and thread-agnostic; concurrency lives
//!    in exactly one place (the queuing sweep) and owns its lifetime.
//! 3. If it signs money away, it has a golden-vector test.

pub mod abi;
pub mod account;
pub mod confirm;
pub mod crypto;
pub mod rlp;
pub mod transaction;
