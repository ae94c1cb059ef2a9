//! # ABI Type Registry & Codec
//!
//! The typed parameter encoding for contract calls and return data,
//! independent of the RLP layer:
//!
//! ```text
//! types.rs     — Type-name resolution into concrete descriptors
//! codec.rs     — 32-byte-word encoding/decoding with head/tail offsets
//! interface.rs — Parsed interface records, selectors, call data
//! ```
//!
//! The three layers compose: resolve `"uint256[]"` to a descriptor,
//! encode a value against it, or hand a whole parsed interface entry to
//! [`AbiFunction`] and get selector-prefixed call data. Everything fails
//! closed — unresolvable names, out-of-range values, and malformed
//! encodings are errors at the point of failure, never best-effort
//! results.

pub mod codec;
pub mod interface;
pub mod types;

pub use codec::{decode, decode_arguments, encode, encode_arguments, AbiValue};
pub use interface::{AbiEntry, AbiFunction, AbiParam};
pub use types::{AbiError, AbiType};
