//! ABI type descriptors and name resolution.
//!
//! Contract interfaces describe parameter types as strings
//! (`"uint256"`, `"bytes32"`, `"uint8[4][]"`, `"(address,uint96)"`).
//! [`AbiType::resolve`] turns those into concrete descriptors, and it
//! fails closed: a name outside the supported set is an error, never a
//! silent default.
//!
//! The scalar-name table is built once at first use into an immutable map
//! — every integer width in {8, 16, …, 256} for both signednesses and
//! every fixed byte length in {1..=32} gets a distinct entry. Array and
//! tuple shapes are parsed structurally on top of the scalar lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

/// Errors from the ABI layer: unresolvable names, values that do not fit
/// their declared type, and malformed encoded data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    /// The type name resolves to nothing in the supported set.
    #[error("unsupported ABI type name {0:?}")]
    UnsupportedType(String),

    /// A value's shape does not match its declared type.
    #[error("value does not match type {type_name}")]
    TypeMismatch { type_name: String },

    /// A numeric value exceeds the declared bit width, or a fixed-bytes
    /// value has the wrong length. Raised before any bytes are produced.
    #[error("value out of range for {type_name}")]
    OutOfRange { type_name: String },

    /// Argument list length differs from the declared parameter count.
    #[error("wrong argument count: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// Encoded data ended before the announced structure did.
    #[error("encoded data too short: need {needed} bytes at offset {offset}")]
    OutOfBounds { offset: usize, needed: usize },

    /// An encoded word carried non-zero padding (or a broken sign
    /// extension) where the type demands zeros.
    #[error("non-canonical padding in encoded word")]
    BadPadding,

    /// A head offset pointed outside the data block.
    #[error("invalid offset word")]
    InvalidOffset,

    /// A string payload was not valid UTF-8.
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    /// A boolean word held something other than 0 or 1.
    #[error("boolean word must be 0 or 1")]
    InvalidBool,

    /// The interface entry is not a function.
    #[error("ABI entry {0:?} is not a function")]
    NotAFunction(String),
}

// ---------------------------------------------------------------------------
// AbiType
// ---------------------------------------------------------------------------

/// A concrete, resolved ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// Unsigned integer of the given bit width (8..=256, step 8).
    Uint(usize),
    /// Signed (two's-complement) integer of the given bit width.
    Int(usize),
    /// Fixed-length byte array, 1..=32 bytes, left-aligned in its word.
    FixedBytes(usize),
    /// 20-byte address, right-aligned in its word.
    Address,
    Bool,
    /// Dynamic UTF-8 string.
    String,
    /// Dynamic byte array.
    Bytes,
    /// Array of elements; `Some(n)` for a fixed length, `None` for
    /// dynamic.
    Array(Box<AbiType>, Option<usize>),
    /// Heterogeneous tuple of members in declared order.
    Tuple(Vec<AbiType>),
}

/// The immutable scalar-name table, constructed on first use.
fn scalar_table() -> &'static HashMap<String, AbiType> {
    static TABLE: OnceLock<HashMap<String, AbiType>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for bits in (8usize..=256).step_by(8) {
            table.insert(format!("uint{bits}"), AbiType::Uint(bits));
            table.insert(format!("int{bits}"), AbiType::Int(bits));
        }
        for len in 1usize..=32 {
            table.insert(format!("bytes{len}"), AbiType::FixedBytes(len));
        }
        // Width-less aliases fixed by the Solidity ABI convention.
        table.insert("uint".to_string(), AbiType::Uint(256));
        table.insert("int".to_string(), AbiType::Int(256));
        table.insert("address".to_string(), AbiType::Address);
        table.insert("bool".to_string(), AbiType::Bool);
        table.insert("string".to_string(), AbiType::String);
        table.insert("bytes".to_string(), AbiType::Bytes);
        table
    })
}

impl AbiType {
    /// Resolves a type name string to its concrete descriptor.
    ///
    /// Handles scalars via the table, `[n]`/`[]` array suffixes
    /// (outermost suffix rightmost), and parenthesized tuples. Unresolved
    /// names are a hard [`AbiError::UnsupportedType`].
    pub fn resolve(name: &str) -> Result<Self, AbiError> {
        let name = name.trim();

        // Array suffix: the rightmost bracket group is the outermost
        // array dimension.
        if name.ends_with(']') {
            let open = name
                .rfind('[')
                .ok_or_else(|| AbiError::UnsupportedType(name.to_string()))?;
            let inner = Self::resolve(&name[..open])?;
            let size_str = &name[open + 1..name.len() - 1];
            let size = if size_str.is_empty() {
                None
            } else {
                let size: usize = size_str
                    .parse()
                    .map_err(|_| AbiError::UnsupportedType(name.to_string()))?;
                if size == 0 {
                    return Err(AbiError::UnsupportedType(name.to_string()));
                }
                Some(size)
            };
            return Ok(Self::Array(Box::new(inner), size));
        }

        // Tuples: "(member,member,…)".
        if let Some(body) = name.strip_prefix('(') {
            let body = body
                .strip_suffix(')')
                .ok_or_else(|| AbiError::UnsupportedType(name.to_string()))?;
            if body.trim().is_empty() {
                return Ok(Self::Tuple(vec![]));
            }
            let members = split_top_level(body)
                .iter()
                .map(|member| Self::resolve(member))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Tuple(members));
        }

        scalar_table()
            .get(name)
            .cloned()
            .ok_or_else(|| AbiError::UnsupportedType(name.to_string()))
    }

    /// `true` when the type encodes through a head offset into the tail
    /// region: strings, dynamic bytes, dynamic arrays, and any composite
    /// containing one.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes => true,
            Self::Array(_, None) => true,
            Self::Array(elem, Some(_)) => elem.is_dynamic(),
            Self::Tuple(members) => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head section: 32 for dynamic types
    /// (the offset word) and for static scalars; static composites span
    /// their members contiguously.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            Self::Array(elem, Some(len)) => elem.head_size() * len,
            Self::Tuple(members) => members.iter().map(AbiType::head_size).sum(),
            _ => 32,
        }
    }

    /// The canonical name used in function signatures (and therefore in
    /// selector hashing).
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Uint(bits) => format!("uint{bits}"),
            Self::Int(bits) => format!("int{bits}"),
            Self::FixedBytes(len) => format!("bytes{len}"),
            Self::Address => "address".to_string(),
            Self::Bool => "bool".to_string(),
            Self::String => "string".to_string(),
            Self::Bytes => "bytes".to_string(),
            Self::Array(elem, Some(len)) => format!("{}[{len}]", elem.canonical_name()),
            Self::Array(elem, None) => format!("{}[]", elem.canonical_name()),
            Self::Tuple(members) => {
                let names: Vec<String> = members.iter().map(AbiType::canonical_name).collect();
                format!("({})", names.join(","))
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Splits tuple members on commas at parenthesis depth zero.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                members.push(&body[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    members.push(&body[start..]);
    members
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
