//! Recursive Length Prefix (RLP) codec.
//!
//! RLP is the canonical binary encoding for everything the VELA wire format
//! carries: transactions, account keys, signature lists, access lists. The
//! grammar has exactly two constructors — byte strings and ordered lists of
//! items — and every constructible value has exactly one valid encoding.
//!
//! ## Canonical form
//!
//! The encoding rules admit a short form (payload length in the prefix byte)
//! and a long form (length-of-length prefix followed by a big-endian length).
//! A conforming encoder always picks the shortest representation, and this
//! decoder *rejects* anything else:
//!
//! - a single byte below `0x80` wrapped in a `0x81` prefix,
//! - long form used where the short form fits (payload under 56 bytes),
//! - length fields with leading zero bytes,
//! - truncated input, lengths overrunning the buffer, trailing bytes.
//!
//! Rejecting non-canonical input is what makes `decode(encode(x)) == x` hold
//! in both directions: two different byte strings can never decode to the
//! same item.

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while decoding RLP bytes or reinterpreting decoded items.
///
/// Any error means "no value produced" — the decoder never returns a partial
/// or best-effort item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    /// The input ended before the structure it announced was complete.
    #[error("unexpected end of input at byte {position}")]
    UnexpectedEnd { position: usize },

    /// A length prefix claims more payload bytes than remain in the buffer.
    #[error("length {length} at byte {position} overruns the input")]
    LengthOverrun { position: usize, length: usize },

    /// The encoding is well-formed but not the canonical (shortest) form.
    #[error("non-canonical encoding at byte {position}: {reason}")]
    NonCanonical {
        position: usize,
        reason: &'static str,
    },

    /// Bytes remained after the root item was fully decoded.
    #[error("{0} trailing bytes after the root item")]
    TrailingBytes(usize),

    /// An item had the wrong constructor for the caller's expectation
    /// (a list where a byte string was required, or vice versa).
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    /// A list had a different number of elements than the caller required.
    #[error("expected a list of {expected} items, found {found}")]
    WrongArity { expected: usize, found: usize },

    /// A byte string did not hold a canonical unsigned integer (leading
    /// zero byte) or held one too large for the requested width.
    #[error("invalid unsigned integer: {0}")]
    InvalidInteger(&'static str),

    /// A byte string had the wrong length for a fixed-width field.
    #[error("expected {expected} bytes for {field}, found {found}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// RlpItem
// ---------------------------------------------------------------------------

/// A single node in the RLP grammar: a byte string or a list of items.
///
/// Values are built bottom-up with the constructors below and flattened to
/// bytes with [`encode`]. Decoding any well-formed canonical encoding with
/// [`decode`] reproduces the original item bit-for-bit.
#[derive(Clone, PartialEq, Eq)]
pub enum RlpItem {
    /// An opaque byte string (possibly empty).
    Bytes(Vec<u8>),
    /// An ordered sequence of nested items (possibly empty).
    List(Vec<RlpItem>),
}

impl fmt::Debug for RlpItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "Bytes(0x{})", hex::encode(b)),
            Self::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl RlpItem {
    /// Byte-string item from a slice.
    pub fn bytes(data: impl AsRef<[u8]>) -> Self {
        Self::Bytes(data.as_ref().to_vec())
    }

    /// List item from a vector of children.
    pub fn list(items: Vec<RlpItem>) -> Self {
        Self::List(items)
    }

    /// Unsigned integer item: minimal big-endian bytes, zero encodes as the
    /// empty string. This is the canonical integer convention used by every
    /// numeric field on the wire.
    pub fn uint(value: u128) -> Self {
        Self::Bytes(trim_leading_zeros(&value.to_be_bytes()))
    }

    /// Returns the byte-string payload, or an error for a list.
    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::List(_) => Err(RlpError::UnexpectedKind {
                expected: "byte string",
                found: "list",
            }),
        }
    }

    /// Returns the child items, or an error for a byte string.
    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Bytes(_) => Err(RlpError::UnexpectedKind {
                expected: "list",
                found: "byte string",
            }),
        }
    }

    /// Returns the child items, requiring an exact element count.
    pub fn as_list_of(&self, expected: usize) -> Result<&[RlpItem], RlpError> {
        let items = self.as_list()?;
        if items.len() != expected {
            return Err(RlpError::WrongArity {
                expected,
                found: items.len(),
            });
        }
        Ok(items)
    }

    /// Reinterprets a byte-string item as a canonical unsigned integer.
    ///
    /// Rejects leading zero bytes (non-canonical) and values wider than
    /// 128 bits. The empty string decodes to zero.
    pub fn as_uint(&self) -> Result<u128, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::InvalidInteger("leading zero byte"));
        }
        if bytes.len() > 16 {
            return Err(RlpError::InvalidInteger("wider than 128 bits"));
        }
        let mut value = 0u128;
        for &b in bytes {
            value = (value << 8) | u128::from(b);
        }
        Ok(value)
    }

    /// Like [`as_uint`](Self::as_uint) but bounded to 64 bits.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let value = self.as_uint()?;
        u64::try_from(value).map_err(|_| RlpError::InvalidInteger("wider than 64 bits"))
    }

    /// Reinterprets a byte-string item as a fixed-width big-endian word,
    /// left-padding short (canonical) encodings with zeros.
    pub fn as_word<const N: usize>(&self, field: &'static str) -> Result<[u8; N], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() > N {
            return Err(RlpError::WrongLength {
                field,
                expected: N,
                found: bytes.len(),
            });
        }
        if bytes.first() == Some(&0) {
            return Err(RlpError::InvalidInteger("leading zero byte"));
        }
        let mut word = [0u8; N];
        word[N - bytes.len()..].copy_from_slice(bytes);
        Ok(word)
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes an item to its unique canonical byte representation.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::Bytes(b) => {
            if b.len() == 1 && b[0] < 0x80 {
                // A single byte below 0x80 is its own encoding.
                out.push(b[0]);
            } else {
                write_header(0x80, b.len(), out);
                out.extend_from_slice(b);
            }
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for child in items {
                encode_into(child, &mut payload);
            }
            write_header(0xc0, payload.len(), out);
            out.extend_from_slice(&payload);
        }
    }
}

/// Writes the short- or long-form length prefix for a payload of `len`
/// bytes. `base` is 0x80 for byte strings and 0xc0 for lists.
fn write_header(base: u8, len: usize, out: &mut Vec<u8>) {
    if len <= 55 {
        out.push(base + len as u8);
    } else {
        let len_bytes = trim_leading_zeros(&(len as u64).to_be_bytes());
        out.push(base + 55 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a complete canonical encoding into an item.
///
/// The entire input must be consumed by the root item; trailing bytes are an
/// error, as is every non-canonical form described in the module docs.
pub fn decode(input: &[u8]) -> Result<RlpItem, RlpError> {
    let (item, consumed) = decode_item(input, 0)?;
    let remaining = input.len() - consumed;
    if remaining != 0 {
        return Err(RlpError::TrailingBytes(remaining));
    }
    Ok(item)
}

/// Decodes one item starting at `pos`, returning the item and the total
/// number of bytes consumed from the start of `input`.
fn decode_item(input: &[u8], pos: usize) -> Result<(RlpItem, usize), RlpError> {
    let prefix = *input
        .get(pos)
        .ok_or(RlpError::UnexpectedEnd { position: pos })?;

    match prefix {
        // Single byte literal.
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![prefix]), pos + 1)),

        // Short-form byte string: length 0..=55 in the prefix.
        0x80..=0xb7 => {
            let len = usize::from(prefix - 0x80);
            let payload = read_payload(input, pos + 1, len)?;
            if len == 1 && payload[0] < 0x80 {
                return Err(RlpError::NonCanonical {
                    position: pos,
                    reason: "single byte below 0x80 must encode as itself",
                });
            }
            Ok((RlpItem::Bytes(payload.to_vec()), pos + 1 + len))
        }

        // Long-form byte string: length-of-length in the prefix.
        0xb8..=0xbf => {
            let len_len = usize::from(prefix - 0xb7);
            let (len, payload_start) = read_long_length(input, pos, len_len)?;
            let payload = read_payload(input, payload_start, len)?;
            Ok((RlpItem::Bytes(payload.to_vec()), payload_start + len))
        }

        // Short-form list.
        0xc0..=0xf7 => {
            let len = usize::from(prefix - 0xc0);
            decode_list_payload(input, pos + 1, len)
        }

        // Long-form list.
        0xf8..=0xff => {
            let len_len = usize::from(prefix - 0xf7);
            let (len, payload_start) = read_long_length(input, pos, len_len)?;
            decode_list_payload(input, payload_start, len)
        }
    }
}

/// Reads and validates a long-form length field at `pos + 1`.
fn read_long_length(
    input: &[u8],
    pos: usize,
    len_len: usize,
) -> Result<(usize, usize), RlpError> {
    let len_bytes = read_payload(input, pos + 1, len_len)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical {
            position: pos,
            reason: "length field has a leading zero byte",
        });
    }
    let mut len = 0usize;
    for &b in len_bytes {
        len = len
            .checked_mul(256)
            .and_then(|v| v.checked_add(usize::from(b)))
            .ok_or(RlpError::LengthOverrun {
                position: pos,
                length: usize::MAX,
            })?;
    }
    if len <= 55 {
        return Err(RlpError::NonCanonical {
            position: pos,
            reason: "long form used where short form fits",
        });
    }
    Ok((len, pos + 1 + len_len))
}

/// Borrows `len` payload bytes at `start`, or reports the overrun.
fn read_payload(input: &[u8], start: usize, len: usize) -> Result<&[u8], RlpError> {
    if len == 0 {
        // An empty slice at the end of the buffer is fine.
        return Ok(&[]);
    }
    input
        .get(start..start + len)
        .ok_or(RlpError::LengthOverrun {
            position: start,
            length: len,
        })
}

/// Decodes the elements of a list whose payload spans exactly `len` bytes.
/// Elements must tile the payload with no gap and no overrun.
fn decode_list_payload(
    input: &[u8],
    start: usize,
    len: usize,
) -> Result<(RlpItem, usize), RlpError> {
    let end = start + len;
    if end > input.len() {
        return Err(RlpError::LengthOverrun {
            position: start,
            length: len,
        });
    }
    let mut items = Vec::new();
    let mut pos = start;
    while pos < end {
        let (item, next) = decode_item(input, pos)?;
        if next > end {
            return Err(RlpError::LengthOverrun {
                position: pos,
                length: next - pos,
            });
        }
        items.push(item);
        pos = next;
    }
    Ok((RlpItem::List(items), end))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
