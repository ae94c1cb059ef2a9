//! 32-byte-word ABI encoding and decoding.
//!
//! The contract-call parameter encoding: every value is built from
//! 32-byte words. Static types occupy exactly one word (integers and
//! bools right-aligned, fixed bytes left-aligned, addresses right-aligned
//! in their word) or, for static composites, their members contiguously.
//! Dynamic types put a single offset word in the head section pointing
//! into a trailing data region holding a length word followed by the
//! padded payload; composite types apply the same head/tail convention
//! recursively, with offsets relative to the start of the enclosing
//! block.
//!
//! Range validation runs *before* any bytes are produced: a value that
//! exceeds its declared bit width, a fixed-bytes value of the wrong
//! length, or a fixed array of the wrong arity is an error, never a
//! silent truncation. Decoding is equally strict — bad padding, broken
//! sign extensions, and out-of-range offsets all fail closed.

use primitive_types::U256;

use crate::abi::types::{AbiError, AbiType};
use crate::crypto::keys::Address;

// ---------------------------------------------------------------------------
// AbiValue
// ---------------------------------------------------------------------------

/// A decoded (or to-be-encoded) ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Unsigned integer, up to 256 bits.
    Uint(U256),
    /// Signed integer as full-width 256-bit two's complement.
    Int(U256),
    FixedBytes(Vec<u8>),
    Address(Address),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Convenience constructor for small unsigned values.
    pub fn uint(value: u128) -> Self {
        Self::Uint(U256::from(value))
    }

    /// Convenience constructor for signed values, sign-extended to the
    /// full 256-bit two's-complement representation.
    pub fn int(value: i128) -> Self {
        if value >= 0 {
            Self::Int(U256::from(value as u128))
        } else {
            // -x in two's complement: !x + 1 over the full width.
            Self::Int(U256::MAX - U256::from(value.unsigned_abs()) + U256::one())
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a single value as if it were a one-element argument list —
/// static values are their word(s), dynamic values an offset word plus
/// tail.
pub fn encode(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    encode_arguments(std::slice::from_ref(ty), std::slice::from_ref(value))
}

/// Encodes an argument list with the head/tail offset convention.
pub fn encode_arguments(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let head_size: usize = types.iter().map(AbiType::head_size).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_size + tail.len())));
            tail.extend(encode_tail(ty, value)?);
        } else {
            head.extend(encode_static(ty, value)?);
        }
    }
    head.extend(tail);
    Ok(head)
}

/// Encodes a static value into its contiguous word(s).
fn encode_static(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    match (ty, value) {
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bits() > *bits {
                return Err(out_of_range(ty));
            }
            Ok(uint_word(*v).to_vec())
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => {
            if !int_fits(v, *bits) {
                return Err(out_of_range(ty));
            }
            Ok(uint_word(*v).to_vec())
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(out_of_range(ty));
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        (AbiType::Address, AbiValue::Address(addr)) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_bytes());
            Ok(word.to_vec())
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            Ok(word.to_vec())
        }
        (AbiType::Array(elem, Some(len)), AbiValue::Array(values)) => {
            if values.len() != *len {
                return Err(out_of_range(ty));
            }
            let types = vec![(**elem).clone(); *len];
            encode_arguments(&types, values)
        }
        (AbiType::Tuple(members), AbiValue::Tuple(values)) => {
            encode_arguments(members, values)
        }
        _ => Err(AbiError::TypeMismatch {
            type_name: ty.canonical_name(),
        }),
    }
}

/// Encodes a dynamic value's standalone tail block.
fn encode_tail(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    match (ty, value) {
        (AbiType::String, AbiValue::String(s)) => Ok(length_prefixed(s.as_bytes())),
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => Ok(length_prefixed(bytes)),
        (AbiType::Array(elem, None), AbiValue::Array(values)) => {
            let mut out = uint_word(U256::from(values.len())).to_vec();
            let types = vec![(**elem).clone(); values.len()];
            out.extend(encode_arguments(&types, values)?);
            Ok(out)
        }
        // A fixed array lands here only when its element is dynamic.
        (AbiType::Array(elem, Some(len)), AbiValue::Array(values)) => {
            if values.len() != *len {
                return Err(out_of_range(ty));
            }
            let types = vec![(**elem).clone(); *len];
            encode_arguments(&types, values)
        }
        (AbiType::Tuple(members), AbiValue::Tuple(values)) => {
            encode_arguments(members, values)
        }
        _ => Err(AbiError::TypeMismatch {
            type_name: ty.canonical_name(),
        }),
    }
}

/// Length word followed by the payload padded up to a word boundary.
fn length_prefixed(payload: &[u8]) -> Vec<u8> {
    let mut out = uint_word(U256::from(payload.len())).to_vec();
    out.extend_from_slice(payload);
    out.resize(32 + payload.len().div_ceil(32) * 32, 0);
    out
}

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn out_of_range(ty: &AbiType) -> AbiError {
    AbiError::OutOfRange {
        type_name: ty.canonical_name(),
    }
}

/// `true` when `value` is a valid two's-complement integer of the given
/// width: the bits above the sign bit must all equal it.
fn int_fits(value: &U256, bits: usize) -> bool {
    if bits == 256 {
        return true;
    }
    let above_sign = *value >> (bits - 1);
    if value.bit(bits - 1) {
        above_sign == (U256::MAX >> (bits - 1))
    } else {
        above_sign.is_zero()
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes one value whose head sits at byte `offset` of `data`, with
/// dynamic offsets interpreted relative to the start of `data`. Returns
/// the value and the number of head bytes consumed.
pub fn decode(ty: &AbiType, data: &[u8], offset: usize) -> Result<(AbiValue, usize), AbiError> {
    decode_value(ty, data, offset)
}

/// Decodes a full argument list laid out from the start of `data`.
pub fn decode_arguments(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    let mut pos = 0;
    for ty in types {
        let (value, consumed) = decode_value(ty, data, pos)?;
        values.push(value);
        pos += consumed;
    }
    Ok(values)
}

fn decode_value(ty: &AbiType, block: &[u8], head_pos: usize) -> Result<(AbiValue, usize), AbiError> {
    if ty.is_dynamic() {
        let offset = read_usize(block, head_pos)?;
        let tail = block.get(offset..).ok_or(AbiError::InvalidOffset)?;
        return Ok((decode_tail(ty, tail)?, 32));
    }

    match ty {
        AbiType::Uint(bits) => {
            let value = U256::from_big_endian(&read_word(block, head_pos)?);
            if value.bits() > *bits {
                return Err(out_of_range(ty));
            }
            Ok((AbiValue::Uint(value), 32))
        }
        AbiType::Int(bits) => {
            let value = U256::from_big_endian(&read_word(block, head_pos)?);
            if !int_fits(&value, *bits) {
                return Err(out_of_range(ty));
            }
            Ok((AbiValue::Int(value), 32))
        }
        AbiType::FixedBytes(len) => {
            let word = read_word(block, head_pos)?;
            if word[*len..].iter().any(|&b| b != 0) {
                return Err(AbiError::BadPadding);
            }
            Ok((AbiValue::FixedBytes(word[..*len].to_vec()), 32))
        }
        AbiType::Address => {
            let word = read_word(block, head_pos)?;
            if word[..12].iter().any(|&b| b != 0) {
                return Err(AbiError::BadPadding);
            }
            let addr = Address::from_slice(&word[12..]).expect("20 bytes");
            Ok((AbiValue::Address(addr), 32))
        }
        AbiType::Bool => {
            let word = read_word(block, head_pos)?;
            if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
                return Err(AbiError::InvalidBool);
            }
            Ok((AbiValue::Bool(word[31] == 1), 32))
        }
        AbiType::Array(elem, Some(len)) => {
            let mut values = Vec::with_capacity(*len);
            let mut pos = head_pos;
            for _ in 0..*len {
                let (value, consumed) = decode_value(elem, block, pos)?;
                values.push(value);
                pos += consumed;
            }
            Ok((AbiValue::Array(values), pos - head_pos))
        }
        AbiType::Tuple(members) => {
            let mut values = Vec::with_capacity(members.len());
            let mut pos = head_pos;
            for member in members {
                let (value, consumed) = decode_value(member, block, pos)?;
                values.push(value);
                pos += consumed;
            }
            Ok((AbiValue::Tuple(values), pos - head_pos))
        }
        // is_dynamic() covered String/Bytes/dynamic arrays above.
        AbiType::String | AbiType::Bytes | AbiType::Array(_, None) => unreachable!(),
    }
}

/// Decodes a dynamic value's tail block (offsets inside are relative to
/// the block start).
fn decode_tail(ty: &AbiType, block: &[u8]) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::String => {
            let payload = read_length_prefixed(block)?;
            let text = String::from_utf8(payload).map_err(|_| AbiError::InvalidUtf8)?;
            Ok(AbiValue::String(text))
        }
        AbiType::Bytes => Ok(AbiValue::Bytes(read_length_prefixed(block)?)),
        AbiType::Array(elem, None) => {
            let len = read_usize(block, 0)?;
            let elements = block.get(32..).ok_or(AbiError::OutOfBounds {
                offset: 32,
                needed: 32,
            })?;
            let mut values = Vec::with_capacity(len);
            let mut pos = 0;
            for _ in 0..len {
                let (value, consumed) = decode_value(elem, elements, pos)?;
                values.push(value);
                pos += consumed;
            }
            Ok(AbiValue::Array(values))
        }
        AbiType::Array(elem, Some(len)) => {
            let mut values = Vec::with_capacity(*len);
            let mut pos = 0;
            for _ in 0..*len {
                let (value, consumed) = decode_value(elem, block, pos)?;
                values.push(value);
                pos += consumed;
            }
            Ok(AbiValue::Array(values))
        }
        AbiType::Tuple(members) => {
            let mut values = Vec::with_capacity(members.len());
            let mut pos = 0;
            for member in members {
                let (value, consumed) = decode_value(member, block, pos)?;
                values.push(value);
                pos += consumed;
            }
            Ok(AbiValue::Tuple(values))
        }
        _ => unreachable!("static types never reach decode_tail"),
    }
}

fn read_word(block: &[u8], pos: usize) -> Result<[u8; 32], AbiError> {
    block
        .get(pos..pos + 32)
        .and_then(|slice| <[u8; 32]>::try_from(slice).ok())
        .ok_or(AbiError::OutOfBounds {
            offset: pos,
            needed: 32,
        })
}

fn read_usize(block: &[u8], pos: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(&read_word(block, pos)?);
    if value > U256::from(u64::MAX) {
        return Err(AbiError::InvalidOffset);
    }
    usize::try_from(value.low_u64()).map_err(|_| AbiError::InvalidOffset)
}

/// Length-prefixed payload with zero-padding validation.
fn read_length_prefixed(block: &[u8]) -> Result<Vec<u8>, AbiError> {
    let len = read_usize(block, 0)?;
    let padded_len = len.div_ceil(32) * 32;
    let region = block.get(32..32 + padded_len).ok_or(AbiError::OutOfBounds {
        offset: 32,
        needed: padded_len,
    })?;
    if region[len..].iter().any(|&b| b != 0) {
        return Err(AbiError::BadPadding);
    }
    Ok(region[..len].to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
