//! Conversion between raw memory bytes and [`MemoryValue`]s
//!
//! Numeric kinds use the host's native byte order. Text is UTF-8, cut at the
//! first zero byte when decoding and zero-padded (or truncated) to the exact
//! requested length when encoding.

use crate::core::types::{MemoryError, MemoryResult, MemoryValue, ValueType};

/// Validates `length` against the widths accepted by `kind`
pub fn check_length(kind: ValueType, length: usize) -> MemoryResult<()> {
    match kind.widths() {
        Some(widths) if widths.contains(&length) => Ok(()),
        Some(widths) => Err(MemoryError::length_mismatch(kind, describe(widths), length)),
        None if length > 0 => Ok(()),
        None => Err(MemoryError::length_mismatch(
            kind,
            "a positive length",
            length,
        )),
    }
}

fn describe(widths: &[usize]) -> String {
    let names: Vec<String> = widths.iter().map(ToString::to_string).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            format!("{} or {}", rest.join(", "), last)
        }
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Decodes the first `length` bytes of `bytes` as a value of `kind`
pub fn decode(bytes: &[u8], kind: ValueType, length: usize) -> MemoryResult<MemoryValue> {
    check_length(kind, length)?;
    let bytes = bytes.get(..length).ok_or_else(|| {
        MemoryError::length_mismatch(kind, format!("at least {} bytes", length), bytes.len())
    })?;

    let value = match kind {
        ValueType::Bool => MemoryValue::Bool(read_bool(bytes)),
        ValueType::Int => MemoryValue::Int(read_int(bytes).unwrap_or_default()),
        ValueType::Float => MemoryValue::Float(read_float(bytes).unwrap_or_default()),
        ValueType::Text => {
            MemoryValue::Text(String::from_utf8_lossy(trim_text(bytes)).into_owned())
        }
    };

    Ok(value)
}

/// Encodes `value` into exactly `length` bytes
pub fn encode(value: &MemoryValue, kind: ValueType, length: usize) -> MemoryResult<Vec<u8>> {
    check_length(kind, length)?;
    if value.value_type() != kind {
        return Err(MemoryError::TypeMismatch {
            expected: kind,
            actual: value.value_type(),
        });
    }

    match value {
        MemoryValue::Bool(v) => Ok(vec![u8::from(*v)]),
        MemoryValue::Int(v) => encode_int(*v, length),
        MemoryValue::Float(v) => encode_float(*v, length),
        MemoryValue::Text(s) => {
            let mut bytes = s.as_bytes().to_vec();
            bytes.resize(length, 0);
            Ok(bytes)
        }
    }
}

fn encode_int(value: i64, length: usize) -> MemoryResult<Vec<u8>> {
    let too_large = || MemoryError::value_too_large(ValueType::Int, length, value);

    let bytes = match length {
        1 => i8::try_from(value).map(|v| v.to_ne_bytes().to_vec()),
        2 => i16::try_from(value).map(|v| v.to_ne_bytes().to_vec()),
        4 => i32::try_from(value).map(|v| v.to_ne_bytes().to_vec()),
        _ => Ok(value.to_ne_bytes().to_vec()),
    };

    bytes.map_err(|_| too_large())
}

fn encode_float(value: f64, length: usize) -> MemoryResult<Vec<u8>> {
    if length == 8 {
        return Ok(value.to_ne_bytes().to_vec());
    }

    let narrow = value as f32;
    if value.is_finite() && !narrow.is_finite() {
        return Err(MemoryError::value_too_large(
            ValueType::Float,
            length,
            value,
        ));
    }
    Ok(narrow.to_ne_bytes().to_vec())
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

pub(crate) fn read_bool(bytes: &[u8]) -> bool {
    bytes.first().is_some_and(|&b| b != 0)
}

/// Signed integer of width `bytes.len()`, `None` for unsupported widths
pub(crate) fn read_int(bytes: &[u8]) -> Option<i64> {
    match bytes.len() {
        1 => Some(i8::from_ne_bytes(array(bytes)).into()),
        2 => Some(i16::from_ne_bytes(array(bytes)).into()),
        4 => Some(i32::from_ne_bytes(array(bytes)).into()),
        8 => Some(i64::from_ne_bytes(array(bytes))),
        _ => None,
    }
}

/// Float of width `bytes.len()` widened to f64, `None` for unsupported widths
pub(crate) fn read_float(bytes: &[u8]) -> Option<f64> {
    match bytes.len() {
        4 => Some(f32::from_ne_bytes(array(bytes)).into()),
        8 => Some(f64::from_ne_bytes(array(bytes))),
        _ => None,
    }
}

/// Text bytes up to, not including, the first zero byte
pub(crate) fn trim_text(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
