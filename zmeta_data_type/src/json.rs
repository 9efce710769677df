//! JSON encoding helpers shared by data type wrappers.
//!
//! Non-finite floats are encoded as the strings `"NaN"`, `"Infinity"`, and `"-Infinity"` in both Zarr formats.
//! Decoding also accepts a `0x` prefixed hexadecimal string holding the raw bits of the float.
//! Byte strings are encoded as standard base64.

use base64::{Engine, prelude::BASE64_STANDARD};
use half::f16;
use serde_json::{Number, Value};

/// Encode a float as a JSON value.
#[must_use]
pub fn float_to_json(value: f64) -> Value {
    if value.is_nan() {
        Value::from("NaN")
    } else if value.is_infinite() {
        Value::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// Decode a float of `size` bytes from a JSON value.
///
/// Returns [`None`] if `json` is not a number, a non-finite sentinel string, or a hexadecimal bit pattern of `size` bytes.
#[must_use]
pub fn float_from_json(json: &Value, size: usize) -> Option<f64> {
    match json {
        Value::Number(number) => number.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            s => {
                let hex = s.strip_prefix("0x")?;
                if hex.len() != size * 2 {
                    return None;
                }
                let bits = u64::from_str_radix(hex, 16).ok()?;
                match size {
                    2 => Some(f64::from(f16::from_bits(u16::try_from(bits).ok()?))),
                    4 => Some(f64::from(f32::from_bits(u32::try_from(bits).ok()?))),
                    8 => Some(f64::from_bits(bits)),
                    _ => None,
                }
            }
        },
        _ => None,
    }
}

/// Encode bytes as a base64 JSON string.
#[must_use]
pub fn bytes_to_json(bytes: &[u8]) -> Value {
    Value::String(BASE64_STANDARD.encode(bytes))
}

/// Decode a base64 JSON string.
#[must_use]
pub fn bytes_from_json(json: &Value) -> Option<Vec<u8>> {
    BASE64_STANDARD.decode(json.as_str()?).ok()
}
