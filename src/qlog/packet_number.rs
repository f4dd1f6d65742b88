//! Packet number decoding.

use serde_json::Value;

/// Decodes a packet number field.
///
/// Native integer form wins (an integral, non-negative JSON float such as `5.0`
/// counts as integer form); a base-10 string is tried next. Anything else is `None`.
pub fn parse_packet_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
