//! Conversion between on-chain integer amounts and human-readable values.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Largest scale `Decimal` can represent.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Converts a raw on-chain amount into its human-readable value.
///
/// A missing amount is treated as zero.
pub fn to_human(raw: Option<u128>, decimals: u32) -> f64 {
    let raw = raw.unwrap_or(0);
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Converts a human-readable value back into raw on-chain units.
pub fn to_on_chain(human: f64, decimals: u32) -> u128 {
    if !human.is_finite() || human <= 0.0 {
        return 0;
    }
    (human * 10f64.powi(decimals as i32)).round() as u128
}

/// Exact decimal rendering of a raw amount, used for display.
pub fn to_human_decimal(raw: Option<u128>, decimals: u32) -> Decimal {
    let value = raw.unwrap_or(0);
    if decimals <= MAX_DECIMAL_SCALE {
        if let Ok(signed) = i128::try_from(value) {
            if let Ok(decimal) = Decimal::try_from_i128_with_scale(signed, decimals) {
                return decimal.normalize();
            }
        }
    }
    Decimal::from_f64_retain(to_human(raw, decimals)).unwrap_or_default()
}

/// Converts a decimal display value into `f64`, defaulting to zero.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Parses an amount that may arrive as a JSON number or a decimal string.
/// Numbers past `u64::MAX` are read from their exact digits; fractions and negatives
/// are rejected.
pub fn amount_from_json(value: &serde_json::Value) -> Option<u128> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .or_else(|| n.to_string().parse::<u128>().ok()),
        serde_json::Value::String(s) => s.trim().parse::<u128>().ok(),
        _ => None,
    }
}

/// Serde adapter for optional indexer numerics (number, string or null).
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_human_scales_by_decimals() {
        assert_eq!(to_human(Some(150_000_000), 8), 1.5);
        assert_eq!(to_human(Some(42), 0), 42.0);
    }

    #[test]
    fn missing_raw_amount_is_zero() {
        assert_eq!(to_human(None, 8), 0.0);
        assert_eq!(to_on_chain(-1.0, 8), 0);
        assert_eq!(to_on_chain(f64::NAN, 8), 0);
    }

    #[test]
    fn round_trip_recovers_raw_amount() {
        let samples: [u128; 5] = [0, 1, 999, 123_456_789, 10_000_000_000];
        for decimals in 0..=18 {
            for raw in samples {
                let human = to_human(Some(raw), decimals);
                let back = human * 10f64.powi(decimals as i32);
                let tolerance = (raw as f64).abs() * 1e-12 + 1e-9;
                assert!(
                    (back - raw as f64).abs() <= tolerance,
                    "raw={raw} decimals={decimals} back={back}"
                );
            }
        }
        assert_eq!(to_on_chain(to_human(Some(123_456_789), 8), 8), 123_456_789);
    }

    #[test]
    fn decimal_rendering_is_exact() {
        assert_eq!(to_human_decimal(Some(100_000_001), 8).to_string(), "1.00000001");
        assert_eq!(to_human_decimal(Some(5_000), 3).to_string(), "5");
        assert_eq!(decimal_to_f64(to_human_decimal(Some(250), 2)), 2.5);
    }

    #[test]
    fn amount_from_json_accepts_numbers_and_strings() {
        assert_eq!(amount_from_json(&serde_json::json!(1000)), Some(1000));
        assert_eq!(amount_from_json(&serde_json::json!("1000")), Some(1000));
        assert_eq!(amount_from_json(&serde_json::json!(null)), None);
        assert_eq!(amount_from_json(&serde_json::json!("abc")), None);
        assert_eq!(amount_from_json(&serde_json::json!(1.5)), None);
        assert_eq!(amount_from_json(&serde_json::json!(-1)), None);
    }

    #[test]
    fn numbers_beyond_u64_keep_every_digit() {
        let raw = "340282366920938463463374607431768211455";
        let value: serde_json::Value = serde_json::from_str(raw).expect("number");
        assert_eq!(amount_from_json(&value), Some(u128::MAX));

        let value: serde_json::Value =
            serde_json::from_str("18446744073709551617").expect("number");
        assert_eq!(amount_from_json(&value), Some(u64::MAX as u128 + 2));
    }
}
