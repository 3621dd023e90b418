//! Aptos account/object address parsing and normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const ADDRESS_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must contain 1 to 64 hex chars")]
    Empty,
    #[error("address has {0} hex chars, at most 64 allowed")]
    TooLong(usize),
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl AccountAddress {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Accepts short or long form, with or without the `0x` prefix.
    pub fn from_str_relaxed(input: &str) -> Result<Self, AddressParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::TooLong(digits.len()));
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|_| AddressParseError::InvalidHex(input.to_string()))?;
        Ok(Self(bytes))
    }

    /// Canonical `0x` + 64 lowercase hex chars.
    pub fn to_string_long(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_long())
    }
}

impl std::str::FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_relaxed(s)
    }
}

/// Address as returned by view functions: a bare string or an `Object<T>` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Plain(String),
    Wrapped { inner: String },
}

impl AddressInput {
    pub fn as_str(&self) -> &str {
        match self {
            AddressInput::Plain(value) => value,
            AddressInput::Wrapped { inner } => inner,
        }
    }
}

impl From<&str> for AddressInput {
    fn from(value: &str) -> Self {
        AddressInput::Plain(value.to_string())
    }
}

/// Normalizes any address representation into its canonical long form.
///
/// Unparseable input is returned unchanged; absent input yields an empty string.
pub fn to_canonical(input: Option<&AddressInput>) -> String {
    let Some(input) = input else {
        return String::new();
    };
    canonical_str(input.as_str())
}

/// String flavour of [`to_canonical`].
pub fn canonical_str(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match AccountAddress::from_str_relaxed(raw) {
        Ok(address) => address.to_string_long(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_LONG: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn short_form_expands_to_long() {
        assert_eq!(canonical_str("0x1"), ONE_LONG);
        assert_eq!(canonical_str("1"), ONE_LONG);
        assert_eq!(canonical_str("0xABC").len(), 66);
        assert!(canonical_str("0xABC").ends_with("abc"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["0x1", "0xa550c18", ONE_LONG, "deadbeef"] {
            let once = canonical_str(raw);
            assert_eq!(canonical_str(&once), once);
        }
    }

    #[test]
    fn parse_errors_describe_the_input() {
        let err = AccountAddress::from_str_relaxed("0x").expect_err("empty");
        assert_eq!(err.to_string(), "address must contain 1 to 64 hex chars");
        let err = AccountAddress::from_str_relaxed(&"f".repeat(65)).expect_err("too long");
        assert_eq!(err, AddressParseError::TooLong(65));
        assert_eq!(err.to_string(), "address has 65 hex chars, at most 64 allowed");
    }

    #[test]
    fn invalid_input_falls_back_to_raw() {
        assert_eq!(canonical_str("not-an-address"), "not-an-address");
        let too_long = format!("0x{}", "f".repeat(65));
        assert_eq!(canonical_str(&too_long), too_long);
        assert_eq!(to_canonical(None), "");
        assert_eq!(canonical_str(""), "");
    }

    #[test]
    fn wrapped_inner_field_is_preferred() {
        let wrapped: AddressInput = serde_json::from_value(serde_json::json!({ "inner": "0x1" }))
            .expect("wrapped address");
        assert_eq!(wrapped, AddressInput::Wrapped { inner: "0x1".to_string() });
        assert_eq!(to_canonical(Some(&wrapped)), ONE_LONG);

        let plain: AddressInput =
            serde_json::from_value(serde_json::json!("0x1")).expect("plain address");
        assert_eq!(to_canonical(Some(&plain)), ONE_LONG);
    }
}
