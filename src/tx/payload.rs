//! Unsigned payload decoding
//!
//! The platform hands the client a hex-encoded, JSON-serialized transaction
//! to sign locally. Decoding is pure: the same payload string always yields
//! the same structured request.

use num_bigint::BigUint;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Structured transaction request decoded from an unsigned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    /// Destination address; absent for contract deployments
    pub to: Option<String>,
    pub value: BigUint,
    pub data: Vec<u8>,
}

/// Raw JSON shape of an unsigned payload. All quantities arrive as strings,
/// either 0x-prefixed hex or plain base-10.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnsignedPayload {
    chain_id: String,
    nonce: String,
    gas: String,
    max_priority_fee_per_gas: String,
    max_fee_per_gas: String,
    #[serde(default)]
    to: Option<String>,
    value: String,
    #[serde(default)]
    data: Option<String>,
}

/// Decode a hex-encoded unsigned payload into a structured request.
///
/// Fails with `InvalidUnsignedPayload` if the hex cannot be split into byte
/// pairs, the bytes are not UTF-8, or the JSON is malformed.
pub fn decode_unsigned_payload(hex_payload: &str) -> Result<TransactionRequest> {
    let stripped = hex_payload.strip_prefix("0x").unwrap_or(hex_payload);
    let bytes = hex::decode(stripped)
        .map_err(|e| Error::InvalidUnsignedPayload(format!("not valid hex: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidUnsignedPayload(format!("payload bytes are not UTF-8: {e}")))?;
    let raw: RawUnsignedPayload = serde_json::from_str(&json)
        .map_err(|e| Error::InvalidUnsignedPayload(format!("payload is not valid JSON: {e}")))?;

    Ok(TransactionRequest {
        chain_id: parse_u64(&raw.chain_id, "chainId")?,
        nonce: parse_u64(&raw.nonce, "nonce")?,
        gas_limit: parse_u64(&raw.gas, "gas")?,
        max_priority_fee_per_gas: parse_u128(&raw.max_priority_fee_per_gas, "maxPriorityFeePerGas")?,
        max_fee_per_gas: parse_u128(&raw.max_fee_per_gas, "maxFeePerGas")?,
        to: raw.to.filter(|t| !t.is_empty()),
        value: parse_quantity(&raw.value, "value")?,
        data: decode_data(raw.data.as_deref())?,
    })
}

fn parse_quantity(field: &str, name: &str) -> Result<BigUint> {
    let parsed = match field.strip_prefix("0x") {
        Some(hex_digits) => BigUint::parse_bytes(hex_digits.as_bytes(), 16),
        None => BigUint::parse_bytes(field.as_bytes(), 10),
    };
    parsed.ok_or_else(|| {
        Error::InvalidUnsignedPayload(format!("field {name} is not a valid quantity: {field}"))
    })
}

fn parse_u64(field: &str, name: &str) -> Result<u64> {
    let parsed = match field.strip_prefix("0x") {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16).ok(),
        None => field.parse().ok(),
    };
    parsed.ok_or_else(|| {
        Error::InvalidUnsignedPayload(format!("field {name} is out of range: {field}"))
    })
}

fn parse_u128(field: &str, name: &str) -> Result<u128> {
    let parsed = match field.strip_prefix("0x") {
        Some(hex_digits) => u128::from_str_radix(hex_digits, 16).ok(),
        None => field.parse().ok(),
    };
    parsed.ok_or_else(|| {
        Error::InvalidUnsignedPayload(format!("field {name} is out of range: {field}"))
    })
}

fn decode_data(data: Option<&str>) -> Result<Vec<u8>> {
    match data {
        None => Ok(Vec::new()),
        Some(raw) => {
            let stripped = raw.strip_prefix("0x").unwrap_or(raw);
            if stripped.is_empty() {
                return Ok(Vec::new());
            }
            hex::decode(stripped)
                .map_err(|e| Error::InvalidUnsignedPayload(format!("invalid input data: {e}")))
        }
    }
}
