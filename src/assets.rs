//! Asset definitions and exact amount conversion
//!
//! Every amount crossing the wire is an atomic-unit integer serialized as a
//! plain base-10 digit string. Conversions between whole units and atomic
//! units are exact integer arithmetic scaled by `10^decimals`; floating
//! point is never involved.

use std::collections::HashMap;
use std::str::FromStr;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// A denomination known to the client without a server round trip.
struct AssetDef {
    decimals: u32,
    /// Base asset this id is an alias of, if any (e.g. wei -> eth)
    primary: Option<&'static str>,
}

lazy_static! {
    static ref ASSET_REGISTRY: HashMap<&'static str, AssetDef> = {
        let mut m = HashMap::new();
        m.insert("eth", AssetDef { decimals: 18, primary: None });
        m.insert("wei", AssetDef { decimals: 0, primary: Some("eth") });
        m.insert("gwei", AssetDef { decimals: 9, primary: Some("eth") });
        m.insert("usdc", AssetDef { decimals: 6, primary: None });
        m.insert("weth", AssetDef { decimals: 18, primary: None });
        m.insert("cbeth", AssetDef { decimals: 18, primary: None });
        m.insert("dai", AssetDef { decimals: 18, primary: None });
        m
    };
}

/// Resolve a denomination alias to the primary asset id used in wire requests.
///
/// Unrecognized identifiers pass through unchanged; they only become an error
/// when an amount conversion needs a decimal precision nobody can supply.
pub fn resolve_primary_asset_id(asset_id: &str) -> String {
    let id = asset_id.to_lowercase();
    match ASSET_REGISTRY.get(id.as_str()).and_then(|def| def.primary) {
        Some(primary) => primary.to_string(),
        None => id,
    }
}

/// An asset on a specific network.
///
/// Decimal precision is fixed per (network, asset) pair at construction and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    asset_id: String,
    network_id: String,
    decimals: u32,
    contract_address: Option<String>,
}

impl Asset {
    /// Look up a known asset by id.
    ///
    /// Fails with `UnsupportedAsset` when no decimal precision can be
    /// resolved for the identifier.
    pub fn resolve(network_id: &str, asset_id: &str) -> Result<Self> {
        let id = asset_id.to_lowercase();
        let def = ASSET_REGISTRY
            .get(id.as_str())
            .ok_or_else(|| Error::UnsupportedAsset(id.clone()))?;
        Ok(Self {
            asset_id: id,
            network_id: network_id.to_string(),
            decimals: def.decimals,
            contract_address: None,
        })
    }

    /// Construct an asset from server-supplied data.
    ///
    /// Server decimals take precedence; the registry is the fallback for
    /// responses that omit them.
    pub fn new(
        network_id: &str,
        asset_id: &str,
        decimals: Option<u32>,
        contract_address: Option<String>,
    ) -> Result<Self> {
        let id = asset_id.to_lowercase();
        let decimals = match decimals {
            Some(d) => d,
            None => {
                ASSET_REGISTRY
                    .get(id.as_str())
                    .ok_or_else(|| Error::UnsupportedAsset(id.clone()))?
                    .decimals
            }
        };
        Ok(Self {
            asset_id: id,
            network_id: network_id.to_string(),
            decimals,
            contract_address,
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    /// The asset id used in wire requests, after alias resolution
    pub fn primary_asset_id(&self) -> String {
        resolve_primary_asset_id(&self.asset_id)
    }

    /// Convert a whole-unit decimal amount to atomic units.
    ///
    /// The result is an exact arbitrary-precision integer; its string form is
    /// always a plain digit run, never scientific notation. Fractional
    /// precision beyond `decimals` is rejected rather than truncated.
    pub fn to_atomic(&self, amount: Decimal) -> Result<BigUint> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::InvalidArgument(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }

        let normalized = amount.normalize();
        let scale = normalized.scale();
        if scale > self.decimals {
            return Err(Error::InvalidArgument(format!(
                "amount {} has more fractional digits than {} supports ({} decimals)",
                amount, self.asset_id, self.decimals
            )));
        }

        // mantissa is non-negative here; scale <= decimals so the exponent
        // below cannot underflow
        let mantissa = normalized.mantissa().unsigned_abs();
        let atomic = BigUint::from(mantissa) * BigUint::from(10u32).pow(self.decimals - scale);
        Ok(atomic)
    }

    /// Convert an atomic-unit integer back to a whole-unit decimal.
    ///
    /// Exact inverse of `to_atomic` for any amount representable at this
    /// asset's precision.
    pub fn from_atomic(&self, atomic: &BigUint) -> Result<Decimal> {
        let digits = atomic.to_str_radix(10);
        let rendered = if self.decimals == 0 {
            digits
        } else {
            let width = self.decimals as usize;
            let padded = if digits.len() <= width {
                format!("{:0>pad$}", digits, pad = width + 1)
            } else {
                digits
            };
            let split = padded.len() - width;
            format!("{}.{}", &padded[..split], &padded[split..])
        };

        let value = Decimal::from_str(&rendered).map_err(|_| {
            Error::InvalidArgument(format!(
                "atomic amount {} of {} exceeds representable decimal precision",
                atomic, self.asset_id
            ))
        })?;
        Ok(value.normalize())
    }

    /// Parse an atomic-unit amount string from a wire model.
    pub fn parse_atomic(amount: &str) -> Result<BigUint> {
        BigUint::from_str(amount).map_err(|_| {
            Error::MalformedResponse(format!("atomic amount is not a base-10 integer: {amount}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth() -> Asset {
        Asset::resolve("base-sepolia", "eth").unwrap()
    }

    fn usdc() -> Asset {
        Asset::resolve("base-sepolia", "usdc").unwrap()
    }

    #[test]
    fn test_half_eth_to_atomic() {
        let atomic = eth().to_atomic(Decimal::from_str("0.5").unwrap()).unwrap();
        assert_eq!(atomic.to_str_radix(10), "500000000000000000");
    }

    #[test]
    fn test_usdc_to_atomic() {
        let atomic = usdc().to_atomic(Decimal::from_str("5").unwrap()).unwrap();
        assert_eq!(atomic.to_str_radix(10), "5000000");
    }

    #[test]
    fn test_no_scientific_notation_for_large_amounts() {
        let atomic = eth().to_atomic(Decimal::from_str("2000").unwrap()).unwrap();
        let rendered = atomic.to_str_radix(10);
        assert_eq!(rendered, "2000000000000000000000");
        assert!(!rendered.contains('e'));
        assert!(!rendered.contains('E'));
        assert!(!rendered.contains('.'));
    }

    #[test]
    fn test_round_trip() {
        let asset = eth();
        for raw in ["0.5", "1", "2000", "0.000000000000000001", "123.456"] {
            let amount = Decimal::from_str(raw).unwrap();
            let atomic = asset.to_atomic(amount).unwrap();
            assert_eq!(asset.from_atomic(&atomic).unwrap(), amount, "{raw}");
        }
    }

    #[test]
    fn test_from_atomic_small_amounts_pad_correctly() {
        let asset = eth();
        let one_wei = BigUint::from(1u32);
        assert_eq!(
            asset.from_atomic(&one_wei).unwrap(),
            Decimal::from_str("0.000000000000000001").unwrap()
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = eth()
            .to_atomic(Decimal::from_str("-1").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_excess_precision_rejected() {
        // usdc carries 6 decimals; 7 fractional digits must not be truncated
        let err = usdc()
            .to_atomic(Decimal::from_str("0.0000001").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_trailing_zeros_are_not_excess_precision() {
        let atomic = usdc()
            .to_atomic(Decimal::from_str("1.5000000000").unwrap())
            .unwrap();
        assert_eq!(atomic.to_str_radix(10), "1500000");
    }

    #[test]
    fn test_unknown_asset_rejected() {
        let err = Asset::resolve("base-sepolia", "notacoin").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAsset(_)));
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!(resolve_primary_asset_id("wei"), "eth");
        assert_eq!(resolve_primary_asset_id("gwei"), "eth");
        assert_eq!(resolve_primary_asset_id("ETH"), "eth");
        // unknown ids pass through unchanged
        assert_eq!(resolve_primary_asset_id("mysterycoin"), "mysterycoin");
    }

    #[test]
    fn test_wei_denomination_is_atomic() {
        let wei = Asset::resolve("base-sepolia", "wei").unwrap();
        assert_eq!(wei.decimals(), 0);
        assert_eq!(wei.primary_asset_id(), "eth");
        let atomic = wei.to_atomic(Decimal::from_str("42").unwrap()).unwrap();
        assert_eq!(atomic.to_str_radix(10), "42");
    }

    #[test]
    fn test_server_decimals_take_precedence() {
        let asset = Asset::new("base-sepolia", "newtoken", Some(8), None).unwrap();
        assert_eq!(asset.decimals(), 8);

        let err = Asset::new("base-sepolia", "newtoken", None, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAsset(_)));
    }

    #[test]
    fn test_parse_atomic_rejects_non_integers() {
        assert!(Asset::parse_atomic("123456").is_ok());
        assert!(Asset::parse_atomic("1.5").is_err());
        assert!(Asset::parse_atomic("2e21").is_err());
    }
}
