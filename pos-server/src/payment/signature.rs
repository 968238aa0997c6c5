//! Request / callback signing
//!
//! `sign = hex(HMAC-SHA256(api_key, "k1=v1&k2=v2&..."))` with keys sorted
//! lexicographically and the `sign` field itself left out.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::utils::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Name of the signature field
pub const SIGN_FIELD: &str = "sign";

/// Sorted `key=value&...` string of every field except `sign`
///
/// Values go in verbatim, so callers must hold the exact text that was signed.
pub fn canonical_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| k.as_str() != SIGN_FIELD)
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn mac_for(params: &BTreeMap<String, String>, key: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
    mac.update(canonical_string(params).as_bytes());
    Some(mac)
}

/// Lowercase hex signature
pub fn sign(params: &BTreeMap<String, String>, key: &str) -> AppResult<String> {
    let mac = mac_for(params, key).ok_or_else(|| AppError::internal("HMAC key error"))?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of `signature` against the recomputed HMAC
pub fn verify(params: &BTreeMap<String, String>, signature: &str, key: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature.trim()) else {
        return false;
    };
    match mac_for(params, key) {
        Some(mac) => mac.verify_slice(&sig_bytes).is_ok(),
        None => false,
    }
}
