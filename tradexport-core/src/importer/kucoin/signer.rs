//! KuCoin API v2 request signing.
//!
//! KuCoin signs each private request with:
//! 1. `KC-API-SIGN` = base64(HMAC-SHA256(secret, timestamp + method + endpoint + body))
//! 2. `KC-API-PASSPHRASE` = base64(HMAC-SHA256(secret, passphrase)) for key version 2
//!
//! `endpoint` is the path including the query string, exactly as sent.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const KEY_VERSION: &str = "2";

fn hmac_base64(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take any size");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Signature over one request.
pub fn sign(
    credentials: &Credentials,
    timestamp_ms: i64,
    method: &str,
    endpoint: &str,
    body: &str,
) -> String {
    hmac_base64(
        &credentials.api_secret,
        &format!("{timestamp_ms}{method}{endpoint}{body}"),
    )
}

/// Authentication headers for a request.
pub fn auth_headers(
    credentials: &Credentials,
    timestamp_ms: i64,
    method: &str,
    endpoint: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("KC-API-KEY", credentials.api_key.clone()),
        ("KC-API-SIGN", sign(credentials, timestamp_ms, method, endpoint, "")),
        ("KC-API-TIMESTAMP", timestamp_ms.to_string()),
        (
            "KC-API-PASSPHRASE",
            hmac_base64(&credentials.api_secret, &credentials.api_passphrase),
        ),
        ("KC-API-KEY-VERSION", KEY_VERSION.to_string()),
    ]
}
