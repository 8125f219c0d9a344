//! Authentication utilities for the Bitunix futures API
//!
//! Every request carries a double SHA-256 signature:
//!
//! ```text
//! digest = sha256_hex(nonce + timestamp + api_key + sorted_query + body)
//! sign   = sha256_hex(digest + api_secret)
//! ```
//!
//! `sorted_query` is the key-sorted concatenation `k1v1k2v2...` and `body`
//! is the compact JSON request body (empty for GET).

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::GatewayError;

/// Hex-encoded SHA-256 of a UTF-8 string
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Concatenate query parameters as `k1v1k2v2...` in key order
pub fn sorted_query_string(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
        .into_iter()
        .map(|(k, v)| format!("{}{}", k, v))
        .collect()
}

/// Compute the request signature
pub fn sign_request(
    nonce: &str,
    timestamp: &str,
    api_key: &str,
    api_secret: &str,
    sorted_query: &str,
    body: &str,
) -> String {
    let digest = sha256_hex(&format!(
        "{}{}{}{}{}",
        nonce, timestamp, api_key, sorted_query, body
    ));
    sha256_hex(&format!("{}{}", digest, api_secret))
}

/// Headers that accompany one signed request
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub nonce: String,
    pub timestamp: String,
    pub sign: String,
}

/// API credentials container
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    api_secret: String,
}

impl Credentials {
    /// Create new credentials from API key and secret
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Create credentials from environment variables
    ///
    /// Looks for `BITUNIX_API_KEY` and `BITUNIX_API_SECRET`
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_key = std::env::var("BITUNIX_API_KEY")?;
        let api_secret = std::env::var("BITUNIX_API_SECRET")?;
        Ok(Self::new(api_key, api_secret))
    }

    /// Read `{"api_key": ..., "api_secret": ...}` from a JSON file
    pub fn from_secrets_file(path: &Path) -> Result<Self, GatewayError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|_| GatewayError::MissingCredentials("secrets file not readable"))?;
        let secrets: SecretsFile = serde_json::from_str(&contents)?;
        Ok(Self::new(secrets.api_key, secrets.api_secret))
    }

    /// Environment first, then the secrets file. Empty values count as missing.
    pub fn resolve(secrets_path: &Path) -> Result<Self, GatewayError> {
        let creds = match Self::from_env() {
            Ok(c) => c,
            Err(_) => Self::from_secrets_file(secrets_path)?,
        };
        if creds.api_key.is_empty() {
            return Err(GatewayError::MissingCredentials("api key"));
        }
        if creds.api_secret.is_empty() {
            return Err(GatewayError::MissingCredentials("api secret"));
        }
        Ok(creds)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request with a fresh nonce and the current time
    pub fn sign(&self, sorted_query: &str, body: &str) -> SignedHeaders {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let sign = sign_request(
            &nonce,
            &timestamp,
            &self.api_key,
            &self.api_secret,
            sorted_query,
            body,
        );
        SignedHeaders {
            nonce,
            timestamp,
            sign,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "api_key",
                &format!("{}...", self.api_key.chars().take(6).collect::<String>()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sorted_query_string() {
        let params = vec![
            ("symbols".to_string(), "BTCUSDT".to_string()),
            ("marginCoin".to_string(), "USDT".to_string()),
        ];
        assert_eq!(sorted_query_string(&params), "marginCoinUSDTsymbolsBTCUSDT");
        assert_eq!(sorted_query_string(&[]), "");
    }

    #[test]
    fn test_sign_is_double_hash() {
        let sign = sign_request("n1", "1700000000000", "key", "secret", "symbolBTCUSDT", "");
        let digest = sha256_hex("n11700000000000keysymbolBTCUSDT");
        assert_eq!(sign, sha256_hex(&format!("{}secret", digest)));
        assert_eq!(sign.len(), 64);
    }

    #[test]
    fn test_different_secrets_produce_different_signatures() {
        let a = sign_request("n", "1", "k", "secret1", "", "{}");
        let b = sign_request("n", "1", "k", "secret2", "", "{}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_uses_fresh_nonce() {
        let creds = Credentials::new("my_key", "my_secret");
        let h1 = creds.sign("", "{}");
        let h2 = creds.sign("", "{}");
        assert_ne!(h1.nonce, h2.nonce);
        assert_eq!(h1.nonce.len(), 32);
    }

    #[test]
    fn test_secrets_file_with_empty_key_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"api_key":"","api_secret":""}"#).unwrap();

        let creds = Credentials::from_secrets_file(&path).unwrap();
        assert_eq!(creds.api_key(), "");
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = Credentials::new("abcdefghij", "topsecret");
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("topsecret"));
        assert!(dbg.contains("abcdef..."));
    }

    #[test]
    fn test_debug_handles_multibyte_and_short_keys() {
        let creds = Credentials::new("kéyéyéyé", "s");
        assert!(format!("{:?}", creds).contains("kéyéyé..."));

        let creds = Credentials::new("ab", "s");
        assert!(format!("{:?}", creds).contains("ab..."));
    }
}
