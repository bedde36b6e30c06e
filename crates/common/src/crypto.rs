//! Cryptographic utilities for `ActivityPub` signatures.
//!
//! Actor keys are RSA keys used with RSASSA-PKCS1-v1_5. They are persisted
//! by storage backends as JSON Web Keys (RFC 7517/7518) and published in
//! actor documents as SPKI PEM.
//!
//! # Examples
//!
//! ```
//! use linkgator_common::crypto::{generate_rsa_keypair, RsaJwk};
//!
//! let keypair = generate_rsa_keypair(1024).expect("Failed to generate keypair");
//! let (public_jwk, private_jwk) = keypair.to_jwks();
//!
//! let restored = private_jwk.to_private_key().expect("valid JWK");
//! assert_eq!(RsaJwk::from_private_key(&restored), private_jwk);
//! assert_eq!(public_jwk.kty, "RSA");
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::{
    BigUint, RsaPrivateKey, RsaPublicKey,
    pkcs8::{EncodePublicKey, LineEnding},
    traits::{PrivateKeyParts, PublicKeyParts},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppError, AppResult};

/// JWK algorithm identifier for RSASSA-PKCS1-v1_5 with SHA-256.
pub const JWK_ALG_RS256: &str = "RS256";

/// RSA key pair for `ActivityPub` HTTP Signatures.
#[derive(Debug, Clone)]
pub struct RsaKeypair {
    /// Private signing key.
    pub private_key: RsaPrivateKey,
    /// Public verification key.
    pub public_key: RsaPublicKey,
}

impl RsaKeypair {
    /// Export both halves as JWKs, public first.
    #[must_use]
    pub fn to_jwks(&self) -> (RsaJwk, RsaJwk) {
        (
            RsaJwk::from_public_key(&self.public_key),
            RsaJwk::from_private_key(&self.private_key),
        )
    }

    /// Public key in SPKI PEM format.
    pub fn public_key_pem(&self) -> AppResult<String> {
        public_key_pem(&self.public_key)
    }
}

/// Generate a new RSA key pair with a modulus of `bits` bits.
///
/// This is CPU bound; async callers should run it on a blocking thread.
pub fn generate_rsa_keypair(bits: usize) -> AppResult<RsaKeypair> {
    let mut rng = rand::thread_rng();

    let private_key = RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| AppError::Internal(format!("Failed to generate RSA key: {e}")))?;
    let public_key = RsaPublicKey::from(&private_key);

    Ok(RsaKeypair {
        private_key,
        public_key,
    })
}

/// Encode a public key as SPKI PEM.
pub fn public_key_pem(key: &RsaPublicKey) -> AppResult<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| AppError::Internal(format!("Failed to encode public key: {e}")))
}

/// Errors produced while decoding a JWK.
#[derive(Debug, Error)]
pub enum JwkError {
    #[error("Invalid JWK JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("Missing JWK member: {0}")]
    MissingMember(&'static str),
    #[error("Invalid base64url in JWK member {0}")]
    InvalidEncoding(&'static str),
    #[error("Invalid RSA key: {0}")]
    InvalidKey(String),
}

/// RSA JSON Web Key.
///
/// Public keys carry only `n` and `e`; private keys additionally carry the
/// private exponent and CRT parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl RsaJwk {
    /// Build the public JWK for a key.
    #[must_use]
    pub fn from_public_key(key: &RsaPublicKey) -> Self {
        Self {
            kty: "RSA".to_string(),
            alg: Some(JWK_ALG_RS256.to_string()),
            n: encode_uint(key.n()),
            e: encode_uint(key.e()),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            key_ops: Some(vec!["verify".to_string()]),
            ext: Some(true),
        }
    }

    /// Build the private JWK for a key.
    #[must_use]
    pub fn from_private_key(key: &RsaPrivateKey) -> Self {
        let primes = key.primes();
        Self {
            kty: "RSA".to_string(),
            alg: Some(JWK_ALG_RS256.to_string()),
            n: encode_uint(key.n()),
            e: encode_uint(key.e()),
            d: Some(encode_uint(key.d())),
            p: primes.first().map(encode_uint),
            q: primes.get(1).map(encode_uint),
            dp: key.dp().map(encode_uint),
            dq: key.dq().map(encode_uint),
            qi: key.crt_coefficient().as_ref().map(encode_uint),
            key_ops: Some(vec!["sign".to_string()]),
            ext: Some(true),
        }
    }

    /// Whether this JWK carries private key material.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Parse a JWK from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, JwkError> {
        let jwk: Self = serde_json::from_str(text)?;
        if jwk.kty != "RSA" {
            return Err(JwkError::UnsupportedKeyType(jwk.kty));
        }
        Ok(jwk)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, JwkError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the public key.
    pub fn to_public_key(&self) -> Result<RsaPublicKey, JwkError> {
        let n = decode_uint("n", &self.n)?;
        let e = decode_uint("e", &self.e)?;
        RsaPublicKey::new(n, e).map_err(|err| JwkError::InvalidKey(err.to_string()))
    }

    /// Decode the private key.
    pub fn to_private_key(&self) -> Result<RsaPrivateKey, JwkError> {
        let n = decode_uint("n", &self.n)?;
        let e = decode_uint("e", &self.e)?;
        let d = decode_uint("d", self.d.as_deref().ok_or(JwkError::MissingMember("d"))?)?;
        let p = decode_uint("p", self.p.as_deref().ok_or(JwkError::MissingMember("p"))?)?;
        let q = decode_uint("q", self.q.as_deref().ok_or(JwkError::MissingMember("q"))?)?;

        let mut key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|err| JwkError::InvalidKey(err.to_string()))?;
        key.validate()
            .map_err(|err| JwkError::InvalidKey(err.to_string()))?;
        key.precompute()
            .map_err(|err| JwkError::InvalidKey(err.to_string()))?;
        Ok(key)
    }
}

fn encode_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_uint(member: &'static str, value: &str) -> Result<BigUint, JwkError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| JwkError::InvalidEncoding(member))?;
    if bytes.is_empty() {
        return Err(JwkError::InvalidEncoding(member));
    }
    Ok(BigUint::from_bytes_be(&bytes))
}
