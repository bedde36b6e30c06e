//! HTTP Signature implementation for `ActivityPub`.
//!
//! Implements the signing half of draft-cavage-http-signatures for
//! outbound `ActivityPub` requests.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rsa::{RsaPrivateKey, pkcs1v15::SigningKey};
use sha2::{Digest, Sha256};
use signature::{SignatureEncoding, Signer};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// HTTP Signature error.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// HTTP Signature signer for outgoing requests.
pub struct HttpSigner {
    signing_key: SigningKey<Sha256>,
    key_id: String,
}

impl HttpSigner {
    /// Create a signer for `key_id` from a decoded private key.
    #[must_use]
    pub fn new(private_key: RsaPrivateKey, key_id: impl Into<String>) -> Self {
        Self {
            signing_key: SigningKey::<Sha256>::new(private_key),
            key_id: key_id.into(),
        }
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign an HTTP request and return the headers to send with it.
    ///
    /// Always signs `(request-target) host date`, plus `digest` when there
    /// is a body and any `additional_headers` (names lowercase).
    pub fn sign_request(
        &self,
        method: &str,
        url: &Url,
        body: Option<&[u8]>,
        additional_headers: &BTreeMap<String, String>,
    ) -> Result<HeaderMap, SignatureError> {
        let host = url
            .host_str()
            .ok_or_else(|| SignatureError::InvalidUrl("No host in URL".to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let query = url.query().map_or(String::new(), |q| format!("?{q}"));
        let request_target = format!("{} {}{query}", method.to_lowercase(), url.path());

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let digest = body.map(calculate_digest);

        let mut signed: Vec<(&str, &str)> = vec![
            ("(request-target)", request_target.as_str()),
            ("host", host.as_str()),
            ("date", date.as_str()),
        ];
        if let Some(digest) = &digest {
            signed.push(("digest", digest.as_str()));
        }
        for (name, value) in additional_headers {
            if !signed.iter().any(|(signed_name, _)| *signed_name == name.as_str()) {
                signed.push((name.as_str(), value.as_str()));
            }
        }

        let signing_string = signed
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        debug!(signing_string = %signing_string, "Signing string");

        let signature = self
            .signing_key
            .try_sign(signing_string.as_bytes())
            .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

        let signature_header = format!(
            "keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            signed
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(" "),
            BASE64.encode(signature.to_bytes())
        );

        let mut headers = HeaderMap::new();
        headers.insert("Host", header_value(&host)?);
        headers.insert("Date", header_value(&date)?);
        if let Some(digest) = &digest {
            headers.insert("Digest", header_value(digest)?);
        }
        headers.insert("Signature", header_value(&signature_header)?);

        for (name, value) in additional_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SignatureError::InvalidHeader(e.to_string()))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, SignatureError> {
    HeaderValue::from_str(value).map_err(|e| SignatureError::InvalidHeader(e.to_string()))
}

/// Calculate SHA-256 digest of a body.
#[must_use]
pub fn calculate_digest(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("SHA-256={}", BASE64.encode(hash))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use linkgator_common::crypto::generate_rsa_keypair;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use signature::Verifier;

    const KEY_ID: &str = "https://gator.example/users/alice#main-key";

    fn signature_params(header: &str) -> BTreeMap<String, String> {
        header
            .split(',')
            .filter_map(|part| part.split_once('='))
            .map(|(k, v)| (k.to_string(), v.trim_matches('"').to_string()))
            .collect()
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = generate_rsa_keypair(1024).unwrap();
        let signer = HttpSigner::new(keypair.private_key.clone(), KEY_ID);

        let url = Url::parse("https://remote.example/inbox").unwrap();
        let body = br#"{"type":"Accept"}"#;
        let mut extra = BTreeMap::new();
        extra.insert(
            "content-type".to_string(),
            "application/activity+json".to_string(),
        );

        let headers = signer.sign_request("POST", &url, Some(body), &extra).unwrap();
        let params = signature_params(headers.get("Signature").unwrap().to_str().unwrap());

        assert_eq!(params["keyId"], KEY_ID);
        assert_eq!(params["algorithm"], "rsa-sha256");
        assert_eq!(
            params["headers"],
            "(request-target) host date digest content-type"
        );

        let signing_string = format!(
            "(request-target): post /inbox\nhost: remote.example\ndate: {}\ndigest: {}\ncontent-type: application/activity+json",
            headers.get("Date").unwrap().to_str().unwrap(),
            calculate_digest(body),
        );
        let signature_bytes = BASE64.decode(&params["signature"]).unwrap();
        let signature = Signature::try_from(signature_bytes.as_slice()).unwrap();
        VerifyingKey::<Sha256>::new(keypair.public_key)
            .verify(signing_string.as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn test_sign_without_body_has_no_digest() {
        let keypair = generate_rsa_keypair(1024).unwrap();
        let signer = HttpSigner::new(keypair.private_key, KEY_ID);
        let url = Url::parse("http://localhost:8080/users/bob?page=1").unwrap();

        let headers = signer
            .sign_request("GET", &url, None, &BTreeMap::new())
            .unwrap();

        assert!(headers.get("Digest").is_none());
        assert_eq!(headers.get("Host").unwrap(), "localhost:8080");
    }

    #[test]
    fn test_calculate_digest() {
        assert_eq!(
            calculate_digest(b"hello world"),
            "SHA-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
    }
}
