//! API token formatting, parsing and verifier hashing.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::customers::records::CustomerUuid;

/// API token identifier prefix.
pub const API_TOKEN_PREFIX: &str = "sl";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

const API_TOKEN_SECRET_HEX_CHARS: usize = API_TOKEN_SECRET_BYTES * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for ApiTokenVersion {
    type Err = ApiTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Clone)]
pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; API_TOKEN_SECRET_BYTES] {
        &self.bytes
    }

    /// Generate a secret from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self::from_bytes(bytes)
    }

    fn to_hex(&self) -> String {
        let mut encoded = String::with_capacity(API_TOKEN_SECRET_HEX_CHARS);

        for byte in &self.bytes {
            for nibble in [byte >> 4, byte & 0x0f] {
                if let Some(digit) = char::from_digit(u32::from(nibble), 16) {
                    encoded.push(digit);
                }
            }
        }

        encoded
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedApiToken {
    pub token_uuid: Uuid,
    pub version: ApiTokenVersion,
    pub secret: ApiTokenSecret,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

/// Render a token as `sl_v1_<uuid>.<hex secret>`.
#[must_use]
pub fn format_api_token(
    token_uuid: Uuid,
    version: ApiTokenVersion,
    secret: &ApiTokenSecret,
) -> String {
    format!(
        "{API_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        secret.to_hex()
    )
}

/// Split a bearer token into its parts.
///
/// # Errors
///
/// Returns an [`ApiTokenError`] when the prefix, version, UUID or secret are malformed.
pub fn parse_api_token(token: &str) -> Result<ParsedApiToken, ApiTokenError> {
    let (prefix_and_id, secret_hex) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;

    if prefix != API_TOKEN_PREFIX {
        return Err(ApiTokenError::InvalidFormat);
    }

    let version = ApiTokenVersion::from_str(version_segment)?;

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_err| ApiTokenError::InvalidFormat)?;

    let secret = decode_secret_hex(secret_hex).ok_or(ApiTokenError::InvalidSecretEncoding)?;

    Ok(ParsedApiToken {
        token_uuid,
        version,
        secret: ApiTokenSecret::from_bytes(secret),
    })
}

/// SHA-256 verifier stored in place of the token.
///
/// Input: `{token_uuid_hex}:{version_i16_decimal}:{customer_uuid_hex}:{secret_hex}`
#[must_use]
pub fn token_hash(
    token_uuid: &Uuid,
    version: ApiTokenVersion,
    customer_uuid: &CustomerUuid,
    secret: &ApiTokenSecret,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(
        format!(
            "{}:{}:{}:{}",
            token_uuid.simple(),
            version.as_i16(),
            customer_uuid.into_uuid().simple(),
            secret.to_hex(),
        )
        .as_bytes(),
    );

    format!("{:x}", hasher.finalize())
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; API_TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != API_TOKEN_SECRET_HEX_CHARS || !secret_hex.is_ascii() {
        return None;
    }

    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).ok()?;

        *byte = u8::from_str_radix(pair, 16).ok()?;
    }

    Some(secret)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_and_format_round_trip() -> TestResult {
        let token_uuid = Uuid::now_v7();
        let secret = ApiTokenSecret::from_bytes([0xAB; API_TOKEN_SECRET_BYTES]);
        let token = format_api_token(token_uuid, ApiTokenVersion::V1, &secret);

        assert!(token.starts_with("sl_v1_"), "unexpected token {token}");
        assert_eq!(token.split_once('.').map(|(_, hex)| hex.len()), Some(64));

        let parsed = parse_api_token(&token)?;

        assert_eq!(parsed.token_uuid, token_uuid);
        assert_eq!(parsed.version, ApiTokenVersion::V1);
        assert_eq!(parsed.secret.as_bytes(), secret.as_bytes());

        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        let secret = "ab".repeat(32);

        assert_eq!(
            parse_api_token(&format!("lt_v1_{}.{secret}", Uuid::nil().simple())).err(),
            Some(ApiTokenError::InvalidFormat)
        );
        assert_eq!(
            parse_api_token(&format!("sl_v9_{}.{secret}", Uuid::nil().simple())).err(),
            Some(ApiTokenError::UnsupportedVersion)
        );
        assert_eq!(
            parse_api_token(&format!("sl_v1_{}.zz", Uuid::nil().simple())).err(),
            Some(ApiTokenError::InvalidSecretEncoding)
        );
        assert_eq!(
            parse_api_token("no-dot-here").err(),
            Some(ApiTokenError::InvalidFormat)
        );
    }

    #[test]
    fn token_hash_depends_on_owner_and_secret() {
        let token_uuid = Uuid::nil();
        let customer = CustomerUuid::from_uuid(Uuid::nil());
        let secret = ApiTokenSecret::from_bytes([0xCD; API_TOKEN_SECRET_BYTES]);

        let hash = token_hash(&token_uuid, ApiTokenVersion::V1, &customer, &secret);

        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            token_hash(&token_uuid, ApiTokenVersion::V1, &customer, &secret)
        );
        assert_ne!(
            hash,
            token_hash(
                &token_uuid,
                ApiTokenVersion::V1,
                &CustomerUuid::new(),
                &secret
            )
        );
        assert_ne!(
            hash,
            token_hash(
                &token_uuid,
                ApiTokenVersion::V1,
                &customer,
                &ApiTokenSecret::generate()
            )
        );
    }
}
