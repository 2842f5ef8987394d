// Auth service
// Bearer token decoding and the session token store

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::Identity;

/// Claims carried in the payload segment of the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    pub user: String,
    #[serde(default)]
    pub isadmin: bool,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not made of three dot-separated segments")]
    Malformed,
    #[error("token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token payload is not valid claims JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

/// A bearer token together with its decoded claims.
///
/// The signature is never checked here; the server does that. Only expiry is
/// inspected locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    raw: String,
    claims: TokenClaims,
}

impl AuthToken {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let claims = decode_claims(raw.trim())?;
        Ok(Self { raw, claims })
    }

    /// Token as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        self.raw.trim()
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.claims.exp, 0).single()
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.claims.exp
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.claims.user.clone(), self.claims.isadmin)
    }
}

fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let decoded = decode_segment(payload)?;
    Ok(serde_json::from_slice(&decoded)?)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| general_purpose::URL_SAFE.decode(segment))
}

/// Holds the session token and optionally mirrors it to a file.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: Option<AuthToken>,
    path: Option<PathBuf>,
}

impl TokenStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `path`. A missing or unreadable file starts the store empty.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = match Self::load(&path) {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Ignoring stored token at {}: {:#}", path.display(), e);
                None
            }
        };
        Self {
            token,
            path: Some(path),
        }
    }

    fn load(path: &Path) -> Result<Option<AuthToken>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let token = AuthToken::parse(raw.trim()).context("Stored token could not be decoded")?;
        Ok(Some(token))
    }

    /// The stored token, only while it is unexpired.
    pub fn current(&self) -> Option<&AuthToken> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> Option<&AuthToken> {
        self.token.as_ref().filter(|token| token.is_valid_at(now))
    }

    /// Identity of the current session, if the token is still valid.
    pub fn identity(&self) -> Option<Identity> {
        self.current().map(AuthToken::identity)
    }

    pub fn set(&mut self, token: AuthToken) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create token directory {}", parent.display())
                })?;
            }
            fs::write(path, token.as_str())
                .with_context(|| format!("Failed to write token file {}", path.display()))?;
        }
        log::info!("Signed in as {}", token.claims().user);
        self.token = Some(token);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove token file {}", path.display()))?;
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_claims() {
        let token = token_for("alice", false, 2_000_000_000);
        assert_eq!(token.claims().user, "alice");
        assert_eq!(token.claims().exp, 2_000_000_000);
        assert_eq!(token.identity(), Identity::new("alice", false));
    }

    #[test]
    fn test_missing_admin_claim_defaults_to_false() {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"iat":1,"exp":2,"user":"bob"}"#);
        let token = AuthToken::parse(format!("h.{}.s", payload)).unwrap();
        assert!(!token.identity().is_admin);
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let payload = general_purpose::URL_SAFE.encode(br#"{"iat":1,"exp":2,"user":"bo"}"#);
        assert!(AuthToken::parse(format!("h.{}.s", payload)).is_ok());
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(AuthToken::parse("abc"), Err(TokenError::Malformed)));
        assert!(matches!(AuthToken::parse("a.b.c.d"), Err(TokenError::Malformed)));
        assert!(matches!(AuthToken::parse("a.!!!.c"), Err(TokenError::Encoding(_))));
        let not_json = general_purpose::URL_SAFE_NO_PAD.encode(b"plain");
        assert!(matches!(
            AuthToken::parse(format!("a.{}.c", not_json)),
            Err(TokenError::Claims(_))
        ));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let token = token_for("alice", false, 1_000);
        let at = |secs| Utc.timestamp_opt(secs, 0).unwrap();
        assert!(token.is_valid_at(at(999)));
        assert!(!token.is_valid_at(at(1_000)));
    }

    #[test]
    fn test_store_hides_expired_token() {
        let mut store = TokenStore::in_memory();
        store.set(expired_token("alice", false)).unwrap();
        assert!(store.current().is_none());
        assert!(store.identity().is_none());

        store.set(live_token("alice", true)).unwrap();
        assert_eq!(store.identity(), Some(Identity::new("alice", true)));
    }

    #[test]
    fn test_persistent_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("token");

        let mut store = TokenStore::persistent(&path);
        assert!(store.current().is_none());
        let token = live_token("carol", false);
        store.set(token.clone()).unwrap();

        let reopened = TokenStore::persistent(&path);
        assert_eq!(reopened.current(), Some(&token));

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(TokenStore::persistent(&path).current().is_none());
    }

    #[test]
    fn test_corrupt_token_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "garbage").unwrap();
        assert!(TokenStore::persistent(&path).current().is_none());
    }
}
