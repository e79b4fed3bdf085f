//! Token handling with automatic memory zeroization.
//!
//! GitHub issues different token shapes with different reach: fine-grained
//! tokens are scoped per organization, while the enterprise seat-billing
//! endpoint only answers to a classic token. [`TokenStore`] keeps all of
//! them and resolves the right one per request.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, Zeroizing};

use crate::error::SourceError;

/// A personal access token that zeroizes its memory when dropped.
#[derive(Clone)]
pub struct SecureToken(Zeroizing<String>);

impl SecureToken {
    pub fn new(token: String) -> Self {
        Self(Zeroizing::new(token))
    }

    /// Exposes the token for use in a request header. Avoid copying the
    /// returned value; copies are not zeroized.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SecureToken {
    fn from(token: &str) -> Self {
        Self::new(token.to_string())
    }
}

impl From<String> for SecureToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureToken([REDACTED])")
    }
}

impl fmt::Display for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecureToken {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison to prevent timing attacks
        use subtle::ConstantTimeEq;
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecureToken {}

impl Serialize for SecureToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(SecureToken::new(token))
    }
}

impl Drop for SecureToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Resolves the token to use for a given request.
#[derive(Debug, Clone)]
pub struct TokenStore {
    fine_grained: SecureToken,
    classic: Option<SecureToken>,
    by_org: HashMap<String, SecureToken>,
}

impl TokenStore {
    /// Creates a store with the default fine-grained token.
    pub fn new(fine_grained: SecureToken) -> Self {
        Self {
            fine_grained,
            classic: None,
            by_org: HashMap::new(),
        }
    }

    /// Adds the classic token used for enterprise-wide endpoints.
    pub fn with_classic(mut self, classic: SecureToken) -> Self {
        self.classic = Some(classic);
        self
    }

    /// Adds an org-scoped token, preferred over the default for that org.
    pub fn with_org_token(mut self, org: impl Into<String>, token: SecureToken) -> Self {
        self.by_org.insert(org.into(), token);
        self
    }

    /// The token to use for requests scoped to the given organization.
    pub fn for_org(&self, org: &str) -> &SecureToken {
        self.by_org.get(org).unwrap_or(&self.fine_grained)
    }

    /// The classic token, required by the enterprise seat-billing endpoint.
    pub fn classic(&self) -> Result<&SecureToken, SourceError> {
        self.classic.as_ref().ok_or_else(|| {
            SourceError::ConfigError(
                "enterprise seat listing requires a classic token".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let token = SecureToken::from("ghp_super_secret");
        assert!(!format!("{:?}", token).contains("super_secret"));
        assert!(!format!("{}", token).contains("super_secret"));
    }

    #[test]
    fn expose_returns_the_value() {
        let token = SecureToken::from("ghp_abc");
        assert_eq!(token.expose_secret(), "ghp_abc");
    }

    #[test]
    fn org_token_preferred_over_default() {
        let store = TokenStore::new(SecureToken::from("default"))
            .with_org_token("acme", SecureToken::from("acme-token"));

        assert_eq!(store.for_org("acme").expose_secret(), "acme-token");
        assert_eq!(store.for_org("other").expose_secret(), "default");
    }

    #[test]
    fn classic_token_is_required_for_enterprise() {
        let store = TokenStore::new(SecureToken::from("default"));
        assert!(matches!(store.classic(), Err(SourceError::ConfigError(_))));

        let store = store.with_classic(SecureToken::from("classic"));
        assert_eq!(store.classic().unwrap().expose_secret(), "classic");
    }

    #[test]
    fn tokens_compare_by_value() {
        assert_eq!(SecureToken::from("a"), SecureToken::from("a"));
        assert_ne!(SecureToken::from("a"), SecureToken::from("b"));
    }
}
