//! Opaque bearer tokens issued by the identity provider.
//!
//! Tokens never leave the inbound adapter in plain form: lookups use the
//! hex-encoded SHA-256 digest, which is also what the token table stores.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::Error;

/// Bearer token as presented in the `Authorization` header.
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Accept a non-empty token without inner whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = Zeroizing::new(raw.into());
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(Error::unauthorized("malformed bearer token"));
        }
        Ok(Self(raw))
    }

    /// Digest used as the storage key.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::AccessToken;
    ///
    /// let token = AccessToken::new("abc").unwrap();
    /// assert_eq!(
    ///     token.digest().as_str(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Hex-encoded SHA-256 of an [`AccessToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap a digest read back from storage.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("two parts")]
    fn rejects_malformed_tokens(#[case] raw: &str) {
        assert!(AccessToken::new(raw).is_err());
    }

    #[test]
    fn digest_is_stable_and_hides_token() {
        let token = AccessToken::new("werkplaats-token").expect("token");
        assert_eq!(token.digest(), token.digest());
        assert_eq!(token.digest().as_str().len(), 64);
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}
