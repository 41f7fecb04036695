//! Admin promotion secret and password hashing.
//!
//! The secret is either stored as a bcrypt hash (recognised by its `$2`
//! prefix) or as plain text. Plain secrets are compared by SHA-256 digest of
//! both sides so the comparison always runs over 32 bytes regardless of
//! input length.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::Error;

/// Where the secret currently in use was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// `admin_settings.admin_promotion_password`.
    Settings,
    /// Deployment-time fallback.
    Environment,
}

impl SecretSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Environment => "environment",
        }
    }
}

/// Promotion secret as configured.
pub enum StoredSecret {
    Bcrypt(Zeroizing<String>),
    Plain(Zeroizing<String>),
}

impl std::fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bcrypt(_) => f.write_str("StoredSecret::Bcrypt(..)"),
            Self::Plain(_) => f.write_str("StoredSecret::Plain(..)"),
        }
    }
}

impl StoredSecret {
    /// Classify a raw configured value.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::StoredSecret;
    ///
    /// let secret = StoredSecret::from_raw("fietsenmaker".to_owned());
    /// assert!(secret.verify("fietsenmaker").unwrap());
    /// assert!(!secret.verify("fietsenmaker ").unwrap());
    /// ```
    #[must_use]
    pub fn from_raw(raw: String) -> Self {
        let raw = Zeroizing::new(raw);
        if raw.starts_with("$2") {
            Self::Bcrypt(raw)
        } else {
            Self::Plain(raw)
        }
    }

    /// Compare `supplied` against the secret.
    ///
    /// Returns `Ok(false)` for a mismatch and an internal error when a stored
    /// hash cannot be parsed.
    pub fn verify(&self, supplied: &str) -> Result<bool, Error> {
        match self {
            Self::Bcrypt(hash) => bcrypt::verify(supplied, hash.as_str())
                .map_err(|err| Error::internal(format!("stored secret hash is unusable: {err}"))),
            Self::Plain(expected) => {
                let lhs = Sha256::digest(supplied.as_bytes());
                let rhs = Sha256::digest(expected.as_bytes());
                Ok(bool::from(lhs.as_slice().ct_eq(rhs.as_slice())))
            }
        }
    }
}

/// Work factor for hashes produced by [`hash_password`].
pub const PASSWORD_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Produce a bcrypt hash suitable for `admin_settings`.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, Error> {
    if plain.is_empty() {
        return Err(Error::invalid_request("password must not be empty"));
    }
    bcrypt::hash(plain, cost).map_err(|err| Error::internal(format!("hashing failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("geheim", "geheim", true)]
    #[case("geheim", "geheim2", false)]
    #[case("geheim", "", false)]
    #[case("een heel lang wachtwoord van de werkplaats", "een heel lang wachtwoord van de werkplaats", true)]
    fn plain_secrets_match_only_identical_input(
        #[case] stored: &str,
        #[case] supplied: &str,
        #[case] expected: bool,
    ) {
        let secret = StoredSecret::from_raw(stored.to_owned());
        assert!(matches!(secret, StoredSecret::Plain(_)));
        assert_eq!(secret.verify(supplied).expect("plain compare"), expected);
    }

    #[test]
    fn bcrypt_secrets_verify_against_plaintext() {
        let hash = hash_password("fietsenmaker", 4).expect("hash");
        let secret = StoredSecret::from_raw(hash);
        assert!(matches!(secret, StoredSecret::Bcrypt(_)));
        assert!(secret.verify("fietsenmaker").expect("verify"));
        assert!(!secret.verify("fietsenmakers").expect("verify"));
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        let secret = StoredSecret::from_raw("$2b$not-a-hash".to_owned());
        let error = secret.verify("x").expect_err("malformed");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[test]
    fn empty_password_cannot_be_hashed() {
        let error = hash_password("", 4).expect_err("empty");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn debug_output_hides_secret() {
        let secret = StoredSecret::from_raw("zichtbaar".to_owned());
        assert!(!format!("{secret:?}").contains("zichtbaar"));
    }
}
