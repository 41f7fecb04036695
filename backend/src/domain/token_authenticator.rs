//! Bearer token authentication over the identity store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{Authenticator, IdentityResolver};
use crate::domain::service_support::map_identity_error;
use crate::domain::{AccessToken, Error, UserId};

/// [`Authenticator`] that looks token digests up through an
/// [`IdentityResolver`].
pub struct TokenAuthenticator<I> {
    identities: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<I> TokenAuthenticator<I> {
    pub fn new(identities: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self { identities, clock }
    }
}

#[async_trait]
impl<I> Authenticator for TokenAuthenticator<I>
where
    I: IdentityResolver,
{
    async fn authenticate(&self, token: &AccessToken) -> Result<UserId, Error> {
        let digest = token.digest();
        match self
            .identities
            .resolve(&digest, self.clock.utc())
            .await
            .map_err(map_identity_error)?
        {
            Some(user_id) => Ok(user_id),
            None => {
                debug!("bearer token rejected");
                Err(Error::unauthorized("invalid or expired token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{IdentityError, MockIdentityResolver};
    use crate::test_support::{MutableClock, fixture_now};

    fn authenticator(identities: MockIdentityResolver) -> TokenAuthenticator<MockIdentityResolver> {
        TokenAuthenticator::new(
            Arc::new(identities),
            Arc::new(MutableClock::new(fixture_now())),
        )
    }

    #[tokio::test]
    async fn known_token_resolves_to_its_owner() {
        let owner = UserId::random();
        let token = AccessToken::new("werkplaats-token").expect("token");
        let expected = token.digest();
        let mut identities = MockIdentityResolver::new();
        identities
            .expect_resolve()
            .withf(move |digest, now| *digest == expected && *now == fixture_now())
            .returning(move |_, _| Ok(Some(owner)));

        let user = authenticator(identities)
            .authenticate(&token)
            .await
            .expect("authenticated");
        assert_eq!(user, owner);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let mut identities = MockIdentityResolver::new();
        identities.expect_resolve().returning(|_, _| Ok(None));

        let error = authenticator(identities)
            .authenticate(&AccessToken::new("stale").expect("token"))
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn unreachable_identity_store_is_unavailable() {
        let mut identities = MockIdentityResolver::new();
        identities
            .expect_resolve()
            .returning(|_, _| Err(IdentityError::connection("refused")));

        let error = authenticator(identities)
            .authenticate(&AccessToken::new("any").expect("token"))
            .await
            .expect_err("store down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
