//! Request extractors for caller identity and network origin.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! bearer-token parsing and identity resolution here. Handlers take an
//! [`AuthenticatedUser`] argument and never see the raw token.

use actix_web::http::header::{AUTHORIZATION, USER_AGENT};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{AccessToken, ClientInfo, Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "bearer ";

/// Caller identity resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Identifier of the authenticated caller.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<AccessToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = value.split_at_checked(BEARER_PREFIX.len()).ok_or_else(|| {
        Error::unauthorized("authorization header must use the bearer scheme")
    })?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(Error::unauthorized(
            "authorization header must use the bearer scheme",
        ));
    }
    AccessToken::new(token.trim())
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let authenticator = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| state.authenticator.clone());
        Box::pin(async move {
            let authenticator = authenticator
                .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let token = token?;
            let user_id = authenticator.authenticate(&token).await?;
            debug!(%user_id, "request authenticated");
            Ok(Self(user_id))
        })
    }
}

/// Network origin of the request, recorded in the audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestClient(pub ClientInfo);

impl FromRequest for RequestClient {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned);
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        ready(Ok(Self(ClientInfo { ip, user_agent })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{VALID_TOKEN, bearer, state_for};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    fn whoami_app(
        caller: UserId,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state_for(caller)))
            .route(
                "/whoami",
                web::get().to(|user: AuthenticatedUser, client: RequestClient| async move {
                    HttpResponse::Ok().body(format!(
                        "{}|{}",
                        user.user_id(),
                        client.0.user_agent.unwrap_or_default()
                    ))
                }),
            )
    }

    #[actix_web::test]
    async fn resolves_the_bearer_token() {
        let caller = UserId::random();
        let app = test::init_service(whoami_app(caller)).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(bearer(VALID_TOKEN))
            .insert_header((USER_AGENT, "werkplaats-tablet/1.0"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, format!("{caller}|werkplaats-tablet/1.0").as_bytes());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwdw=="))]
    #[case(Some("Bearer "))]
    #[case(Some("Bearer revoked-token"))]
    #[actix_web::test]
    async fn rejects_missing_or_unknown_credentials(#[case] header: Option<&str>) {
        let app = test::init_service(whoami_app(UserId::random())).await;

        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn scheme_is_case_insensitive() {
        let caller = UserId::random();
        let app = test::init_service(whoami_app(caller)).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, format!("bearer {VALID_TOKEN}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
