//! Per-request correlation and access logging.
//!
//! Each request runs inside an `http_request` span with the correlation id
//! in task-local scope, so any [`crate::domain::Error`] built while handling
//! it carries the same id that ends up in the `trace-id` response header.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory; wrap the whole app with it.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use workshop::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::from_header(
            req.headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
        );
        let span = info_span!(
            "http_request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let started = Instant::now();
        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            TraceId::scope(trace_id, async move {
                let mut res = fut.await?;
                let status = res.status().as_u16();
                let elapsed_ms = started.elapsed().as_millis();
                if res.status().is_server_error() {
                    warn!(status, elapsed_ms, "request failed");
                } else {
                    info!(status, elapsed_ms, "request completed");
                }
                attach_header(&mut res, trace_id);
                Ok(res)
            })
            .instrument(span),
        )
    }
}

fn attach_header<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    // A hyphenated UUID is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        res.response_mut()
            .headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    fn header(res: &ServiceResponse<actix_web::body::BoxBody>) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("trace-id header")
            .to_owned()
    }

    #[actix_web::test]
    async fn handler_sees_the_echoed_id() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                HttpResponse::Ok().body(TraceId::current().map(|id| id.to_string()).unwrap_or_default())
            }),
        ))
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let echoed = header(&res);
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8"), echoed);
    }

    #[actix_web::test]
    async fn client_supplied_id_reaches_the_error_body() {
        let client_id = "6f1c2a0e-8f57-4d6b-9a59-0c0f7f0e2a11";
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::post().to(|| async {
                Err::<HttpResponse, _>(crate::domain::Error::internal("database exploded"))
            }),
        ))
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, client_id))
                .to_request(),
        )
        .await;
        assert_eq!(header(&res), client_id);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["traceId"], client_id);
        assert_eq!(body["message"], "Internal server error");
    }
}
