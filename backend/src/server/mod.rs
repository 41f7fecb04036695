//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, WorkshopSettings};

use state_builders::{States, build_server_states};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use workshop::Trace;
#[cfg(debug_assertions)]
use workshop::doc::ApiDoc;
use workshop::inbound::http::health::{HealthState, live, ready};
use workshop::inbound::http::state::HttpState;
use workshop::inbound::http::{configure_api, functions, json_config, query_config};
use workshop::inbound::ws;
use workshop::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .configure(configure_api)
        .configure(functions::configure)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the vision gateway client cannot be
/// built or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        db_pool,
        options,
    } = config;
    let States { http, ws } = build_server_states(db_pool.as_ref(), options)?;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http.clone(),
            ws_state: ws.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use workshop::domain::{DEFAULT_BOARD_REFRESH, TransitionPolicy};

    use super::config::WorkshopOptions;

    fn options() -> WorkshopOptions {
        WorkshopOptions {
            admin_password: None,
            super_admin: None,
            transition_policy: TransitionPolicy::Strict,
            board_refresh: DEFAULT_BOARD_REFRESH,
            password_hash_cost: 4,
            vision: None,
        }
    }

    fn deps() -> AppDependencies {
        let States { http, ws } = build_server_states(None, options()).expect("states");
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: http,
            ws_state: ws,
        }
    }

    #[actix_web::test]
    async fn routes_are_mounted() {
        let app = test::init_service(build_app(deps())).await;

        for (uri, expected) in [
            ("/api/v1/tv/board", StatusCode::OK),
            ("/api/v1/workflow/statuses", StatusCode::OK),
            ("/api/v1/bikes", StatusCode::UNAUTHORIZED),
            ("/health/live", StatusCode::OK),
            ("/health/ready", StatusCode::SERVICE_UNAVAILABLE),
        ] {
            let response =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(response.status(), expected, "{uri}");
        }
    }

    #[actix_web::test]
    async fn functions_reject_missing_tokens() {
        let app = test::init_service(build_app(deps())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/functions/v1/hash-password")
                .set_json(serde_json::json!({ "password": "geheim" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_server_marks_ready() {
        let health = web::Data::new(HealthState::new());
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("address"), options());

        let _server = create_server(health.clone(), config).expect("server");
        assert!(health.is_ready());
    }
}
