pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::MySqlPool;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

/// Shared handler state. The pool serves the alias endpoints; the data
/// endpoint builds its own short-lived connection from `connect_options` on
/// every request.
#[derive(Clone)]
pub struct ApiState {
    pub pool: MySqlPool,
    pub connect_options: MySqlConnectOptions,
}

pub fn router(state: ApiState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/data", get(handlers::get_latest_readings))
        .route(
            "/api/aliases",
            get(handlers::get_aliases).post(handlers::set_alias),
        )
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::Value;
    use sqlx::mysql::MySqlPoolOptions;

    /// State pointing at a port nothing listens on, so every connection
    /// attempt fails fast. The pool is lazy and performs no I/O until used.
    fn unreachable_state() -> ApiState {
        let connect_options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .database("sensors")
            .username("nobody")
            .password("nothing")
            .charset("utf8mb4");
        let pool = MySqlPoolOptions::new().connect_lazy_with(connect_options.clone());
        ApiState {
            pool,
            connect_options,
        }
    }

    fn server() -> TestServer {
        TestServer::new(router(unreachable_state())).expect("test server")
    }

    #[tokio::test]
    async fn health_does_not_touch_the_database() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn data_endpoint_answers_connection_failure_with_200_error_body() {
        let response = server().get("/api/data").await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let message = body["error"].as_str().expect("error field");
        assert!(
            message.starts_with("Connection failed: "),
            "unexpected error body: {body}"
        );
    }

    #[tokio::test]
    async fn cross_origin_requests_get_the_wildcard_allow_header() {
        let response = server()
            .get("/api/data")
            .add_header(
                header::ORIGIN,
                HeaderValue::from_static("http://dashboard.local"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn alias_fetch_maps_database_errors_to_500() {
        let response = server().get("/api/aliases").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = server().get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc = response.json::<Value>();
        assert!(doc["paths"]["/api/data"]["get"].is_object());
    }
}
