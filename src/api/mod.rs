//! Agenda Backend API
//!
//! In-memory HTTP and WebSocket backend, built with Axum. It serves the endpoints the
//! dashboard clients talk to, for local development and end-to-end tests.
//!
//! # Endpoints
//!
//! ## Timeslots
//! - `POST /timeslots` - Store one availability interval
//! - `GET /timeslots` - List stored intervals
//!
//! ## Users
//! - `POST /auth` - Log in, returns `accessToken`
//! - `POST /user` - Register a user
//!
//! ## Health
//! - `GET /health` - Status, uptime and chat connection count
//!
//! ## WebSocket
//! - `GET /ws?token=<bearer>` - Chat channel
//!
//! # Example
//!
//! ```rust,ignore
//! use agenda::api::{serve, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     serve(AppState::new(config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState, StoredTimeslot, UserRecord};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route(
            "/timeslots",
            post(routes::timeslots::create_timeslot).get(routes::timeslots::list_timeslots),
        )
        .route("/auth", post(routes::auth::login))
        .route("/user", post(routes::users::register_user))
        .route("/health", get(routes::health::health))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Agenda backend listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Agenda backend shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, AppState) {
        let state = AppState::new(ApiConfig::default());
        (build_router(state.clone()), state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn user_body(email: &str) -> Value {
        json!({
            "user_name": "Ana",
            "last_name": "Pérez",
            "phone": "555-123-4567",
            "email": email,
            "password": "secreto",
            "age": 30,
            "direccion": "Calle 1",
            "rol": "profesor"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["chat_connections"], 0);
    }

    #[tokio::test]
    async fn test_create_timeslot() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(post_json(
                "/timeslots",
                json!({"dayOfWeek": "Miércoles", "startTime": "08:00", "endTime": "09:00"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["dayOfWeek"], "Miércoles");
        assert_eq!(body["startTime"], "08:00");
        assert!(body["id"].is_string());
        assert_eq!(state.timeslots().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_timeslot_inverted() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(post_json(
                "/timeslots",
                json!({"dayOfWeek": "Lunes", "startTime": "09:00", "endTime": "08:00"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("08:00"));
        assert!(body["request_id"].is_string());
        assert!(state.timeslots().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_timeslot_bad_time() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(post_json(
                "/timeslots",
                json!({"dayOfWeek": "Lunes", "startTime": "9", "endTime": "25:00"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_timeslots() {
        let (app, _) = create_test_app();

        app.clone()
            .oneshot(post_json(
                "/timeslots",
                json!({"dayOfWeek": "Jueves", "startTime": "10:00", "endTime": "11:00"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/timeslots").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["timeslots"][0]["dayOfWeek"], "Jueves");
    }

    #[tokio::test]
    async fn test_register_then_duplicate() {
        let (app, _) = create_test_app();

        let first = app
            .clone()
            .oneshot(post_json("/user", user_body("ana@example.com")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let body = body_json(first).await;
        assert_eq!(body["rol"], "profesor");
        assert!(body.get("password").is_none());

        let second = app
            .oneshot(post_json("/user", user_body("ana@example.com")))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let body = body_json(second).await;
        assert_eq!(body["message"], "El correo ya está registrado");
    }

    #[tokio::test]
    async fn test_register_unknown_role() {
        let (app, _) = create_test_app();
        let mut body = user_body("ana@example.com");
        body["rol"] = json!("director");

        let response = app.oneshot(post_json("/user", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login() {
        let (app, state) = create_test_app();
        app.clone()
            .oneshot(post_json("/user", user_body("ana@example.com")))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth",
                json!({"email": "ana@example.com", "password": "secreto"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["accessToken"].as_str().unwrap();
        assert!(state.user_for_token(token).await.is_some());

        let rejected = app
            .oneshot(post_json(
                "/auth",
                json!({"email": "ana@example.com", "password": "mal"}),
            ))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(rejected).await;
        assert_eq!(body["message"], "Credenciales inválidas");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
