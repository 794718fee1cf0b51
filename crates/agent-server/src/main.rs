//! Assistant HTTP Server
//!
//! Axum-based server exposing the tool-augmented assistant over a REST API.
//!
//! Tools: web search (DuckDuckGo), current weather (wttr.in) and currency
//! conversion (Frankfurter).

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::{delete, get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::AgentBuilder;
use agent_runtime::RuntimeConfig;

use crate::handlers::{
    chat_handler, create_session, delete_session, health_check, list_tools, reset_session,
    session_history,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration problems stop the server before it binds
    let config = RuntimeConfig::from_env().context("invalid assistant configuration")?;
    tracing::info!(provider = %config.provider, model = %config.options.model, "Loaded configuration");

    let backend = config.build_backend().context("failed to initialize model backend")?;

    match backend.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {}", backend.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - chats will fail until it is", backend.name());
        }
    }

    let tools = assistant_tools::default_registry().context("failed to build tool registry")?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let agent = AgentBuilder::new()
        .backend(backend)
        .tools(tools)
        .max_iterations(config.max_iterations)
        .build()?;

    let app = app(AppState::new(Arc::new(agent)));

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 assistant server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                    - Health check");
    tracing::info!("  GET  /api/tools                 - Tool manifest");
    tracing::info!("  POST /api/sessions              - Start a session");
    tracing::info!("  POST /api/chat                  - Send message");
    tracing::info!("  GET  /api/sessions/{{id}}/history - Session transcript");
    tracing::info!("  POST /api/sessions/{{id}}/reset   - Clear chat");
    tracing::info!("  DELETE /api/sessions/{{id}}       - End session");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))

        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", delete(delete_session))
        .route("/api/sessions/{id}/history", get(session_history))
        .route("/api/sessions/{id}/reset", post(reset_session))

        // Agent API
        .route("/api/chat", post(chat_handler))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agent_core::{mock::ScriptedBackend, Agent, ToolCallRequest};
    use assistant_tools::{currency::MockRateSource, search::MockSearchBackend, weather::MockWeatherSource};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(backend: ScriptedBackend) -> AppState {
        let tools = assistant_tools::registry_with(
            Arc::new(MockSearchBackend::new(Vec::new())),
            Arc::new(MockWeatherSource::new()),
            Arc::new(MockRateSource::new().with_rate("EUR", "GBP", dec!(0.85))),
        )
        .unwrap();
        AppState::new(Arc::new(Agent::with_defaults(Arc::new(backend), Arc::new(tools))))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    #[tokio::test]
    async fn test_tool_manifest() {
        let app = app(state(ScriptedBackend::new()));
        let (status, body) = send(&app, "GET", "/api/tools", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["search_web", "get_weather", "convert_currency"]);
    }

    #[tokio::test]
    async fn test_chat_history_and_reset() {
        let call = ToolCallRequest::new(
            "convert_currency",
            serde_json::from_value(json!({"amount": 10, "from_currency": "EUR", "to_currency": "GBP"})).unwrap(),
        );
        let backend = ScriptedBackend::new().tool_call(call).answer("10 EUR is 8.50 GBP.");
        let app = app(state(backend));

        let (status, body) = send(&app, "POST", "/api/chat", Some(json!({"message": "10 EUR in GBP?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "10 EUR is 8.50 GBP.");
        assert_eq!(body["termination"]["kind"], "answered");

        let id = body["session_id"].as_str().unwrap().to_string();
        let (_, history) = send(&app, "GET", &format!("/api/sessions/{id}/history"), None).await;
        let roles: Vec<&str> = history["turns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["user", "tool_observation", "assistant"]);

        let (status, _) = send(&app, "POST", &format!("/api/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, history) = send(&app, "GET", &format!("/api/sessions/{id}/history"), None).await;
        assert!(history["turns"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_and_empty_message() {
        let app = app(state(ScriptedBackend::new()));

        let (status, body) = send(&app, "GET", "/api/sessions/nope/history", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");

        let (status, _) = send(&app, "POST", "/api/chat", Some(json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_session() {
        let state = state(ScriptedBackend::new());
        let app = app(state.clone());

        let (status, body) = send(&app, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(state.session(body["session_id"].as_str().unwrap()).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let state = state(ScriptedBackend::new().answer("Hi!"));
        let app = app(state.clone());

        let (_, body) = send(&app, "POST", "/api/chat", Some(json!({"message": "hello"}))).await;
        let id = body["session_id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions.read().await.is_empty());

        let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }
}
