//! Public HTTP api for the inquiry website.
//!
//! Three routes: the website POSTs `/api/initiate-chat` when a visitor picks
//! a company, gets back a `wa.me` link with a greeting pre-filled, and sends
//! the visitor off to chat. `/api/chat-redirect` is the link-shortener
//! variant of the same thing, and `/api/session-status` exists for poking at
//! records while debugging. The interesting work all happens later, when the
//! visitor's first message arrives over the channel.

use {
    axum::{
        Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Json, Redirect},
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::{error, info, warn},
};

use {leadline_common::now_ms, leadline_sessions::SessionRegistry};

/// Greeting pre-filled into the chat link minted by `/api/initiate-chat`.
const INITIATE_GREETING: &str = "Hello, I am interested in your services for a move.";
/// Greeting used by the redirect route. Deliberately carries no session id;
/// correlation happens by phone number, not by message content.
const REDIRECT_GREETING: &str = "Hello, I am interested in your services.";

// ── Shared app state ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    /// The paired bot number, as configured (may contain `+` and spaces).
    pub bot_phone: String,
}

/// Build the api router (shared between production startup and tests).
pub fn build_app(registry: SessionRegistry, bot_phone: impl Into<String>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_state = AppState {
        registry,
        bot_phone: bot_phone.into(),
    };

    Router::new()
        .route("/", get(health_handler))
        .route("/api/initiate-chat", post(initiate_chat_handler))
        .route("/api/chat-redirect", get(chat_redirect_handler))
        .route("/api/session-status/{session_id}", get(session_status_handler))
        .layer(cors)
        .with_state(app_state)
}

/// `https://wa.me/<digits>?text=<greeting>`, with `+` and whitespace
/// stripped from the configured number.
fn chat_link(bot_phone: &str, greeting: &str) -> String {
    let digits: String = bot_phone
        .chars()
        .filter(|c| *c != '+' && !c.is_whitespace())
        .collect();
    format!("https://wa.me/{digits}?text={}", urlencoding::encode(greeting))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    "leadline api is running"
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateChatRequest {
    #[serde(default)]
    company_id: String,
    #[serde(default)]
    image_url: String,
}

async fn initiate_chat_handler(
    State(state): State<AppState>,
    Json(body): Json<InitiateChatRequest>,
) -> impl IntoResponse {
    let company_id = body.company_id.trim();
    let mut errors = Vec::new();
    if company_id.is_empty() {
        errors.push("Company ID is required.");
    }
    if body.image_url.is_empty() {
        errors.push("Invalid image URL");
    }
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response();
    }

    match state
        .registry
        .create(company_id, Some(body.image_url))
        .await
    {
        Ok(session) => {
            let wa_link = chat_link(&state.bot_phone, INITIATE_GREETING);
            info!(session_id = %session.session_id, company_id, "chat link generated");
            Json(serde_json::json!({
                "message": "WhatsApp chat link generated successfully.",
                "waLink": wa_link,
                "sessionId": session.session_id,
            }))
            .into_response()
        },
        Err(e) => {
            error!(error = %e, company_id, "failed to create inquiry session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "message": "Failed to generate chat link. Please try again.",
                })),
            )
                .into_response()
        },
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedirectQuery {
    session_id: Option<String>,
}

async fn chat_redirect_handler(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> impl IntoResponse {
    let Some(session_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId").into_response();
    };

    match state.registry.get(&session_id).await {
        Ok(Some(_)) => {
            Redirect::temporary(&chat_link(&state.bot_phone, REDIRECT_GREETING)).into_response()
        },
        Ok(None) => (StatusCode::BAD_REQUEST, "Invalid or expired session.").into_response(),
        Err(e) => {
            error!(error = %e, session_id = %session_id, "failed to load session for redirect");
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.").into_response()
        },
    }
}

async fn session_status_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&session_id).await {
        Ok(Some(session)) => Json(serde_json::json!({
            "exists": true,
            "ageMinutes": session.age_minutes(now_ms()),
            "data": session,
        }))
        .into_response(),
        Ok(None) => Json(serde_json::json!({ "exists": false })).into_response(),
        Err(e) => {
            warn!(error = %e, session_id = %session_id, "failed to check session status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to check session status" })),
            )
                .into_response()
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chat_link_strips_plus_and_spaces_from_the_number() {
        let link = chat_link("+234 501 110 0000", "hi there");
        assert_eq!(link, "https://wa.me/2345011100000?text=hi%20there");
    }

    #[test]
    fn chat_link_percent_encodes_the_greeting() {
        let link = chat_link("2345011100000", INITIATE_GREETING);
        assert_eq!(
            link,
            "https://wa.me/2345011100000?text=Hello%2C%20I%20am%20interested%20in%20your%20services%20for%20a%20move."
        );
    }
}
