use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::middleware::{ApiJson, ApiResponse};
use crate::services::chatbot::{ChatbotClient, FALLBACK_MESSAGE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub conversation_history: Vec<Value>,
}

/// POST /chat/:business_id/message
///
/// Proxy to the NLP backend. When the backend fails the widget still gets a
/// chat-shaped body so the conversation degrades instead of breaking; the
/// 502 status is for operators, not the widget.
pub async fn process_message(
    Path(business_id): Path<i64>,
    ApiJson(payload): ApiJson<ChatMessageRequest>,
) -> Response {
    let client = ChatbotClient::new();
    match client
        .process_message(
            business_id,
            &payload.session_id,
            &payload.message,
            &payload.conversation_history,
        )
        .await
    {
        Ok(reply) => ApiResponse::success(json!({
            "botResponse": reply.bot_response,
            "detectedIntent": reply.detected_intent,
            "entities": reply.entities,
        }))
        .into_response(),
        Err(e) => {
            warn!("Chatbot backend failure for business {}: {}", business_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "success": false,
                    "data": {
                        "botResponse": FALLBACK_MESSAGE,
                        "detectedIntent": "error",
                        "entities": {},
                    },
                })),
            )
                .into_response()
        }
    }
}
