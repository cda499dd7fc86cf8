use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;

/// Fixed, non-technical fallback shown when the NLP backend is unreachable.
/// The widget must always answer in-band rather than surface an error code.
pub const FALLBACK_MESSAGE: &str =
    "Lo siento, estoy experimentando problemas técnicos. Por favor, intenta de nuevo.";

#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error("Chatbot request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Chatbot service error: {0}")]
    Status(reqwest::StatusCode),
}

/// Wire contract of the NLP backend's /process-message endpoint
#[derive(Debug, Serialize)]
struct ProcessMessageRequest<'a> {
    business_id: i64,
    session_id: &'a str,
    user_message: &'a str,
    conversation_history: &'a [Value],
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub bot_response: String,
    pub detected_intent: String,
    #[serde(default)]
    pub entities: Value,
}

/// HTTP client for the external chatbot service. One attempt per message,
/// no retry: a failure degrades to the fallback reply at the handler.
pub struct ChatbotClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChatbotClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config::config().upstream.chatbot_url.clone(),
        }
    }

    pub async fn process_message(
        &self,
        business_id: i64,
        session_id: &str,
        user_message: &str,
        conversation_history: &[Value],
    ) -> Result<ChatReply, ChatbotError> {
        let response = self
            .client
            .post(format!("{}/process-message", self.base_url))
            .json(&ProcessMessageRequest {
                business_id,
                session_id,
                user_message,
                conversation_history,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatbotError::Status(response.status()));
        }

        Ok(response.json::<ChatReply>().await?)
    }
}
