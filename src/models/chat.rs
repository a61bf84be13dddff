// src/models/chat.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::error::AppError;
use crate::models::metrics::require_user_id;

pub const MAX_MESSAGE_LEN: usize = 5000;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Sender::User),
            "bot" => Some(Sender::Bot),
            _ => None,
        }
    }
}

/// One line of a mental-health chat transcript
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
}

/// A chat request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChat {
    pub user_id: String,
    pub message: String,
}

impl ChatRequest {
    /// Validate and sanitize the chat request
    pub fn validate(self) -> Result<ValidatedChat, AppError> {
        let user_id = require_user_id(self.user_id)?;
        let raw = self.message.ok_or(AppError::MissingParameter("message"))?;
        let message = raw
            .trim()
            .chars()
            .filter(|&c| c != '\0')
            .collect::<String>()
            .trim()
            .to_string();

        if message.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "Message cannot exceed {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        Ok(ValidatedChat { user_id, message })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub is_fallback: bool,
    /// Failure class of the upstream call when `is_fallback` is set.
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

/// Response for fetching chat history
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
}
