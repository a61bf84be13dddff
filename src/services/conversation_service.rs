use std::sync::Arc;

use crate::db::HealthStore;
use crate::models::chat::{ChatMessage, ChatReply, Sender};
use crate::models::error::AppError;
use crate::services::llm_service::LLMService;

/// Messages of prior conversation fed back into the prompt.
const CONTEXT_MESSAGES: usize = 10;

const SYSTEM_PROMPT: &str = "You are a warm, supportive wellbeing companion inside a personal \
health app. Listen carefully, reflect the user's feelings, and offer gentle, practical \
suggestions such as breathing exercises, rest, hydration or reaching out to someone they \
trust. You are not a therapist and never diagnose. If the user mentions self-harm or being \
in danger, encourage them to contact local emergency services or a crisis line right away. \
Keep replies under 120 words.";

/// Mental-health chat: forwards to the LLM and keeps the transcript.
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn HealthStore>,
    llm: LLMService,
}

impl ConversationService {
    pub fn new(store: Arc<dyn HealthStore>, llm: LLMService) -> Self {
        Self { store, llm }
    }

    /// Reply to `message`, degrading to a canned reply if the LLM fails.
    /// Both sides of the exchange are appended to the transcript.
    #[tracing::instrument(
        name = "Mental health chat",
        skip(self, message),
        fields(user_id = %user_id)
    )]
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply, AppError> {
        let context = self.store.chat_history(user_id, CONTEXT_MESSAGES).await?;
        let prompt = build_prompt(&context, message);

        let reply = match self.llm.generate(&prompt).await {
            Ok(content) => ChatReply {
                reply: content,
                is_fallback: false,
                reason: None,
            },
            Err(e) => {
                tracing::error!("LLM unavailable, using fallback reply: {}", e);
                ChatReply {
                    reply: fallback_reply(message).to_string(),
                    is_fallback: true,
                    reason: Some(e.reason().to_string()),
                }
            }
        };

        self.store
            .append_chat_messages(
                user_id,
                &[ChatMessage::user(message), ChatMessage::bot(reply.reply.clone())],
            )
            .await?;

        Ok(reply)
    }

    pub async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self.store.chat_history(user_id, limit).await?)
    }
}

pub fn build_prompt(context: &[ChatMessage], message: &str) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n");
    for previous in context {
        let speaker = match previous.sender {
            Sender::User => "User",
            Sender::Bot => "Companion",
        };
        prompt.push_str(&format!("{}: {}\n", speaker, previous.text));
    }
    prompt.push_str(&format!("User: {}\nCompanion:", message));
    prompt
}

/// Canned reply used when the LLM cannot be reached.
pub fn fallback_reply(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if mentions(&["suicide", "kill myself", "self-harm", "hurt myself", "end my life"]) {
        "I'm really sorry you're going through this. You deserve support right now: please \
         contact your local emergency number or a crisis line, or reach out to someone you trust."
    } else if mentions(&["anxious", "anxiety", "panic", "stress", "overwhelmed"]) {
        "That sounds like a lot to carry. Try breathing in slowly for four counts, holding for \
         four, and breathing out for six. I'm here whenever you want to talk it through."
    } else if mentions(&["sleep", "tired", "insomnia", "exhausted"]) {
        "Rest matters so much. A calm wind-down routine and a screen-free last half hour can \
         help. Would you like to log how you slept last night?"
    } else if mentions(&["sad", "lonely", "down", "depressed"]) {
        "I'm sorry you're feeling this way. Your feelings are valid, and reaching out to \
         someone you trust can really help. I'm listening."
    } else {
        "Thanks for sharing that with me. I'm having trouble responding right now, but I'm \
         still here. Could you tell me a little more about how you're feeling?"
    }
}
