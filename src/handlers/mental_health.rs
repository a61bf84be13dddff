use actix_web::{web, HttpResponse};

use crate::middleware::auth::Claims;
use crate::models::chat::{
    ChatHistoryQuery, ChatHistoryResponse, ChatRequest, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
use crate::models::error::AppError;
use crate::models::metrics::require_user_id;
use crate::services::conversation_service::ConversationService;

/// Always answers 200 when the message is valid; an unreachable model
/// produces a fallback reply flagged with `isFallback`.
#[tracing::instrument(
    name = "Send mental health chat message",
    skip(body, conversation, claims),
    fields(caller = %claims.sub)
)]
pub async fn send_chat_message(
    body: web::Json<ChatRequest>,
    conversation: web::Data<ConversationService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let chat = body.into_inner().validate()?;
    claims.ensure_owns(&chat.user_id)?;

    let reply = conversation.chat(&chat.user_id, &chat.message).await?;
    if reply.is_fallback {
        tracing::warn!("Served fallback chat reply: {:?}", reply.reason);
    }
    Ok(HttpResponse::Ok().json(reply))
}

#[tracing::instrument(
    name = "Get mental health chat history",
    skip(query, conversation, claims),
    fields(caller = %claims.sub)
)]
pub async fn get_chat_history(
    query: web::Query<ChatHistoryQuery>,
    conversation: web::Data<ConversationService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let user_id = require_user_id(query.user_id)?;
    let limit = history_limit(query.limit)?;
    claims.ensure_owns(&user_id)?;

    let messages = conversation.history(&user_id, limit).await?;
    Ok(HttpResponse::Ok().json(ChatHistoryResponse { user_id, messages }))
}

fn history_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(0) => Err(AppError::Validation("limit must be at least 1".to_string())),
        Some(n) => Ok(n.min(MAX_HISTORY_LIMIT)),
    }
}
