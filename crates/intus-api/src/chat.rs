use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::warn;
use uuid::Uuid;

use intus_db::models::{ConversationRow, MessageRow};
use intus_types::api::{ChatExchange, Claims, ConversationDetail, OkResponse, SendMessageRequest};
use intus_types::models::{Conversation, MessageRole};

use crate::error::ApiError;
use crate::rows;
use crate::state::AppState;
use crate::validation::{MAX_MESSAGE_CHARS, check_length, trimmed};

const NOT_FOUND: ApiError = ApiError::NotFound("Conversation not found");

/// POST /chat/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = ConversationRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        created_at: chrono::Utc::now(),
    };

    let row = state
        .run_db(move |db| {
            db.insert_conversation(&row)?;
            Ok(row)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(rows::conversation(row))))
}

/// GET /chat/conversations
///
/// Newest first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let user_id = claims.sub.to_string();
    let rows = state.run_db(move |db| db.list_conversations(&user_id)).await?;

    Ok(Json(rows.into_iter().map(rows::conversation).collect()))
}

/// GET /chat/conversations/{id}
///
/// The conversation with its messages.
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let user_id = claims.sub.to_string();
    let found = state
        .run_db(move |db| {
            let id = id.to_string();
            let Some(conversation) = db.get_conversation(&id, &user_id)? else {
                return Ok(None);
            };
            let messages = db.list_messages(&id, &user_id)?;
            Ok(Some((conversation, messages)))
        })
        .await?;

    let (conversation, messages) = found.ok_or(NOT_FOUND)?;
    Ok(Json(ConversationDetail {
        conversation: rows::conversation(conversation),
        messages: messages.into_iter().map(rows::message).collect(),
    }))
}

/// DELETE /chat/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id = claims.sub.to_string();
    let removed = state
        .run_db(move |db| db.delete_conversation(&id.to_string(), &user_id))
        .await?;

    if !removed {
        return Err(NOT_FOUND);
    }
    Ok(Json(OkResponse { ok: true }))
}

/// POST /chat/conversations/{id}/messages
///
/// Stores the user's message, waits the configured reply delay, then stores
/// and returns the responder's reply. When the safety check fires, both
/// messages carry the safety flag.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<SendMessageRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let content = trimmed(req.content).ok_or_else(|| ApiError::bad_request("Content required"))?;
    check_length(&content, "Content", MAX_MESSAGE_CHARS)?;

    let reply = state.responder.respond(&content);
    if !reply.safety_flags.is_empty() {
        // Never log the message text itself.
        warn!("Safety keywords detected in conversation {} (user {})", id, claims.sub);
    }

    let user_message = MessageRow {
        id: Uuid::new_v4().to_string(),
        conversation_id: id.to_string(),
        role: MessageRole::User,
        content,
        safety_flags: reply.safety_flags.clone(),
        created_at: chrono::Utc::now(),
    };
    let user_message = insert_owned(&state, user_message, &claims).await?;

    if !state.reply_delay.is_zero() {
        tokio::time::sleep(state.reply_delay).await;
    }

    let assistant_message = MessageRow {
        id: Uuid::new_v4().to_string(),
        conversation_id: id.to_string(),
        role: MessageRole::Assistant,
        content: reply.content,
        safety_flags: reply.safety_flags,
        created_at: chrono::Utc::now(),
    };
    let assistant_message = insert_owned(&state, assistant_message, &claims).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChatExchange {
            user_message: rows::message(user_message),
            reply: rows::message(assistant_message),
        }),
    ))
}

/// Insert through the owner-scoped statement; a conversation that is missing
/// or belongs to someone else reads as not found.
async fn insert_owned(state: &AppState, message: MessageRow, claims: &Claims) -> Result<MessageRow, ApiError> {
    let user_id = claims.sub.to_string();
    let (inserted, message) = state
        .run_db(move |db| {
            let inserted = db.insert_message(&message, &user_id)?;
            Ok((inserted, message))
        })
        .await?;

    if !inserted {
        return Err(NOT_FOUND);
    }
    Ok(message)
}
