//! Mapping from intus-db rows to the API models in intus-types.

use tracing::warn;
use uuid::Uuid;

use intus_db::models::{CheckInRow, ConversationRow, JournalRow, MessageRow, UserRow};
use intus_types::api::UserSummary;
use intus_types::models::{CheckIn, Conversation, JournalEntry, Message, UserProfile};

/// Ids are written by this service as UUID text; anything else is corruption,
/// logged and replaced by the nil UUID rather than failing the whole response.
pub fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

pub fn user_summary(row: &UserRow) -> UserSummary {
    UserSummary {
        id: parse_id(&row.id, "user"),
        email: row.email.clone(),
        name: row.name.clone(),
    }
}

pub fn user_profile(row: UserRow) -> UserProfile {
    UserProfile {
        id: parse_id(&row.id, "user"),
        name: row.name,
        email: row.email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn journal_entry(row: JournalRow) -> JournalEntry {
    JournalEntry {
        id: parse_id(&row.id, "journal entry"),
        user_id: parse_id(&row.user_id, "user"),
        title: row.title,
        content: row.content,
        mood: row.mood,
        tags: row.tags,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn check_in(row: CheckInRow) -> CheckIn {
    CheckIn {
        id: parse_id(&row.id, "check-in"),
        user_id: parse_id(&row.user_id, "user"),
        mood: row.mood,
        stress_level: row.stress_level,
        energy_level: row.energy_level,
        note: row.note,
        created_at: row.created_at,
    }
}

pub fn conversation(row: ConversationRow) -> Conversation {
    Conversation {
        id: parse_id(&row.id, "conversation"),
        user_id: parse_id(&row.user_id, "user"),
        created_at: row.created_at,
    }
}

pub fn message(row: MessageRow) -> Message {
    Message {
        id: parse_id(&row.id, "message"),
        conversation_id: parse_id(&row.conversation_id, "conversation"),
        role: row.role,
        content: row.content,
        safety_flags: row.safety_flags,
        created_at: row.created_at,
    }
}
