//! Database row types. These map directly to SQLite rows.
//! Distinct from intus-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};
use intus_types::models::{MessageRole, Mood};

#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct JournalRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CheckInRow {
    pub id: String,
    pub user_id: String,
    pub mood: Mood,
    pub stress_level: u8,
    pub energy_level: u8,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub safety_flags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a journal entry; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct JournalChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<Mood>,
    pub tags: Option<Vec<String>>,
}

impl JournalChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.mood.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Default)]
pub struct JournalFilter {
    /// Case-insensitive substring matched against title and content.
    pub query: Option<String>,
    /// Exact tag match.
    pub tag: Option<String>,
    /// Row cap; `None` returns everything.
    pub limit: Option<u32>,
}

#[derive(Debug, Default)]
pub struct CheckInChanges {
    pub mood: Option<Mood>,
    pub stress_level: Option<u8>,
    pub energy_level: Option<u8>,
    pub note: Option<String>,
}

impl CheckInChanges {
    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.stress_level.is_none()
            && self.energy_level.is_none()
            && self.note.is_none()
    }
}

/// Row counts removed by a data wipe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCounts {
    pub messages: usize,
    pub conversations: usize,
    pub journal_entries: usize,
    pub check_ins: usize,
}
