use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use crate::Database;
use crate::models::{ConversationRow, MessageRow};
use crate::queries::{enum_column, string_list_column};

impl Database {
    // -- Conversations --

    pub fn insert_conversation(&self, conversation: &ConversationRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![conversation.id, conversation.user_id, conversation.created_at],
            )?;
            Ok(())
        })
    }

    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, created_at FROM conversations
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_conversation(&self, id: &str, user_id: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, created_at FROM conversations WHERE id = ?1 AND user_id = ?2",
                    [id, user_id],
                    conversation_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Remove a conversation and its messages in one transaction. Messages go
    /// first so the delete does not depend on the cascade rule.
    pub fn delete_conversation(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM messages WHERE conversation_id IN
                    (SELECT id FROM conversations WHERE id = ?1 AND user_id = ?2)",
                [id, user_id],
            )?;
            let removed =
                tx.execute("DELETE FROM conversations WHERE id = ?1 AND user_id = ?2", [id, user_id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    // -- Messages --

    /// Insert a message only if its conversation belongs to `user_id`. The
    /// ownership check and the insert are the same statement. Returns whether
    /// the row was written.
    pub fn insert_message(&self, message: &MessageRow, user_id: &str) -> Result<bool> {
        let flags = serde_json::to_string(&message.safety_flags)?;
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO messages (id, conversation_id, role, content, safety_flags, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6
                 WHERE EXISTS (SELECT 1 FROM conversations WHERE id = ?2 AND user_id = ?7)",
                rusqlite::params![
                    message.id,
                    message.conversation_id,
                    message.role.as_str(),
                    message.content,
                    flags,
                    message.created_at,
                    user_id,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Messages of one conversation in chronological order, visible only to
    /// the conversation owner.
    pub fn list_messages(&self, conversation_id: &str, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.conversation_id, m.role, m.content, m.safety_flags, m.created_at
                 FROM messages m
                 JOIN conversations c ON m.conversation_id = c.id
                 WHERE m.conversation_id = ?1 AND c.user_id = ?2
                 ORDER BY m.created_at ASC, m.rowid ASC",
            )?;
            let rows = stmt
                .query_map([conversation_id, user_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: enum_column(row, 2)?,
        content: row.get(3)?,
        safety_flags: string_list_column(row, 4)?,
        created_at: row.get(5)?,
    })
}
