use anyhow::Result;
use rusqlite::Transaction;

use crate::Database;
use crate::models::PurgeCounts;

impl Database {
    // -- Account purge --

    /// Remove every row the user owns but keep the account. Runs as a single
    /// transaction: either all stores are wiped or none are.
    pub fn wipe_user_data(&self, user_id: &str) -> Result<PurgeCounts> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let counts = delete_owned_rows(&tx, user_id)?;
            tx.commit()?;
            Ok(counts)
        })
    }

    /// Remove the account and everything it owns. Dependent rows are deleted
    /// explicitly before the user row, so this holds even without the
    /// `ON DELETE CASCADE` rules. Returns whether the user row existed.
    pub fn delete_user(&self, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            delete_owned_rows(&tx, user_id)?;
            let removed = tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }
}

fn delete_owned_rows(tx: &Transaction<'_>, user_id: &str) -> Result<PurgeCounts> {
    // Order follows the foreign keys: messages before their conversations.
    let messages = tx.execute(
        "DELETE FROM messages WHERE conversation_id IN
            (SELECT id FROM conversations WHERE user_id = ?1)",
        [user_id],
    )?;
    let conversations = tx.execute("DELETE FROM conversations WHERE user_id = ?1", [user_id])?;
    let journal_entries = tx.execute("DELETE FROM journal_entries WHERE user_id = ?1", [user_id])?;
    let check_ins = tx.execute("DELETE FROM check_ins WHERE user_id = ?1", [user_id])?;

    Ok(PurgeCounts {
        messages,
        conversations,
        journal_entries,
        check_ins,
    })
}
