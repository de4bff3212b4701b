use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::seed;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name            TEXT,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE journal_entries (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                mood        TEXT NOT NULL,
                tags        TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_journal_user_created
                ON journal_entries(user_id, created_at);

            CREATE TABLE check_ins (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                mood            TEXT NOT NULL,
                stress_level    INTEGER NOT NULL CHECK (stress_level BETWEEN 0 AND 10),
                energy_level    INTEGER NOT NULL CHECK (energy_level BETWEEN 0 AND 10),
                note            TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_check_ins_user_created
                ON check_ins(user_id, created_at);

            CREATE TABLE conversations (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_conversations_user
                ON conversations(user_id, created_at);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                role            TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content         TEXT NOT NULL,
                safety_flags    TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_conversation
                ON messages(conversation_id, created_at);

            CREATE TABLE tools (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                type            TEXT NOT NULL,
                description     TEXT NOT NULL,
                duration_min    INTEGER NOT NULL,
                steps           TEXT NOT NULL
            );

            CREATE TABLE scenarios (
                id          TEXT PRIMARY KEY,
                type        TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                steps       TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE resources (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                type        TEXT NOT NULL,
                phone       TEXT,
                url         TEXT
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    // Reference data is inserted with OR IGNORE, so this is safe on every start.
    seed::seed_catalog(conn)?;

    info!("Database migrations complete");
    Ok(())
}
