use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};

use crate::Database;
use crate::models::{JournalChanges, JournalFilter, JournalRow};
use crate::queries::{enum_column, like_pattern, sql_limit, string_list_column};

const JOURNAL_COLUMNS: &str = "id, user_id, title, content, mood, tags, created_at, updated_at";

impl Database {
    // -- Journal --

    pub fn insert_journal_entry(&self, entry: &JournalRow) -> Result<()> {
        let tags = serde_json::to_string(&entry.tags)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO journal_entries (id, user_id, title, content, mood, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    entry.id,
                    entry.user_id,
                    entry.title,
                    entry.content,
                    entry.mood.as_str(),
                    tags,
                    entry.created_at,
                    entry.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Fetch one entry by id *and* owner; another user's entry is `None`.
    pub fn get_journal_entry(&self, id: &str, user_id: &str) -> Result<Option<JournalRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE id = ?1 AND user_id = ?2"),
                    [id, user_id],
                    journal_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Newest first. Filters are optional; the tag filter matches one element
    /// of the stored JSON array exactly.
    pub fn list_journal_entries(&self, user_id: &str, filter: &JournalFilter) -> Result<Vec<JournalRow>> {
        let pattern = filter.query.as_deref().map(|q| like_pattern(&q.to_lowercase()));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                r"SELECT {JOURNAL_COLUMNS} FROM journal_entries
                  WHERE user_id = ?1
                    AND (?2 IS NULL
                         OR lower_unicode(title) LIKE ?2 ESCAPE '\'
                         OR lower_unicode(content) LIKE ?2 ESCAPE '\')
                    AND (?3 IS NULL OR EXISTS (
                        SELECT 1 FROM json_each(journal_entries.tags) WHERE json_each.value = ?3
                    ))
                  ORDER BY created_at DESC, rowid DESC
                  LIMIT ?4"
            ))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![user_id, pattern, filter.tag, sql_limit(filter.limit)],
                    journal_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Apply a partial update in a single owner-scoped statement. Returns the
    /// updated row, or `None` when no row matched both id and owner.
    pub fn update_journal_entry(
        &self,
        id: &str,
        user_id: &str,
        changes: &JournalChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<JournalRow>> {
        let tags = changes.tags.as_ref().map(serde_json::to_string).transpose()?;
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "UPDATE journal_entries
                         SET title = COALESCE(?3, title),
                             content = COALESCE(?4, content),
                             mood = COALESCE(?5, mood),
                             tags = COALESCE(?6, tags),
                             updated_at = ?7
                         WHERE id = ?1 AND user_id = ?2
                         RETURNING {JOURNAL_COLUMNS}"
                    ),
                    rusqlite::params![
                        id,
                        user_id,
                        changes.title,
                        changes.content,
                        changes.mood.map(|m| m.as_str()),
                        tags,
                        now,
                    ],
                    journal_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Owner-scoped delete. Returns whether a row was removed.
    pub fn delete_journal_entry(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM journal_entries WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(removed > 0)
        })
    }
}

fn journal_from_row(row: &Row<'_>) -> rusqlite::Result<JournalRow> {
    Ok(JournalRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        mood: enum_column(row, 4)?,
        tags: string_list_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use intus_types::models::Mood;
    use uuid::Uuid;

    use crate::Database;
    use crate::models::{JournalChanges, JournalFilter, JournalRow};
    use crate::queries::test_support::{minutes_ago, new_db, new_user};

    fn add_entry(db: &Database, user_id: &str, title: &str, tags: &[&str], at: DateTime<Utc>) -> String {
        let row = JournalRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: format!("contenido de {title}"),
            mood: Mood::Calm,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: at,
            updated_at: at,
        };
        db.insert_journal_entry(&row).unwrap();
        row.id
    }

    #[test]
    fn list_is_newest_first_and_respects_limit() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        add_entry(&db, &user, "primero", &[], minutes_ago(30));
        add_entry(&db, &user, "segundo", &[], minutes_ago(20));
        add_entry(&db, &user, "tercero", &[], minutes_ago(10));

        let all = db.list_journal_entries(&user, &JournalFilter::default()).unwrap();
        let titles: Vec<_> = all.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["tercero", "segundo", "primero"]);

        let limited = db
            .list_journal_entries(&user, &JournalFilter { limit: Some(2), ..Default::default() })
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].title, "tercero");
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        add_entry(&db, &user, "Reunión de Trabajo", &[], minutes_ago(2));
        add_entry(&db, &user, "Paseo", &[], minutes_ago(1));

        let filter = JournalFilter { query: Some("trabajo".into()), ..Default::default() };
        let found = db.list_journal_entries(&user, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Reunión de Trabajo");

        // "contenido de Paseo" matches through the content column.
        let filter = JournalFilter { query: Some("PASEO".into()), ..Default::default() };
        assert_eq!(db.list_journal_entries(&user, &filter).unwrap().len(), 1);

        // LIKE wildcards in the needle are literal.
        let filter = JournalFilter { query: Some("%".into()), ..Default::default() };
        assert!(db.list_journal_entries(&user, &filter).unwrap().is_empty());
    }

    #[test]
    fn search_folds_accented_capitals() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        add_entry(&db, &user, "ÁNIMO BAJO", &[], minutes_ago(2));
        add_entry(&db, &user, "Él no vino", &[], minutes_ago(1));

        let search = |q: &str| {
            let filter = JournalFilter { query: Some(q.into()), ..Default::default() };
            db.list_journal_entries(&user, &filter).unwrap()
        };

        let found = search("ánimo");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "ÁNIMO BAJO");

        let found = search("él no");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Él no vino");

        assert_eq!(search("ÉL NO VINO").len(), 1);
        assert_eq!(search("bajo").len(), 1);
    }

    #[test]
    fn tag_filter_matches_whole_tags_only() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        add_entry(&db, &user, "a", &["trabajo", "estres"], minutes_ago(2));
        add_entry(&db, &user, "b", &["trabajos"], minutes_ago(1));

        let filter = JournalFilter { tag: Some("trabajo".into()), ..Default::default() };
        let found = db.list_journal_entries(&user, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "a");
        assert_eq!(found[0].tags, ["trabajo", "estres"]);
    }

    #[test]
    fn other_users_cannot_read_update_or_delete() {
        let db = new_db();
        let owner = new_user(&db, "ana@ejemplo.com");
        let intruder = new_user(&db, "eva@ejemplo.com");
        let id = add_entry(&db, &owner, "privado", &[], minutes_ago(1));

        assert!(db.get_journal_entry(&id, &intruder).unwrap().is_none());
        assert!(db.list_journal_entries(&intruder, &JournalFilter::default()).unwrap().is_empty());

        let changes = JournalChanges { title: Some("robado".into()), ..Default::default() };
        assert!(db.update_journal_entry(&id, &intruder, &changes, Utc::now()).unwrap().is_none());
        assert!(!db.delete_journal_entry(&id, &intruder).unwrap());

        let entry = db.get_journal_entry(&id, &owner).unwrap().unwrap();
        assert_eq!(entry.title, "privado");
    }

    #[test]
    fn partial_update_keeps_unsupplied_columns() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        let id = add_entry(&db, &user, "original", &["uno"], minutes_ago(5));

        let changes = JournalChanges {
            mood: Some(Mood::Anxious),
            tags: Some(vec!["dos".into()]),
            ..Default::default()
        };
        let updated = db.update_journal_entry(&id, &user, &changes, Utc::now()).unwrap().unwrap();

        assert_eq!(updated.title, "original");
        assert_eq!(updated.content, "contenido de original");
        assert_eq!(updated.mood, Mood::Anxious);
        assert_eq!(updated.tags, ["dos"]);
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn delete_removes_only_once() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        let id = add_entry(&db, &user, "borrar", &[], minutes_ago(1));

        assert!(db.delete_journal_entry(&id, &user).unwrap());
        assert!(!db.delete_journal_entry(&id, &user).unwrap());
        assert!(db.get_journal_entry(&id, &user).unwrap().is_none());
    }
}
