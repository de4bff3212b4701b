use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};

use crate::Database;
use crate::models::{CheckInChanges, CheckInRow};
use crate::queries::enum_column;

const CHECK_IN_COLUMNS: &str = "id, user_id, mood, stress_level, energy_level, note, created_at";

impl Database {
    // -- Check-ins --

    pub fn insert_check_in(&self, check_in: &CheckInRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO check_ins (id, user_id, mood, stress_level, energy_level, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    check_in.id,
                    check_in.user_id,
                    check_in.mood.as_str(),
                    check_in.stress_level,
                    check_in.energy_level,
                    check_in.note,
                    check_in.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Oldest first, optionally restricted to rows created at or after `since`.
    pub fn list_check_ins(&self, user_id: &str, since: Option<DateTime<Utc>>) -> Result<Vec<CheckInRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHECK_IN_COLUMNS} FROM check_ins
                 WHERE user_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
                 ORDER BY created_at ASC, rowid ASC"
            ))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id, since], check_in_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_check_in(&self, id: &str, user_id: &str) -> Result<Option<CheckInRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE id = ?1 AND user_id = ?2"),
                    [id, user_id],
                    check_in_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_check_in(
        &self,
        id: &str,
        user_id: &str,
        changes: &CheckInChanges,
    ) -> Result<Option<CheckInRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "UPDATE check_ins
                         SET mood = COALESCE(?3, mood),
                             stress_level = COALESCE(?4, stress_level),
                             energy_level = COALESCE(?5, energy_level),
                             note = COALESCE(?6, note)
                         WHERE id = ?1 AND user_id = ?2
                         RETURNING {CHECK_IN_COLUMNS}"
                    ),
                    rusqlite::params![
                        id,
                        user_id,
                        changes.mood.map(|m| m.as_str()),
                        changes.stress_level,
                        changes.energy_level,
                        changes.note,
                    ],
                    check_in_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_check_in(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed =
                conn.execute("DELETE FROM check_ins WHERE id = ?1 AND user_id = ?2", [id, user_id])?;
            Ok(removed > 0)
        })
    }
}

fn check_in_from_row(row: &Row<'_>) -> rusqlite::Result<CheckInRow> {
    Ok(CheckInRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood: enum_column(row, 2)?,
        stress_level: row.get(3)?,
        energy_level: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use intus_types::models::Mood;
    use uuid::Uuid;

    use crate::Database;
    use crate::models::{CheckInChanges, CheckInRow};
    use crate::queries::test_support::{new_db, new_user};

    fn add_check_in(db: &Database, user_id: &str, stress: u8, at: DateTime<Utc>) -> String {
        let row = CheckInRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            mood: Mood::Ok,
            stress_level: stress,
            energy_level: 5,
            note: None,
            created_at: at,
        };
        db.insert_check_in(&row).unwrap();
        row.id
    }

    #[test]
    fn window_excludes_older_rows_and_sorts_ascending() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        let now = Utc::now();
        add_check_in(&db, &user, 9, now - Duration::days(10));
        add_check_in(&db, &user, 2, now - Duration::hours(1));
        add_check_in(&db, &user, 5, now - Duration::days(3));

        let recent = db.list_check_ins(&user, Some(now - Duration::days(7))).unwrap();
        let levels: Vec<_> = recent.iter().map(|c| c.stress_level).collect();
        assert_eq!(levels, [5, 2]);

        assert_eq!(db.list_check_ins(&user, None).unwrap().len(), 3);
    }

    #[test]
    fn level_bounds_are_enforced_by_the_schema() {
        let db = new_db();
        let user = new_user(&db, "ana@ejemplo.com");
        let row = CheckInRow {
            id: Uuid::new_v4().to_string(),
            user_id: user,
            mood: Mood::Sad,
            stress_level: 11,
            energy_level: 5,
            note: None,
            created_at: Utc::now(),
        };
        assert!(db.insert_check_in(&row).is_err());
    }

    #[test]
    fn update_and_delete_are_owner_scoped() {
        let db = new_db();
        let owner = new_user(&db, "ana@ejemplo.com");
        let intruder = new_user(&db, "eva@ejemplo.com");
        let id = add_check_in(&db, &owner, 4, Utc::now());

        let changes = CheckInChanges { stress_level: Some(1), ..Default::default() };
        assert!(db.update_check_in(&id, &intruder, &changes).unwrap().is_none());
        assert!(!db.delete_check_in(&id, &intruder).unwrap());

        let updated = db.update_check_in(&id, &owner, &changes).unwrap().unwrap();
        assert_eq!(updated.stress_level, 1);
        assert_eq!(updated.energy_level, 5);
        assert!(db.delete_check_in(&id, &owner).unwrap());
    }
}
