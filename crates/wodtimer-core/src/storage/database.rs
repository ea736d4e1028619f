//! SQLite-based persistence for completed workout results.
//!
//! The engine itself never touches storage; on completion it hands a
//! `TimerSessionResults` to the caller, and this module is the caller-side
//! collaborator that records it. Also provides:
//! - Aggregate statistics over completed workouts
//! - Key-value store for suspended session state

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timer::TimerSessionResults;

use super::data_dir;

/// One persisted workout-completion row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: i64,
    pub workout_id: String,
    pub timer_kind: String,
    pub completed_at: DateTime<Utc>,
    pub total_elapsed_ms: u64,
    pub total_rounds_completed: u32,
    pub exercises_completed: u32,
    pub blocks_completed: Option<u32>,
    pub notes: Option<String>,
}

/// Aggregate statistics over completed workouts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_workouts: u64,
    pub total_elapsed_ms: u64,
    pub total_rounds: u64,
    pub today_workouts: u64,
}

/// SQLite database at `~/.config/wodtimer/wodtimer.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating the file and schema if needed.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("wodtimer.db");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS results (
                id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id             TEXT NOT NULL,
                timer_kind             TEXT NOT NULL,
                completed_at           TEXT NOT NULL,
                total_elapsed_ms       INTEGER NOT NULL,
                total_rounds_completed INTEGER NOT NULL,
                exercises_completed    INTEGER NOT NULL,
                blocks_completed       INTEGER,
                notes                  TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_completed_at ON results(completed_at);
            CREATE INDEX IF NOT EXISTS idx_results_workout_id ON results(workout_id);",
        )?;
        Ok(())
    }

    /// Record a completed session's results.
    pub fn record_results(
        &self,
        workout_id: &str,
        timer_kind: &str,
        results: &TimerSessionResults,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO results (workout_id, timer_kind, completed_at, total_elapsed_ms,
                                  total_rounds_completed, exercises_completed,
                                  blocks_completed, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                workout_id,
                timer_kind,
                results.completed_at.to_rfc3339(),
                results.total_elapsed_ms,
                results.total_rounds_completed,
                results.exercises_completed,
                results.blocks_completed,
                results.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent results, newest first.
    pub fn recent_results(&self, limit: u32) -> Result<Vec<ResultRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workout_id, timer_kind, completed_at, total_elapsed_ms,
                    total_rounds_completed, exercises_completed, blocks_completed, notes
             FROM results ORDER BY completed_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(ResultRecord {
                id: row.get(0)?,
                workout_id: row.get(1)?,
                timer_kind: row.get(2)?,
                completed_at: row
                    .get::<_, String>(3)?
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
                total_elapsed_ms: row.get(4)?,
                total_rounds_completed: row.get(5)?,
                exercises_completed: row.get(6)?,
                blocks_completed: row.get(7)?,
                notes: row.get(8)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(crate::error::DatabaseError::from)?);
        }
        Ok(out)
    }

    pub fn stats_all(&self) -> Result<Stats> {
        let mut stats = Stats::default();
        let row = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(total_elapsed_ms), 0),
                    COALESCE(SUM(total_rounds_completed), 0)
             FROM results",
            [],
            |row| {
                Ok((
                    row.get::<_, u64>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, u64>(2)?,
                ))
            },
        )?;
        stats.total_workouts = row.0;
        stats.total_elapsed_ms = row.1;
        stats.total_rounds = row.2;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        stats.today_workouts = self.conn.query_row(
            "SELECT COUNT(*) FROM results WHERE completed_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> TimerSessionResults {
        TimerSessionResults {
            completed_at: Utc::now(),
            total_elapsed_ms: 600_000,
            total_rounds_completed: 10,
            exercises_completed: 10,
            blocks_completed: None,
            notes: Some("solid session".into()),
            beat_time_cap: None,
            failed_at_minute: None,
        }
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        db.record_results("w1", "emom", &sample_results()).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_workouts, 1);
        assert_eq!(stats.total_elapsed_ms, 600_000);
        assert_eq!(stats.total_rounds, 10);
        assert_eq!(stats.today_workouts, 1);

        let recent = db.recent_results(5).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].workout_id, "w1");
        assert_eq!(recent[0].timer_kind, "emom");
        assert_eq!(recent[0].notes.as_deref(), Some("solid session"));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("session").unwrap().is_none());
        db.kv_set("session", "{}").unwrap();
        assert_eq!(db.kv_get("session").unwrap().unwrap(), "{}");
        db.kv_delete("session").unwrap();
        assert!(db.kv_get("session").unwrap().is_none());
    }
}
