use chrono::Utc;
use rusqlite::{params, Connection, Result};
use std::path::Path;

use crate::models::EvaluationSession;
use serde::{Deserialize, Serialize};

// Bump when the persisted session layout changes. Records with any other
// version load as "no saved session" instead of erroring.
const SNAPSHOT_VERSION: u32 = 1;
const CURRENT_KEY: &str = "current";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSnapshot {
    version: u32,
    session: EvaluationSession,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Active session, one full-state record under one key.
            -- Last write wins; there is no partial update.
            CREATE TABLE IF NOT EXISTS session_store (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- Finalized assessments
            CREATE TABLE IF NOT EXISTS assessment_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                tool_name TEXT NOT NULL,
                tool_category TEXT NOT NULL,
                use_case TEXT NOT NULL,
                overall_score INTEGER,
                completed_at TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_completed
                ON assessment_history(completed_at);
            CREATE INDEX IF NOT EXISTS idx_history_category
                ON assessment_history(tool_category);
            "#,
        )?;
        Ok(())
    }

    // Session store operations
    pub fn save_session(&self, session: &EvaluationSession) -> Result<()> {
        let snapshot = SessionSnapshot {
            version: SNAPSHOT_VERSION,
            session: session.clone(),
        };
        let data = serde_json::to_string(&snapshot)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        self.conn.execute(
            r#"
            INSERT INTO session_store (key, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET data = ?2, updated_at = ?3
            "#,
            params![CURRENT_KEY, data, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<EvaluationSession>> {
        let data: Result<String> = self.conn.query_row(
            "SELECT data FROM session_store WHERE key = ?1",
            params![CURRENT_KEY],
            |row| row.get(0),
        );

        let data = match data {
            Ok(d) => d,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        // Unreadable or version-mismatched records degrade to a fresh start
        match serde_json::from_str::<SessionSnapshot>(&data) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Ok(Some(snapshot.session)),
            _ => Ok(None),
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM session_store WHERE key = ?1",
            params![CURRENT_KEY],
        )?;
        Ok(())
    }

    // History operations
    pub fn record_assessment(&self, session: &EvaluationSession) -> Result<i64> {
        let data = serde_json::to_string(session)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let overall = session.final_score.as_ref().map(|s| s.overall as i64);
        let completed_at = session
            .ended_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        self.conn.execute(
            r#"
            INSERT INTO assessment_history
                (session_id, tool_name, tool_category, use_case, overall_score, completed_at, data)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                session.id,
                session.tool_config.name,
                session.tool_config.category,
                session.tool_config.use_case,
                overall,
                completed_at,
                data
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_assessments(&self) -> Result<Vec<AssessmentSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, session_id, tool_name, tool_category, use_case, overall_score, completed_at
            FROM assessment_history
            ORDER BY completed_at DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(AssessmentSummary {
                id: row.get(0)?,
                session_id: row.get(1)?,
                tool_name: row.get(2)?,
                tool_category: row.get(3)?,
                use_case: row.get(4)?,
                overall_score: row.get(5)?,
                completed_at: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>>>()
    }

    pub fn get_assessment(&self, id: i64) -> Result<Option<EvaluationSession>> {
        let data: Result<String> = self.conn.query_row(
            "SELECT data FROM assessment_history WHERE id = ?1",
            params![id],
            |row| row.get(0),
        );

        match data {
            Ok(d) => Ok(serde_json::from_str(&d).ok()),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let total_assessments: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assessment_history",
            [],
            |row| row.get(0),
        )?;

        let avg_score: f64 = self
            .conn
            .query_row(
                "SELECT COALESCE(AVG(overall_score), 0) FROM assessment_history",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0.0);

        let last_completed: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(completed_at) FROM assessment_history",
                [],
                |row| row.get(0),
            )
            .unwrap_or(None);

        Ok(Stats {
            total_assessments,
            avg_score,
            last_completed,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: i64,
    pub session_id: String,
    pub tool_name: String,
    pub tool_category: String,
    pub use_case: String,
    pub overall_score: Option<i64>,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_assessments: i64,
    pub avg_score: f64,
    pub last_completed: Option<String>,
}
