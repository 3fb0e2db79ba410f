use crate::advice::models::Source;
use crate::db::models::{Session, Turn};
use crate::profile::Profile;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Result as DbResult, Row};
use uuid::Uuid;

/// Fixed key the dog profile is stored under in the kv table.
const PROFILE_KEY: &str = "profile";

pub struct DbService;

impl DbService {
    fn row_to_session(row: &Row) -> DbResult<Session> {
        let meta_str: String = row.get(4)?;
        let metadata = serde_json::from_str(&meta_str).unwrap_or(serde_json::json!({}));

        // Timestamps are selected as CAST(... AS VARCHAR) so we parse text
        // instead of fighting the driver's timestamp representation.
        let created_str: String = row.get(2)?;
        let updated_str: String = row.get(3)?;

        let created_at = created_str.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now());
        let updated_at = updated_str.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now());

        Ok(Session {
            id: row.get::<_, String>(0)?.parse().unwrap_or_default(),
            name: row.get::<_, String>(1)?,
            created_at,
            updated_at,
            metadata,
        })
    }

    fn row_to_turn(row: &Row) -> DbResult<Turn> {
        let sources_str: String = row.get(4)?;
        let sources: Vec<Source> = serde_json::from_str(&sources_str).unwrap_or_default();

        let created_str: String = row.get(5)?;
        let created_at = created_str.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now());

        Ok(Turn {
            id: row.get(0)?,
            session_id: row.get::<_, String>(1)?.parse().unwrap_or_default(),
            role: row.get::<_, String>(2)?,
            content: row.get::<_, String>(3)?,
            sources,
            created_at,
        })
    }

    // --- Session Operations ---

    pub fn insert_session(conn: &Connection, name: &str, metadata: serde_json::Value) -> DbResult<Session> {
        let id = Uuid::new_v4();
        let meta_str = metadata.to_string();

        conn.execute(
            "INSERT INTO sessions (id, name, metadata) VALUES (?, ?, ?)",
            params![id.to_string(), name, meta_str],
        )?;

        Self::get_session(conn, id).map(|s| s.unwrap())
    }

    pub fn get_session(conn: &Connection, id: Uuid) -> DbResult<Option<Session>> {
        let mut stmt = conn.prepare("SELECT id, name, CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR), metadata FROM sessions WHERE id = ?")?;
        let mut rows = stmt.query_map(params![id.to_string()], Self::row_to_session)?;

        if let Some(row) = rows.next() {
            Ok(Some(row?))
        } else {
            Ok(None)
        }
    }

    pub fn list_sessions(conn: &Connection, limit: usize, offset: usize) -> DbResult<Vec<Session>> {
        let mut stmt = conn.prepare("SELECT id, name, CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR), metadata FROM sessions ORDER BY updated_at DESC LIMIT ? OFFSET ?")?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], Self::row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    pub fn delete_session(conn: &Connection, id: Uuid) -> DbResult<()> {
        conn.execute("BEGIN TRANSACTION", [])?;

        let id_str = id.to_string();

        // 1. Delete turns first to satisfy foreign key constraint
        if let Err(e) = conn.execute("DELETE FROM turns WHERE session_id = ?", params![id_str]) {
            let _ = conn.execute("ROLLBACK", []);
            return Err(e);
        }

        // 2. Delete the session
        if let Err(e) = conn.execute("DELETE FROM sessions WHERE id = ?", params![id_str]) {
            let _ = conn.execute("ROLLBACK", []);
            return Err(e);
        }

        conn.execute("COMMIT", [])?;
        Ok(())
    }

    // --- Turn Operations ---

    pub fn insert_turn(
        conn: &Connection,
        session_id: Uuid,
        role: &str,
        content: &str,
        sources: &[Source],
    ) -> DbResult<Turn> {
        let sources_str = serde_json::to_string(sources).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT INTO turns (session_id, role, content, sources) VALUES (?, ?, ?, ?)",
            params![session_id.to_string(), role, content, sources_str],
        )?;

        // Update the session's updated_at timestamp
        conn.execute(
            "UPDATE sessions SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![session_id.to_string()],
        )?;

        // Fetch the turn we just inserted (since ID is generated by sequence)
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, sources, CAST(created_at AS VARCHAR)
             FROM turns
             WHERE session_id = ?
             ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![session_id.to_string()], Self::row_to_turn)?;

        Ok(rows.next().unwrap()?)
    }

    pub fn get_turns(conn: &Connection, session_id: Uuid, limit: usize, offset: usize) -> DbResult<Vec<Turn>> {
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, sources, CAST(created_at AS VARCHAR)
             FROM turns
             WHERE session_id = ?
             ORDER BY created_at ASC, id ASC
             LIMIT ? OFFSET ?",
        )?;

        let rows = stmt.query_map(params![session_id.to_string(), limit as i64, offset as i64], Self::row_to_turn)?;

        let mut turns = Vec::new();
        for row in rows {
            turns.push(row?);
        }
        Ok(turns)
    }

    // --- Profile Operations ---

    /// A missing or malformed stored profile falls back to the empty default
    /// rather than surfacing an error; there is no schema migration logic.
    pub fn load_profile(conn: &Connection) -> DbResult<Profile> {
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
        let mut rows = stmt.query_map(params![PROFILE_KEY], |row| row.get::<_, String>(0))?;

        match rows.next() {
            Some(raw) => Ok(serde_json::from_str(&raw?).unwrap_or_default()),
            None => Ok(Profile::default()),
        }
    }

    pub fn save_profile(conn: &Connection, profile: &Profile) -> DbResult<()> {
        let value = serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string());
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![PROFILE_KEY, value],
        )?;
        Ok(())
    }
}
