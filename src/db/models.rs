use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advice::models::Source;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// One persisted message in a conversation. Assistant turns carry the
/// grounding sources attached to the answer; user turns have none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub sources: Vec<Source>,
    pub created_at: DateTime<Utc>,
}
