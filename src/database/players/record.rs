//! Typed view of a player row

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::database::core::Row;

/// One player, as stored in the fixed columns of the `players` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub discord_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_data: Option<String>,
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

impl PlayerRecord {
    /// Build a record from a row selected in `PLAYER_COLUMNS` order
    ///
    /// Returns `None` when the key column is missing or NULL.
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(PlayerRecord {
            discord_id: text(row.first())?,
            server_id: text(row.get(1)),
            discord_name: text(row.get(2)),
            ign: text(row.get(3)),
            local_data: text(row.get(4)),
            global_data: text(row.get(5)),
        })
    }

    /// Short description used in chat replies
    pub fn summary(&self) -> String {
        let name = self.discord_name.as_deref().unwrap_or(&self.discord_id);
        let mut parts = vec![format!(
            "{}: ign {}",
            name,
            self.ign.as_deref().unwrap_or("not set")
        )];
        if let Some(server) = &self.server_id {
            parts.push(format!("home server {}", server));
        }
        parts.join(", ")
    }
}
