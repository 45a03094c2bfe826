//! Persistent preferences for passfill.
//!
//! A single SQLite file holds three tables:
//!
//! ```text
//! settings        key -> JSON value          (AutofillSettings fields)
//! app_overrides   package identity -> value  (exact key)
//! web_overrides   origin/title key -> value  (insertion order kept)
//! ```
//!
//! Override values are stored verbatim: `/first`, `/never`, or a
//! newline-separated list of store paths. Interpreting them is the
//! caller's job.

mod settings;

use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub use settings::{keys, AutofillSettings};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Read side of the preference tables, consulted on every match cycle.
pub trait PreferenceRepository: Send + Sync {
    /// Override recorded for an app package, if any.
    fn app_override(&self, identity: &str) -> Result<Option<String>>;

    /// All web override pairs `(key, value)`, oldest write first.
    fn web_overrides(&self) -> Result<Vec<(String, String)>>;

    fn settings(&self) -> Result<AutofillSettings>;
}

/// Default database location: `<data dir>/passfill/preferences.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("passfill").join("preferences.db"))
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        debug!(path = %path.display(), "opened preference database");
        Ok(db)
    }

    /// Open the database at [`default_database_path`], creating its folder.
    pub fn open_default() -> Result<Self> {
        let path = default_database_path()
            .ok_or_else(|| StorageError::NotFound("local data directory".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(&path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS app_overrides (
                identity TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS web_overrides (
                origin TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn set_app_override(&self, identity: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO app_overrides (identity, value) VALUES (?1, ?2)",
            (identity, value),
        )?;
        Ok(())
    }

    pub fn remove_app_override(&self, identity: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM app_overrides WHERE identity = ?1", [identity])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("app override {identity}")));
        }
        Ok(())
    }

    /// Record a web override. Rewriting an existing key moves it to the
    /// end of the iteration order.
    pub fn set_web_override(&self, origin: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO web_overrides (origin, value) VALUES (?1, ?2)",
            (origin, value),
        )?;
        Ok(())
    }

    pub fn remove_web_override(&self, origin: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM web_overrides WHERE origin = ?1", [origin])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("web override {origin}")));
        }
        Ok(())
    }

    pub fn save_settings(&self, settings: &AutofillSettings) -> Result<()> {
        let Value::Object(fields) = serde_json::to_value(settings)? else {
            return Ok(());
        };
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;
        for (key, value) in fields {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                (&key, value.to_string()),
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl PreferenceRepository for Database {
    fn app_override(&self, identity: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row(
                "SELECT value FROM app_overrides WHERE identity = ?1",
                [identity],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn web_overrides(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare("SELECT origin, value FROM web_overrides ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(pairs)
    }

    fn settings(&self) -> Result<AutofillSettings> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let defaults = serde_json::to_value(AutofillSettings::default())?;
        let mut fields = match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for row in rows {
            let (key, raw) = row?;
            if !keys::ALL.contains(&key.as_str()) {
                continue;
            }
            let value = match serde_json::from_str::<Value>(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring unreadable setting");
                    continue;
                }
            };

            // A badly shaped value only loses its own key.
            let mut trial = fields.clone();
            trial.insert(key.clone(), value);
            match serde_json::from_value::<AutofillSettings>(Value::Object(trial.clone())) {
                Ok(_) => fields = trial,
                Err(e) => warn!(key = %key, error = %e, "ignoring setting with the wrong shape"),
            }
        }

        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_raw(db: &Database, key: &str, raw: &str) {
        let conn = db.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, raw),
        )
        .unwrap();
    }

    #[test]
    fn test_bad_setting_only_loses_its_own_key() {
        let db = Database::open_in_memory().unwrap();
        db.save_settings(&AutofillSettings {
            default_always_match: false,
            scrub_clipboard_extra: true,
            username_ttl_seconds: 90,
        })
        .unwrap();
        write_raw(&db, keys::USERNAME_TTL_SECONDS, r#""soon""#);

        let settings = db.settings().unwrap();
        assert!(!settings.default_always_match);
        assert!(settings.scrub_clipboard_extra);
        assert_eq!(settings.username_ttl_seconds, 45);
    }

    #[test]
    fn test_unparseable_and_unknown_rows_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        write_raw(&db, keys::DEFAULT_ALWAYS_MATCH, "false");
        write_raw(&db, keys::SCRUB_CLIPBOARD_EXTRA, "{not json");
        write_raw(&db, "legacy_theme", r#""dark""#);

        let settings = db.settings().unwrap();
        assert!(!settings.default_always_match);
        assert!(!settings.scrub_clipboard_extra);
        assert_eq!(settings.username_ttl_seconds, 45);
    }
}
