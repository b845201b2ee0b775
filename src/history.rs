use chrono::{DateTime, Local, SecondsFormat, Utc};
use rand::Rng;
use rusqlite::{params, Connection, Result, Row};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::config::BreathConfig;
use crate::session::SessionController;

/// Highest tension rating the summary screen accepts.
pub const MAX_TENSION: u8 = 10;

/// How the session felt, rated on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Comfort {
    Easy,
    Medium,
    Hard,
}

impl Comfort {
    /// Maps the `1`/`2`/`3` summary keys.
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Comfort::Easy),
            '2' => Some(Comfort::Medium),
            '3' => Some(Comfort::Hard),
            _ => None,
        }
    }

    /// Inverse of the lowercase `Display` form stored in the database.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "easy" => Some(Comfort::Easy),
            "medium" => Some(Comfort::Medium),
            "hard" => Some(Comfort::Hard),
            _ => None,
        }
    }
}

/// One finished timed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub date: DateTime<Local>,
    pub config: BreathConfig,
    pub total_secs: u32,
    pub cycles: u64,
    pub tension: Option<u8>,
    pub comfort: Option<Comfort>,
}

impl SessionRecord {
    /// Snapshot a controller that has just reached the summary.
    pub fn from_controller(controller: &SessionController) -> Self {
        let date = Local::now();
        let suffix: u32 = rand::thread_rng().gen();
        Self {
            id: format!("{}-{:08x}", date.timestamp_millis(), suffix),
            date,
            config: *controller.config(),
            total_secs: controller.elapsed_secs().round() as u32,
            cycles: controller.phase().cycle_index,
            tension: None,
            comfort: None,
        }
    }

    /// Nudge the tension rating; the first nudge starts from the middle.
    pub fn adjust_tension(&mut self, delta: i8) {
        let current = self.tension.unwrap_or(MAX_TENSION / 2) as i16;
        let next = (current + delta as i16).clamp(0, MAX_TENSION as i16);
        self.tension = Some(next as u8);
    }
}

/// SQLite-backed session history.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the history under the default state directory, creating it if needed.
    pub fn new() -> Result<Self> {
        let path = AppDirs::history_db_path().unwrap_or_else(|| PathBuf::from("breathr_history.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                config TEXT NOT NULL,
                total_secs INTEGER NOT NULL,
                cycles INTEGER NOT NULL,
                tension INTEGER,
                comfort TEXT
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date)",
            [],
        )?;
        Ok(HistoryDb { conn })
    }

    /// Insert or replace a record.
    pub fn record(&self, record: &SessionRecord) -> Result<()> {
        let config = serde_json::to_string(&record.config)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO sessions
            (id, date, config, total_secs, cycles, tension, comfort)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                stored_date(&record.date),
                config,
                record.total_secs,
                record.cycles as i64,
                record.tension,
                record.comfort.map(|c| c.to_string()),
            ],
        )?;
        Ok(())
    }

    /// Most recent records first. Rows that no longer parse are skipped and
    /// do not count towards `limit`.
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, date, config, total_secs, cycles, tension, comfort
            FROM sessions
            ORDER BY date DESC
            "#,
        )?;
        let rows = stmt.query_map([], record_from_row)?;

        let mut records = Vec::new();
        for record in rows {
            if records.len() >= limit {
                break;
            }
            match record {
                Ok(record) => records.push(record),
                Err(err) => warn!(%err, "skipping unreadable history row"),
            }
        }
        Ok(records)
    }

    pub fn latest(&self) -> Result<Option<SessionRecord>> {
        Ok(self.recent(1)?.into_iter().next())
    }

    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
    }

    /// Clear all history (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM sessions", [])?;
        Ok(())
    }
}

// UTC with fixed precision, so text order in SQLite is time order.
fn stored_date(date: &DateTime<Local>) -> String {
    date.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn record_from_row(row: &Row<'_>) -> Result<SessionRecord> {
    let date_str: String = row.get(1)?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?
        .with_timezone(&Local);

    let config_str: String = row.get(2)?;
    let config: BreathConfig = serde_json::from_str(&config_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?;

    let comfort: Option<String> = row.get(6)?;
    let cycles: i64 = row.get(4)?;

    Ok(SessionRecord {
        id: row.get(0)?,
        date,
        config,
        total_secs: row.get(3)?,
        cycles: cycles.max(0) as u64,
        tension: row.get(5)?,
        comfort: comfort.as_deref().and_then(Comfort::from_label),
    })
}
