// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Database module for persistent storage

mod memory;

pub use memory::MemoryRepository;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, debug};

use crate::core::{AlarmStatus, ArmingStatus};
use crate::sensors::{Sensor, SensorId, SensorType};

const ALARM_STATUS_KEY: &str = "alarm_status";
const ARMING_STATUS_KEY: &str = "arming_status";

/// Storage failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// SQLite failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored status could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure, e.g. creating the database directory
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row holds a value that does not parse
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Backing store for the security engine's state.
///
/// Writes are fire-and-forget from the engine's point of view: it logs a
/// failed write and carries on with its in-memory state.
pub trait SecurityRepository: Send + Sync {
    /// Every stored sensor, in no particular order
    fn sensors(&self) -> Result<Vec<Sensor>, RepositoryError>;
    /// Last stored alarm status, `None` if never written
    fn alarm_status(&self) -> Result<Option<AlarmStatus>, RepositoryError>;
    /// Last stored arming mode, `None` if never written
    fn arming_status(&self) -> Result<Option<ArmingStatus>, RepositoryError>;
    /// Overwrite the stored alarm status
    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), RepositoryError>;
    /// Overwrite the stored arming mode
    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), RepositoryError>;
    /// Store a new sensor
    fn add_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError>;
    /// Delete a sensor by id; unknown ids are not an error
    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError>;
    /// Replace the stored copy of a sensor
    fn update_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError>;
}

/// SQLite-backed repository
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        "#)?;

        let db = Self::from_connection(conn)?;
        info!("Database opened at {:?}", path);
        Ok(db)
    }

    /// Open a throwaway database that lives only as long as this handle
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.create_tables()?;
        Ok(db)
    }

    /// Create database tables
    fn create_tables(&self) -> Result<(), RepositoryError> {
        let conn = self.conn.lock();

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS sensors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sensor_type TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
        "#)?;

        Ok(())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        debug!("Stored setting {} = {}", key, value);
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let conn = self.conn.lock();

        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn upsert_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR REPLACE INTO sensors (id, name, sensor_type, active) VALUES (?1, ?2, ?3, ?4)",
            params![
                sensor.id().to_string(),
                sensor.name(),
                sensor.sensor_type().to_string(),
                sensor.is_active()
            ],
        )?;

        Ok(())
    }
}

impl SecurityRepository for Database {
    fn sensors(&self) -> Result<Vec<Sensor>, RepositoryError> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare("SELECT id, name, sensor_type, active FROM sensors ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;

        let mut sensors = Vec::new();
        for row in rows {
            let (id, name, sensor_type, active) = row?;
            let id = id
                .parse::<SensorId>()
                .map_err(|e| RepositoryError::Corrupt(format!("sensor id '{}': {}", id, e)))?;
            let sensor_type = sensor_type.parse::<SensorType>().map_err(RepositoryError::Corrupt)?;
            sensors.push(Sensor::with_id(id, name, sensor_type, active));
        }

        Ok(sensors)
    }

    fn alarm_status(&self) -> Result<Option<AlarmStatus>, RepositoryError> {
        match self.get_setting(ALARM_STATUS_KEY)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    fn arming_status(&self) -> Result<Option<ArmingStatus>, RepositoryError> {
        match self.get_setting(ARMING_STATUS_KEY)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), RepositoryError> {
        self.set_setting(ALARM_STATUS_KEY, &serde_json::to_string(&status)?)
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), RepositoryError> {
        self.set_setting(ARMING_STATUS_KEY, &serde_json::to_string(&status)?)
    }

    fn add_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        self.upsert_sensor(sensor)
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM sensors WHERE id = ?1", params![sensor.id().to_string()])?;
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<(), RepositoryError> {
        self.upsert_sensor(sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_database_has_no_status() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.sensors().unwrap().is_empty());
        assert_eq!(db.alarm_status().unwrap(), None);
        assert_eq!(db.arming_status().unwrap(), None);
    }

    #[test]
    fn test_status_overwrite() {
        let db = Database::open_in_memory().unwrap();
        db.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();
        db.set_alarm_status(AlarmStatus::Alarm).unwrap();
        db.set_arming_status(ArmingStatus::ArmedAway).unwrap();

        assert_eq!(db.alarm_status().unwrap(), Some(AlarmStatus::Alarm));
        assert_eq!(db.arming_status().unwrap(), Some(ArmingStatus::ArmedAway));
    }

    #[test]
    fn test_sensor_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let mut door = Sensor::new("Front door", SensorType::Door);
        let window = Sensor::new("Bedroom window", SensorType::Window);

        db.add_sensor(&door).unwrap();
        db.add_sensor(&window).unwrap();

        door.set_active(true);
        db.update_sensor(&door).unwrap();

        let stored = db.sensors().unwrap();
        assert_eq!(stored.len(), 2);
        let stored_door = stored.iter().find(|s| s.id() == door.id()).unwrap();
        assert!(stored_door.is_active());
        assert_eq!(stored_door.sensor_type(), SensorType::Door);

        db.remove_sensor(&window).unwrap();
        let stored = db.sensors().unwrap();
        assert_eq!(stored, vec![door]);
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catguard.db");
        let motion = Sensor::new("Hallway", SensorType::Motion);

        {
            let db = Database::open(&path).unwrap();
            db.add_sensor(&motion).unwrap();
            db.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.sensors().unwrap(), vec![motion]);
        assert_eq!(db.arming_status().unwrap(), Some(ArmingStatus::ArmedHome));
        assert_eq!(db.alarm_status().unwrap(), None);
    }

    #[test]
    fn test_corrupt_sensor_type_reported() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .lock()
            .execute(
                "INSERT INTO sensors (id, name, sensor_type, active) VALUES (?1, 'x', 'GARAGE', 0)",
                params![SensorId::new().to_string()],
            )
            .unwrap();

        assert!(matches!(db.sensors(), Err(RepositoryError::Corrupt(_))));
    }
}
