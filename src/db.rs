// Handles SQLite-backed application config storage

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension};
use tauri::api::path::app_data_dir;
use tokio::sync::Mutex;
use tracing::info;

/// Config key holding the Leonardo.ai API key.
pub const API_KEY: &str = "leonardo_api_key";
/// Config key holding the RFC 3339 timestamp of the last API key save.
pub const API_KEY_SAVED_AT: &str = "leonardo_api_key_saved_at";
/// Config key holding the UI theme ("light" or "dark").
pub const THEME: &str = "theme";

// Initialize SQLite database in the platform app-data directory
pub fn init_db() -> Arc<Mutex<Connection>> {
    let base_dir = app_data_dir(&tauri::Config::default())
        .expect("Failed to retrieve application data directory")
        .join("imagestudio");

    let db_path: PathBuf = base_dir.join("imagestudio.db");

    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).expect("Failed to create database directory");
        }
    }

    let conn = open_at(&db_path).expect("Failed to open SQLite database");
    info!("config database ready at {}", db_path.display());

    Arc::new(Mutex::new(conn))
}

fn open_at(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_config (
            key TEXT PRIMARY KEY,
            value TEXT
        )",
        [],
    )?;
    Ok(())
}

/// Inserts or updates a configuration key-value pair.
pub fn update_config_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// Retrieves a configuration value by key. Returns `None` if the key doesn't exist.
pub fn get_config_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM app_config WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
}

/// Deletes a configuration key. Deleting a missing key is not an error.
pub fn remove_config_value(conn: &Connection, key: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM app_config WHERE key = ?1", [key])?;
    Ok(())
}

#[cfg(test)]
pub fn open_in_memory() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().expect("in-memory database");
    init_schema(&conn).expect("config schema");
    Arc::new(Mutex::new(conn))
}
