// Handles Tauri command definitions

use std::sync::Arc;

use rusqlite::Connection;
use tauri::{command, State};
use tokio::sync::Mutex;

use crate::db;
use crate::events::{EventSink, ToastKind};
use crate::image_api::{self, ImageService};
use crate::session::{GeneratorSnapshot, GeneratorState};

#[command]
pub async fn set_prompt(
    prompt: String,
    state: State<'_, Arc<Mutex<GeneratorState>>>,
    db_conn: State<'_, Arc<Mutex<Connection>>>,
    events: State<'_, Arc<dyn EventSink>>,
    service: State<'_, Arc<dyn ImageService>>,
) -> Result<(), String> {
    image_api::schedule_generation(
        state.inner(),
        db_conn.inner(),
        events.inner(),
        service.inner(),
        prompt,
    )
    .await;
    Ok(())
}

// Snapshot for the generator screen at mount
#[command]
pub async fn generator_snapshot(
    state: State<'_, Arc<Mutex<GeneratorState>>>,
) -> Result<GeneratorSnapshot, String> {
    let gen = state.lock().await;
    Ok(gen.snapshot())
}

#[command]
pub async fn reset_generator(
    state: State<'_, Arc<Mutex<GeneratorState>>>,
    events: State<'_, Arc<dyn EventSink>>,
) -> Result<(), String> {
    image_api::reset(state.inner(), events.inner()).await;
    Ok(())
}

#[command]
pub async fn get_api_key(
    db_conn: State<'_, Arc<Mutex<Connection>>>,
) -> Result<Option<String>, String> {
    let conn = db_conn.lock().await;
    db::get_config_value(&conn, db::API_KEY).map_err(|e| e.to_string())
}

#[command]
pub async fn get_api_key_saved_at(
    db_conn: State<'_, Arc<Mutex<Connection>>>,
) -> Result<Option<String>, String> {
    let conn = db_conn.lock().await;
    db::get_config_value(&conn, db::API_KEY_SAVED_AT).map_err(|e| e.to_string())
}

#[command]
pub async fn save_api_key(
    value: String,
    db_conn: State<'_, Arc<Mutex<Connection>>>,
    events: State<'_, Arc<dyn EventSink>>,
) -> Result<(), String> {
    let conn = db_conn.lock().await;
    store_api_key(&conn, &value).map_err(|e| e.to_string())?;

    let message = if value.trim().is_empty() {
        "API key cleared."
    } else {
        "API key saved."
    };
    events.show_toast(ToastKind::Success, message);
    Ok(())
}

#[command]
pub async fn clear_api_key(
    db_conn: State<'_, Arc<Mutex<Connection>>>,
    events: State<'_, Arc<dyn EventSink>>,
) -> Result<(), String> {
    let conn = db_conn.lock().await;
    store_api_key(&conn, "").map_err(|e| e.to_string())?;
    events.show_toast(ToastKind::Success, "API key cleared.");
    Ok(())
}

// Get saved theme, defaulting to light
#[command]
pub async fn get_theme(db_conn: State<'_, Arc<Mutex<Connection>>>) -> Result<String, String> {
    let conn = db_conn.lock().await;
    db::get_config_value(&conn, db::THEME)
        .map(|theme| theme.unwrap_or_else(|| "light".to_string()))
        .map_err(|e| e.to_string())
}

// Save theme
#[command]
pub async fn save_theme(
    theme: String,
    db_conn: State<'_, Arc<Mutex<Connection>>>,
) -> Result<(), String> {
    let conn = db_conn.lock().await;
    db::update_config_value(&conn, db::THEME, &theme).map_err(|e| e.to_string())
}

/// Stores a trimmed API key. A blank value removes the stored key and its
/// saved-at timestamp instead, so saving an empty field equals clearing.
fn store_api_key(conn: &Connection, value: &str) -> rusqlite::Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        db::remove_config_value(conn, db::API_KEY)?;
        db::remove_config_value(conn, db::API_KEY_SAVED_AT)?;
    } else {
        db::update_config_value(conn, db::API_KEY, trimmed)?;
        db::update_config_value(conn, db::API_KEY_SAVED_AT, &chrono::Utc::now().to_rfc3339())?;
    }
    Ok(())
}
