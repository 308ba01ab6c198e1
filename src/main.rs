#![cfg_attr(all(not(debug_assertions), target_os = "windows"), windows_subsystem = "windows")]

mod commands;
mod db;
mod error;
mod events;
mod image_api;
mod session;

use std::sync::Arc;

use rusqlite::Connection;
use tauri::{Manager, PhysicalPosition, PhysicalSize, WindowEvent};
use tokio::sync::Mutex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::events::{EventSink, TauriEventSink};
use crate::image_api::{ImageService, PlaceholderClient};
use crate::session::GeneratorState;

// Save window state
fn save_window_state(window: &tauri::Window, conn: &Connection) -> rusqlite::Result<()> {
    if let Ok(position) = window.outer_position() {
        db::update_config_value(conn, "window_x", &position.x.to_string())?;
        db::update_config_value(conn, "window_y", &position.y.to_string())?;
    }

    if let Ok(size) = window.outer_size() {
        db::update_config_value(conn, "window_width", &size.width.to_string())?;
        db::update_config_value(conn, "window_height", &size.height.to_string())?;
    }

    Ok(())
}

// Load window state
fn load_window_state(window: &tauri::Window, conn: &Connection) -> rusqlite::Result<()> {
    let x = db::get_config_value(conn, "window_x")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let y = db::get_config_value(conn, "window_y")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let width = db::get_config_value(conn, "window_width")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(960);
    let height = db::get_config_value(conn, "window_height")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(760);

    if window
        .set_position(tauri::Position::Physical(PhysicalPosition::new(x, y)))
        .is_err()
    {
        warn!("failed to restore window position");
    }
    if window.set_size(PhysicalSize::new(width, height)).is_err() {
        warn!("failed to restore window size");
    }

    Ok(())
}

// application entry point
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_conn = db::init_db();
    let generator_state = Arc::new(Mutex::new(GeneratorState::default()));
    let image_service: Arc<dyn ImageService> = Arc::new(PlaceholderClient);

    tauri::Builder::default()
        .manage(db_conn.clone())
        .manage(generator_state)
        .manage(image_service)
        .setup(move |app| {
            let events: Arc<dyn EventSink> = Arc::new(TauriEventSink::new(app.handle()));
            app.manage(events);

            let window = app.get_window("main").unwrap();

            let window_for_load = window.clone();
            let db_for_load = db_conn.clone();
            tauri::async_runtime::block_on(async {
                if let Err(e) = load_window_state(&window_for_load, &*db_for_load.lock().await) {
                    warn!("failed to restore window state: {e}");
                }
            });

            let window_clone = window.clone();
            let db_clone = db_conn.clone();
            window.on_window_event(move |event| {
                if matches!(event, WindowEvent::Resized(_) | WindowEvent::Moved(_)) {
                    let window_inner = window_clone.clone();
                    let db_inner = db_clone.clone();
                    tauri::async_runtime::spawn(async move {
                        if let Err(e) = save_window_state(&window_inner, &*db_inner.lock().await) {
                            warn!("failed to save window state: {e}");
                        }
                    });
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::set_prompt,
            commands::generator_snapshot,
            commands::reset_generator,
            commands::get_api_key,
            commands::get_api_key_saved_at,
            commands::save_api_key,
            commands::clear_api_key,
            commands::get_theme,
            commands::save_theme
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
