// Toast and state events pushed from the core to the webview.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tauri::Manager;
use tracing::warn;

use crate::session::GeneratorSnapshot;

pub type ToastHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToastPayload {
    pub id: ToastHandle,
    pub kind: ToastKind,
    pub message: String,
}

/// Channel from the core to whatever renders user-visible feedback.
///
/// `dismiss_toast` must be idempotent: a handle may be dismissed late or
/// twice when a request is superseded right as it completes, and stale
/// handles are silently ignored.
pub trait EventSink: Send + Sync {
    fn show_toast(&self, kind: ToastKind, message: &str) -> ToastHandle;
    fn dismiss_toast(&self, handle: ToastHandle);
    fn state_changed(&self, snapshot: &GeneratorSnapshot);
}

/// Production sink: forwards everything as Tauri app events for the webview.
pub struct TauriEventSink {
    app: tauri::AppHandle,
    next_handle: AtomicU64,
}

impl TauriEventSink {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self {
            app,
            next_handle: AtomicU64::new(1),
        }
    }
}

impl EventSink for TauriEventSink {
    fn show_toast(&self, kind: ToastKind, message: &str) -> ToastHandle {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let payload = ToastPayload {
            id,
            kind,
            message: message.to_string(),
        };
        if let Err(e) = self.app.emit_all("toast://show", payload) {
            warn!("failed to emit toast event: {e}");
        }
        id
    }

    fn dismiss_toast(&self, handle: ToastHandle) {
        if let Err(e) = self
            .app
            .emit_all("toast://dismiss", serde_json::json!({ "id": handle }))
        {
            warn!("failed to emit toast dismissal: {e}");
        }
    }

    fn state_changed(&self, snapshot: &GeneratorSnapshot) {
        if let Err(e) = self.app.emit_all("generator://state", snapshot) {
            warn!("failed to emit generator state: {e}");
        }
    }
}
