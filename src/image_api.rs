// Simulated Leonardo.ai image generation and the debounced request lifecycle

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::db;
use crate::error::GenerateError;
use crate::events::{EventSink, ToastKind};
use crate::session::GeneratorState;

/// How long the prompt must sit unchanged before a request is issued.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);
/// Latency of the simulated generation call.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(1500);
/// Longest prompt prefix embedded in the placeholder URL.
const URL_TEXT_MAX_CHARS: usize = 64;

pub const MSG_GENERATING: &str = "Generating image...";
pub const MSG_SUCCESS: &str = "Image generated successfully!";
pub const MSG_FAILED: &str = "Failed to generate image. Please try again.";
pub const MSG_NO_API_KEY: &str =
    "Add your Leonardo.ai API key in Settings before generating images.";

/// Produces an image URL for a prompt.
///
/// The production implementation stands in for a real generation backend
/// with a fixed delay; tests substitute recording or failing doubles.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Fake Leonardo.ai client: waits out the simulated latency and returns a
/// placeholder URL derived from the prompt.
pub struct PlaceholderClient;

#[async_trait]
impl ImageService for PlaceholderClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        tokio::time::sleep(SIMULATED_LATENCY).await;
        Ok(placeholder_image_url(prompt))
    }
}

/// Derives the deterministic placeholder URL shown for a prompt.
pub fn placeholder_image_url(prompt: &str) -> String {
    let text: String = prompt.trim().chars().take(URL_TEXT_MAX_CHARS).collect();
    format!(
        "https://via.placeholder.com/512x512?text={}",
        urlencoding::encode(&text)
    )
}

/// Re-evaluates the request lifecycle after a prompt edit.
///
/// Any previously scheduled request is superseded first: its token is
/// cancelled, its loading toast dismissed and the epoch bumped so a task
/// that already passed its cancellation points cannot apply a stale result.
/// A new request is scheduled only for a non-blank prompt with an API key
/// on file.
pub async fn schedule_generation(
    state: &Arc<Mutex<GeneratorState>>,
    db_conn: &Arc<Mutex<Connection>>,
    events: &Arc<dyn EventSink>,
    service: &Arc<dyn ImageService>,
    prompt: String,
) {
    let mut gen = state.lock().await;
    gen.prompt = prompt;
    if let Some(stale) = gen.supersede() {
        events.dismiss_toast(stale);
    }

    if gen.prompt.trim().is_empty() {
        // The last image stays on screen; only pending work is dropped.
        gen.is_loading = false;
        events.state_changed(&gen.snapshot());
        return;
    }

    let has_key = {
        let conn = db_conn.lock().await;
        matches!(db::get_config_value(&conn, db::API_KEY), Ok(Some(_)))
    };
    if !has_key {
        gen.is_loading = false;
        events.show_toast(ToastKind::Error, MSG_NO_API_KEY);
        events.state_changed(&gen.snapshot());
        return;
    }

    gen.is_loading = true;
    gen.image_url = None;
    gen.loading_toast = Some(events.show_toast(ToastKind::Loading, MSG_GENERATING));
    let token = CancellationToken::new();
    gen.cancellation_token = Some(token.clone());
    let epoch = gen.epoch;
    let request_prompt = gen.prompt.trim().to_string();
    events.state_changed(&gen.snapshot());
    drop(gen);

    debug!(epoch, "scheduled generation request");

    let state = state.clone();
    let events = events.clone();
    let service = service.clone();
    tokio::spawn(async move {
        run_request(state, events, service, request_prompt, epoch, token).await;
    });
}

/// Drops any pending request and clears the loading flag. Invoked when the
/// generator screen goes away so nothing fires while it is not visible.
pub async fn reset(state: &Arc<Mutex<GeneratorState>>, events: &Arc<dyn EventSink>) {
    let mut gen = state.lock().await;
    if let Some(stale) = gen.supersede() {
        events.dismiss_toast(stale);
    }
    gen.is_loading = false;
    events.state_changed(&gen.snapshot());
}

async fn run_request(
    state: Arc<Mutex<GeneratorState>>,
    events: Arc<dyn EventSink>,
    service: Arc<dyn ImageService>,
    prompt: String,
    epoch: u64,
    token: CancellationToken,
) {
    tokio::select! {
        _ = tokio::time::sleep(DEBOUNCE_INTERVAL) => {}
        _ = token.cancelled() => {
            debug!(epoch, "request cancelled during debounce");
            return;
        }
    }

    if state.lock().await.epoch != epoch {
        return;
    }

    let result = tokio::select! {
        result = service.generate(&prompt) => result,
        _ = token.cancelled() => Err(GenerateError::Cancelled),
    };

    let mut gen = state.lock().await;
    if gen.epoch != epoch {
        debug!(epoch, "dropping result of superseded request");
        return;
    }

    if let Some(toast) = gen.loading_toast.take() {
        events.dismiss_toast(toast);
    }
    gen.is_loading = false;
    gen.cancellation_token = None;

    match result {
        Ok(url) => {
            gen.image_url = Some(url);
            events.show_toast(ToastKind::Success, MSG_SUCCESS);
        }
        Err(GenerateError::Cancelled) => {}
        Err(err) => {
            warn!(error = %err, "image generation failed");
            events.show_toast(ToastKind::Error, MSG_FAILED);
        }
    }
    events.state_changed(&gen.snapshot());
}
