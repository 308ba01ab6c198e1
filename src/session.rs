// Tracks the prompt/generation lifecycle shared between commands and tasks.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::events::ToastHandle;

pub struct GeneratorState {
    pub prompt: String,
    pub is_loading: bool,
    pub image_url: Option<String>,
    /// Bumped on every supersession. A request task captures the value at
    /// schedule time and may only apply its result while it still matches.
    pub epoch: u64,
    pub cancellation_token: Option<CancellationToken>,
    pub loading_toast: Option<ToastHandle>,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            is_loading: false,
            image_url: None,
            epoch: 0,
            cancellation_token: None,
            loading_toast: None,
        }
    }
}

impl GeneratorState {
    /// Invalidates the current request: cancels its token, bumps the epoch
    /// and hands back the loading toast the caller must dismiss.
    pub fn supersede(&mut self) -> Option<ToastHandle> {
        if let Some(token) = self.cancellation_token.take() {
            token.cancel();
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.loading_toast.take()
    }

    pub fn snapshot(&self) -> GeneratorSnapshot {
        GeneratorSnapshot {
            prompt: self.prompt.clone(),
            is_loading: self.is_loading,
            image_url: self.image_url.clone(),
        }
    }
}

/// View of the generator state pushed to the webview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorSnapshot {
    pub prompt: String,
    pub is_loading: bool,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supersede_invalidates_current_request() {
        let mut state = GeneratorState::default();
        let token = CancellationToken::new();
        state.cancellation_token = Some(token.clone());
        state.loading_toast = Some(7);
        let before = state.epoch;

        let stale = state.supersede();

        assert!(token.is_cancelled());
        assert_eq!(stale, Some(7));
        assert_eq!(state.epoch, before + 1);
        assert!(state.cancellation_token.is_none());
        assert!(state.loading_toast.is_none());
    }

    #[test]
    fn supersede_without_pending_request_is_harmless() {
        let mut state = GeneratorState::default();
        assert_eq!(state.supersede(), None);
        assert_eq!(state.epoch, 1);
    }
}
