//! Clipboard Helper
//!
//! Copies the install command and reports the outcome in the status bar.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::content::Message;
use super::render::{RenderService, SlotId};
use super::surface::SharedSurface;
use crate::errors::ClipboardError;

pub const COPIED: &str = "copied.";
pub const UNAVAILABLE: &str = "clipboard unavailable.";

/// Where copied text goes.
pub trait ClipboardBackend: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The host clipboard. A fresh handle is opened per copy, so a display that
/// comes and goes between copies is picked up.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::SetFailed(e.to_string()))
    }
}

pub struct ClipboardHelper {
    backend: Box<dyn ClipboardBackend>,
    render: RenderService,
    status: SharedSurface,
    install_command: String,
    clear_after: Duration,
}

impl ClipboardHelper {
    pub fn new(
        backend: Box<dyn ClipboardBackend>,
        render: RenderService,
        status: SharedSurface,
        install_command: impl Into<String>,
        clear_after: Duration,
    ) -> Self {
        Self {
            backend,
            render,
            status,
            install_command: install_command.into(),
            clear_after,
        }
    }

    /// Copy the install command, reveal the outcome in the status bar and
    /// clear it once `clear_after` has passed.
    ///
    /// The returned handle resolves after the status bar was cleared.
    pub fn copy_install_command(&self) -> (Result<(), ClipboardError>, JoinHandle<()>) {
        let result = self.backend.set_text(&self.install_command);
        let notice = match &result {
            Ok(()) => {
                info!("install command copied to clipboard");
                COPIED
            }
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                UNAVAILABLE
            }
        };

        self.render.start_render(
            &Message::new().text(notice),
            self.status.clone(),
            true,
            SlotId::STATUS,
        );

        // The clear bypasses the render manager; a reveal still typing at
        // this point keeps going into the emptied bar.
        let status = self.status.clone();
        let clear_after = self.clear_after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(clear_after).await;
            status.lock().clear();
        });

        (result, handle)
    }
}
