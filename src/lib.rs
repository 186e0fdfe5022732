//! nodem-site - the nodem landing page toolkit
//!
//! Builds and previews the marketing page of `nodem`, the Node.js version
//! manager.
//!
//! - **Pipeline**: styles, fonts, images, templates and scripts, each a fixed
//!   task from `src/` into the site root
//! - **Dev server**: static files plus live reload over a websocket
//! - **Terminal effect**: typewriter panels, a command dispatcher, a status
//!   bar and the remote version label
//!
//! # Quick Start
//!
//! ```ignore
//! use nodem_site::{Config, PageController};
//!
//! let config = Config::load(None)?;
//! let controller = PageController::new(&config, surfaces, Box::new(SystemClipboard))?;
//! controller.init(panels);
//! controller.dispatch("about");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use tokio::sync::Notify;

// ─── Core modules ──────────────────────────────────────────────────
pub mod config;
pub mod errors;
pub mod observability;

// ─── Asset pipeline & dev server ──────────────────────────────────
pub mod pipeline;
pub mod server;

// ─── Terminal effect ──────────────────────────────────────────────
pub mod terminal;

// ─── CLI ──────────────────────────────────────────────────────────
pub mod cli;
pub(crate) mod output;

pub use config::Config;
pub use errors::{SiteError, VersionError};
pub use pipeline::{AssetTask, Task, TaskReport, TaskRunner};
pub use terminal::{Message, PageController, RenderService, SlotId};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// Ask every long-running component to wind down.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    SHUTDOWN_NOTIFY.notify_waiters();
}

pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Resolves once [`request_shutdown`] has been called.
pub async fn shutdown_requested() {
    let notified = SHUTDOWN_NOTIFY.notified();
    if is_shutdown_requested() {
        return;
    }
    notified.await;
}
