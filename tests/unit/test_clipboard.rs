//! Unit tests for the clipboard helper

use nodem_site::errors::ClipboardError;
use nodem_site::terminal::clipboard::{ClipboardBackend, ClipboardHelper, COPIED, UNAVAILABLE};
use nodem_site::terminal::render::RenderService;
use nodem_site::terminal::surface::HtmlSurface;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(20);
const CLEAR_AFTER: Duration = Duration::from_secs(2);
const INSTALL: &str = "wget -O - https://raw.githubusercontent.com/marcoT89/nodem/master/install.sh | bash";

#[derive(Clone, Default)]
struct Recording {
    copied: Arc<Mutex<Vec<String>>>,
}

impl ClipboardBackend for Recording {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.copied.lock().push(text.to_string());
        Ok(())
    }
}

struct Headless;

impl ClipboardBackend for Headless {
    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("no display server".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_copy_writes_install_command() {
    let backend = Recording::default();
    let (status, handle) = HtmlSurface::shared();
    let helper = ClipboardHelper::new(
        Box::new(backend.clone()),
        RenderService::new(TICK),
        handle,
        INSTALL,
        CLEAR_AFTER,
    );

    let (result, _cleared) = helper.copy_install_command();
    assert!(result.is_ok());
    assert_eq!(backend.copied.lock().as_slice(), &[INSTALL.to_string()]);

    tokio::time::sleep(TICK * 10).await;
    assert_eq!(status.lock().plain_text(), COPIED);
}

#[tokio::test(start_paused = true)]
async fn test_status_cleared_after_delay() {
    let (status, handle) = HtmlSurface::shared();
    let helper = ClipboardHelper::new(
        Box::new(Recording::default()),
        RenderService::new(TICK),
        handle,
        INSTALL,
        CLEAR_AFTER,
    );

    let (_result, cleared) = helper.copy_install_command();
    tokio::time::sleep(CLEAR_AFTER - Duration::from_millis(100)).await;
    assert_eq!(status.lock().plain_text(), COPIED);

    cleared.await.unwrap();
    assert!(status.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_headless_host_reports_unavailable() {
    let (status, handle) = HtmlSurface::shared();
    let helper = ClipboardHelper::new(
        Box::new(Headless),
        RenderService::new(TICK),
        handle,
        INSTALL,
        CLEAR_AFTER,
    );

    let (result, cleared) = helper.copy_install_command();
    assert!(matches!(result, Err(ClipboardError::Unavailable(_))));

    tokio::time::sleep(TICK * 30).await;
    assert_eq!(status.lock().plain_text(), UNAVAILABLE);

    cleared.await.unwrap();
    assert!(status.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_repeated_copy_restarts_status_reveal() {
    let (status, handle) = HtmlSurface::shared();
    let helper = ClipboardHelper::new(
        Box::new(Recording::default()),
        RenderService::new(TICK),
        handle,
        INSTALL,
        CLEAR_AFTER,
    );

    helper.copy_install_command();
    tokio::time::sleep(TICK * 3 + TICK / 2).await;
    helper.copy_install_command();
    tokio::time::sleep(TICK * 10).await;

    assert_eq!(status.lock().plain_text(), COPIED);
}
