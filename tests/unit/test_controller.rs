//! Unit tests for the page session context

use nodem_site::config::Config;
use nodem_site::errors::ClipboardError;
use nodem_site::terminal::clipboard::ClipboardBackend;
use nodem_site::terminal::controller::{PageController, Surfaces};
use nodem_site::terminal::panels::discover_panels;
use nodem_site::terminal::surface::HtmlSurface;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct NoClipboard;

impl ClipboardBackend for NoClipboard {
    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("test".to_string()))
    }
}

fn config(proxy_url: String, tick_ms: u64) -> Config {
    let mut config = Config::default();
    config.version.proxy_url = proxy_url;
    config.version.timeout_secs = 2;
    config.terminal.tick_ms = tick_ms;
    config.terminal.panel_delay_ms = 10;
    config
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_placeholder_for_about() {
    let config = config("http://127.0.0.1:1/get".to_string(), 20);
    let (terminal, terminal_handle) = HtmlSurface::shared();
    let (version, version_handle) = HtmlSurface::shared();
    let (_status, status_handle) = HtmlSurface::shared();

    let controller = PageController::new(
        &config,
        Surfaces {
            terminal: terminal_handle,
            status: status_handle,
            version: Some(version_handle),
        },
        Box::new(NoClipboard),
    )
    .unwrap();

    let session = controller.init(Vec::new());
    assert!(session.panels.is_empty());
    assert_eq!(session.version_fetch.await.unwrap(), None);
    assert_eq!(controller.version(), "loading version...");
    assert!(version.lock().is_empty());

    controller.dispatch("about");
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(terminal
        .lock()
        .plain_text()
        .starts_with("nodem version : loading version... \n"));
}

#[tokio::test]
async fn test_session_reveals_panels_and_fetched_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": "<div class=\"commit-title\"><a href=\"#\"> v2.0.1 </a></div>"
        })))
        .mount(&server)
        .await;

    let config = config(format!("{}/get", server.uri()), 1);
    let (terminal, terminal_handle) = HtmlSurface::shared();
    let (version, version_handle) = HtmlSurface::shared();
    let (_status, status_handle) = HtmlSurface::shared();
    let (panel, panel_handle) = HtmlSurface::shared();

    let controller = PageController::new(
        &config,
        Surfaces {
            terminal: terminal_handle,
            status: status_handle,
            version: Some(version_handle),
        },
        Box::new(NoClipboard),
    )
    .unwrap();

    let sources = discover_panels(r#"<p class="terminal-effect" data="hi"></p>"#);
    let panels = sources.into_iter().map(|s| (s, panel_handle.clone())).collect();
    let session = controller.init(panels);

    assert_eq!(session.version_fetch.await.unwrap().as_deref(), Some("v2.0.1"));
    assert_eq!(version.lock().plain_text(), "v2.0.1");

    controller.dispatch("about");
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert_eq!(panel.lock().plain_text(), "hi");
    assert!(terminal
        .lock()
        .plain_text()
        .starts_with("nodem version : v2.0.1 \n"));
}

#[tokio::test(start_paused = true)]
async fn test_copy_without_clipboard_reports_error() {
    let config = config("http://127.0.0.1:1/get".to_string(), 20);
    let (_terminal, terminal_handle) = HtmlSurface::shared();
    let (status, status_handle) = HtmlSurface::shared();

    let controller = PageController::new(
        &config,
        Surfaces {
            terminal: terminal_handle,
            status: status_handle,
            version: None,
        },
        Box::new(NoClipboard),
    )
    .unwrap();

    let (result, _cleared) = controller.copy_install_command();
    assert!(result.is_err());
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(status.lock().plain_text(), "clipboard unavailable.");
}
