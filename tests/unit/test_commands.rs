//! Unit tests for the command dispatcher

use nodem_site::config::SiteConfig;
use nodem_site::terminal::commands::{Command, CommandCatalog, CommandService};
use nodem_site::terminal::render::{RenderService, SlotId};
use nodem_site::terminal::surface::{HtmlSurface, Surface};
use nodem_site::terminal::version::VersionLabel;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(20);

fn service() -> (CommandService, VersionLabel, Arc<Mutex<HtmlSurface>>) {
    let (surface, handle) = HtmlSurface::shared();
    let label = VersionLabel::new("loading version...");
    let service = CommandService::new(
        RenderService::new(TICK),
        CommandCatalog::new(&SiteConfig::default()),
        label.clone(),
        handle,
    );
    (service, label, surface)
}

/// Wait long enough for any canned message to finish.
async fn settle(units: usize) {
    tokio::time::sleep(TICK * (units as u32 + 2)).await;
}

#[tokio::test(start_paused = true)]
async fn test_use_lists_commands() {
    let (service, _label, surface) = service();
    let units = service.catalog().message(Command::Use, "").len();

    let slot = service.dispatch("use");
    assert_eq!(slot, SlotId::COMMAND);
    settle(units).await;

    let text = surface.lock().plain_text();
    assert!(text.starts_with("The available commands are:"));
    assert!(text.contains("nodem use 10.14.2 --npm"));
}

#[tokio::test(start_paused = true)]
async fn test_about_before_fetch_shows_placeholder() {
    let (service, _label, surface) = service();
    service.dispatch("about");
    settle(200).await;

    let text = surface.lock().plain_text();
    assert!(text.starts_with("nodem version : loading version... \n"));
    assert!(text.contains("license : MIT"));
}

#[tokio::test(start_paused = true)]
async fn test_about_reads_label_at_dispatch_time() {
    let (service, label, surface) = service();
    label.set("  v1.0.3\n");
    service.dispatch("about");
    settle(200).await;

    assert!(surface
        .lock()
        .plain_text()
        .starts_with("nodem version : v1.0.3 \n"));
}

#[tokio::test(start_paused = true)]
async fn test_about_links_are_rendered_as_anchors() {
    let (service, _label, surface) = service();
    service.dispatch("about");
    settle(200).await;

    let html = surface.lock().html().to_string();
    assert!(html.contains("<a href=\"https://github.com/marcoT89\" target=\"_blank\">marco tulio avila</a>"));
    assert!(html.contains(
        "<a href=\"https://github.com/victoreduardobarreto\" target=\"_blank\">barreto</a>"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_install_ends_with_copy_trigger() {
    let (service, _label, surface) = service();
    let units = service.catalog().message(Command::Install, "").len();
    service.dispatch("install");
    settle(units).await;

    let html = surface.lock().html().to_string();
    assert!(html.starts_with("***warning***"));
    assert!(html.ends_with(
        "<a onClick=\"clipboard()\" class=\"text-neon-hover\">click to copy command on clipboard</a>"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_command_clears_and_renders_nothing() {
    let (service, _label, surface) = service();
    surface.lock().set_text("previous output");

    service.dispatch("rm");
    assert!(surface.lock().is_empty());

    settle(20).await;
    assert!(surface.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dispatches_supersede_each_other() {
    let (service, _label, surface) = service();
    service.dispatch("use");
    tokio::time::sleep(TICK * 5).await;
    service.dispatch("about");
    settle(200).await;

    let text = surface.lock().plain_text();
    assert!(text.starts_with("nodem version :"));
    assert!(!text.contains("available"));
}
