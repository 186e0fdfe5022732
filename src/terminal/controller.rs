//! Page session context
//!
//! Owns the state one page session needs: the slot table, the version label
//! and the services built on them.

use tokio::task::JoinHandle;
use tracing::info;

use super::clipboard::{ClipboardBackend, ClipboardHelper};
use super::commands::{CommandCatalog, CommandService};
use super::content::Credits;
use super::panels::{PanelInitializer, PanelSource, ScheduledPanel};
use super::render::{RenderService, SlotId};
use super::surface::SharedSurface;
use super::version::{VersionLabel, VersionService};
use crate::config::Config;
use crate::errors::{ClipboardError, VersionError};

/// The fixed surfaces of a page.
pub struct Surfaces {
    /// `#terminal`, where command output goes
    pub terminal: SharedSurface,
    /// `#statusbar`
    pub status: SharedSurface,
    /// `#version`, if the page has one
    pub version: Option<SharedSurface>,
}

/// What [`PageController::init`] started.
pub struct Initialized {
    pub panels: Vec<ScheduledPanel>,
    pub version_fetch: JoinHandle<Option<String>>,
}

pub struct PageController {
    render: RenderService,
    commands: CommandService,
    version: VersionService,
    clipboard: ClipboardHelper,
    panels: PanelInitializer,
}

impl PageController {
    pub fn new(
        config: &Config,
        surfaces: Surfaces,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Result<Self, VersionError> {
        let render = RenderService::new(config.terminal.tick());
        let label = VersionLabel::new(&config.terminal.version_placeholder);
        let version = VersionService::new(config.version.clone(), label.clone(), surfaces.version)?;
        let commands = CommandService::new(
            render.clone(),
            CommandCatalog::new(&config.site),
            label,
            surfaces.terminal,
        );
        let clipboard = ClipboardHelper::new(
            clipboard,
            render.clone(),
            surfaces.status,
            &config.site.install_command,
            config.terminal.status_clear(),
        );
        let panels = PanelInitializer::new(
            render.clone(),
            Credits::from_site(&config.site),
            config.terminal.panel_delay(),
        );

        Ok(Self {
            render,
            commands,
            version,
            clipboard,
            panels,
        })
    }

    /// Schedule the panel reveals, then start the version fetch without
    /// waiting for it.
    pub fn init(&self, panels: Vec<(PanelSource, SharedSurface)>) -> Initialized {
        let panels = self.panels.schedule(panels);
        info!(panels = panels.len(), "page session started");

        let version = self.version.clone();
        let version_fetch = tokio::spawn(async move { version.refresh().await });

        Initialized {
            panels,
            version_fetch,
        }
    }

    pub fn dispatch(&self, keyword: &str) -> SlotId {
        self.commands.dispatch(keyword)
    }

    pub fn copy_install_command(&self) -> (Result<(), ClipboardError>, JoinHandle<()>) {
        self.clipboard.copy_install_command()
    }

    pub fn version(&self) -> String {
        self.version.label().get()
    }

    pub fn version_service(&self) -> &VersionService {
        &self.version
    }

    pub fn render(&self) -> &RenderService {
        &self.render
    }
}
