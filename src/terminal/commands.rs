//! Command Dispatcher
//!
//! Maps a typed keyword to its canned message and reveals it into the
//! terminal output surface, replacing whatever was there.

use std::fmt;

use super::content::{Action, Credits, Message};
use super::render::{RenderService, SlotId};
use super::surface::SharedSurface;
use super::version::VersionLabel;
use crate::config::SiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Use,
    Install,
    About,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Use, Command::Install, Command::About];

    /// Exact keyword match; anything else is not a command.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "use" => Some(Command::Use),
            "install" => Some(Command::Install),
            "about" => Some(Command::About),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Use => "use",
            Command::Install => "install",
            Command::About => "about",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

const USAGE: &str = "The available commands are: \n \n\
*install <version> \n\
nodem install 10.14.2 \n\n\
*use <version> \n\
nodem use 10.14.2 \n\n\
or with --npm to also use npm version for this node version \n\
nodem use 10.14.2 --npm \n\n\
*remove <version> \n\
nodem remove 10.14.2 \n\n\
*available \n\
nodem available \n\n\
*list \n\
nodem list \n\n\
*help \n\
nodem help \n\n";

const INSTALL_PREAMBLE: &str = "***warning*** \n\
wget is required! \n\n\
to install nodem just run this command on terminal: \n \n";

/// The fixed set of canned messages.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    credits: Credits,
    install_command: String,
}

impl CommandCatalog {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            credits: Credits::from_site(site),
            install_command: site.install_command.clone(),
        }
    }

    /// Build the message for `command`; `version` is trimmed on the way in.
    pub fn message(&self, command: Command, version: &str) -> Message {
        match command {
            Command::Use => Message::new().text(USAGE),
            Command::Install => Message::new()
                .text(INSTALL_PREAMBLE)
                .text(format!("{} \n\n", self.install_command))
                .action(Action::CopyInstallCommand),
            Command::About => Message::new()
                .text(format!("nodem version : {} \n", version.trim()))
                .text("license : MIT \n")
                .text("developer : ")
                .link(self.credits.developer.clone())
                .text(" \n")
                .text("website design concept : ")
                .link(self.credits.designer.clone())
                .text(" \n"),
        }
    }

    /// Unknown keywords get an empty message.
    pub fn message_for(&self, keyword: &str, version: &str) -> Message {
        Command::parse(keyword)
            .map(|command| self.message(command, version))
            .unwrap_or_default()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::new(&SiteConfig::default())
    }
}

/// Dispatches keywords into the terminal output surface.
#[derive(Clone)]
pub struct CommandService {
    render: RenderService,
    catalog: CommandCatalog,
    version: VersionLabel,
    output: SharedSurface,
}

impl CommandService {
    pub fn new(
        render: RenderService,
        catalog: CommandCatalog,
        version: VersionLabel,
        output: SharedSurface,
    ) -> Self {
        Self {
            render,
            catalog,
            version,
            output,
        }
    }

    /// Clear the output and reveal the message for `keyword`.
    ///
    /// The version label is read now, so `about` shows whatever has been
    /// fetched so far.
    pub fn dispatch(&self, keyword: &str) -> SlotId {
        let message = self.catalog.message_for(keyword, &self.version.get());
        if message.is_empty() {
            tracing::debug!(keyword = %keyword, "unknown command");
        }
        self.render
            .start_render(&message, self.output.clone(), true, SlotId::COMMAND)
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }
}
