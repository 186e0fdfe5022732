//! Terminal effect
//!
//! The typing effect of the landing page: panels that type out their text,
//! a command dispatcher writing into the output panel, the status bar and the
//! version label.

pub mod clipboard;
pub mod commands;
pub mod content;
pub mod controller;
pub mod panels;
pub mod render;
pub mod surface;
pub mod version;

pub use clipboard::{ClipboardBackend, ClipboardHelper, SystemClipboard};
pub use commands::{Command, CommandCatalog, CommandService};
pub use content::{Action, Credits, Link, Message, Segment};
pub use controller::{Initialized, PageController, Surfaces};
pub use panels::{discover_panels, PanelInitializer, PanelSource, ScheduledPanel};
pub use render::{Reveal, RenderService, SlotId};
pub use surface::{ConsoleSurface, HtmlSurface, SharedSurface, Surface};
pub use version::{extract_version, VersionLabel, VersionService};

/// Element ids the page exposes to the session.
pub mod ids {
    pub const TERMINAL: &str = "terminal";
    pub const STATUS_BAR: &str = "statusbar";
    pub const VERSION: &str = "version";
}
