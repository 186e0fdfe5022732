//! Output surfaces
//!
//! A surface is whatever a reveal writes into: an HTML buffer for a page
//! element, or the console for the interactive session.

use colored::Colorize;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

use super::content::{Fragment, Unit};

pub trait Surface: Send {
    fn clear(&mut self);

    fn append(&mut self, fragment: &Fragment);

    /// Replace the whole content at once, without animation.
    fn set_text(&mut self, text: &str) {
        self.clear();
        for c in text.chars() {
            self.append(&Fragment::from(Unit::Char(c)));
        }
    }
}

pub type SharedSurface = Arc<Mutex<dyn Surface>>;

/// Surface backed by an HTML string, the way a page element's innerHTML is.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    html: String,
    fragments: Vec<Fragment>,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface together with the handle a reveal can write into.
    pub fn shared() -> (Arc<Mutex<HtmlSurface>>, SharedSurface) {
        let surface = Arc::new(Mutex::new(HtmlSurface::new()));
        let handle: SharedSurface = surface.clone();
        (surface, handle)
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(Fragment::to_plain).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Surface for HtmlSurface {
    fn clear(&mut self) {
        self.html.clear();
        self.fragments.clear();
    }

    fn append(&mut self, fragment: &Fragment) {
        self.html.push_str(&fragment.to_html());
        self.fragments.push(fragment.clone());
    }
}

/// Surface that types straight into a terminal stream.
pub struct ConsoleSurface<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Surface for ConsoleSurface<W> {
    fn clear(&mut self) {
        // A console cannot take text back; start on a fresh line instead
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }

    fn append(&mut self, fragment: &Fragment) {
        let text = fragment.to_plain();
        let _ = match fragment {
            Fragment::Link(_) => write!(self.out, "{}", text.underline().bright_cyan()),
            Fragment::Action(_) => write!(self.out, "{}", format!("[{}]", text).bright_green()),
            _ => write!(self.out, "{}", text),
        };
        let _ = self.out.flush();
    }
}
