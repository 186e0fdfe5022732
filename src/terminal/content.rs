//! Content model for revealed text.
//!
//! A [`Message`] is a sequence of typed segments: plain text, hyperlinks and
//! action triggers. Revealing walks it one [`Unit`] at a time; each unit turns
//! into exactly one [`Fragment`] when its tick fires, so a widget is either
//! fully on screen or not at all.

use std::collections::VecDeque;

use crate::config::SiteConfig;

/// Legacy marker for the website designer credit link.
pub const DESIGNER_MARKER: char = '\u{1}';
/// Legacy marker for the developer credit link.
pub const DEVELOPER_MARKER: char = '\u{2}';
/// Legacy marker for the "copy install command" trigger.
pub const COPY_MARKER: char = '\u{3}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Interactive widgets that trigger a session action when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CopyInstallCommand,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::CopyInstallCommand => "click to copy command on clipboard",
        }
    }

    /// Name of the page-side handler bound to the widget.
    pub fn handler(&self) -> &'static str {
        match self {
            Action::CopyInstallCommand => "clipboard()",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link(Link),
    Action(Action),
}

/// Author credits that the legacy markers stand for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credits {
    pub developer: Link,
    pub designer: Link,
}

impl Credits {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            developer: Link::new(&site.developer.name, &site.developer.url),
            designer: Link::new(&site.designer.name, &site.designer.url),
        }
    }
}

impl Default for Credits {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

/// Text to reveal, built from typed segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Segment>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        // Merge adjacent text so segments() stays canonical
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(Segment::Text(text));
        }
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.segments.push(Segment::Link(link));
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.segments.push(Segment::Action(action));
        self
    }

    /// Parse text that may carry the legacy marker characters.
    pub fn parse_marked(text: &str, credits: &Credits) -> Self {
        let mut message = Message::new();
        let mut run = String::new();
        for c in text.chars() {
            let widget = match c {
                DESIGNER_MARKER => Segment::Link(credits.designer.clone()),
                DEVELOPER_MARKER => Segment::Link(credits.developer.clone()),
                COPY_MARKER => Segment::Action(Action::CopyInstallCommand),
                _ => {
                    run.push(c);
                    continue;
                }
            };
            message = message.text(std::mem::take(&mut run));
            message.segments.push(widget);
        }
        message.text(run)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of reveal units (characters plus widgets).
    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.chars().count(),
                Segment::Link(_) | Segment::Action(_) => 1,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn units(&self) -> VecDeque<Unit> {
        let mut units = VecDeque::with_capacity(self.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => units.extend(t.chars().map(Unit::Char)),
                Segment::Link(link) => units.push_back(Unit::Link(link.clone())),
                Segment::Action(action) => units.push_back(Unit::Action(*action)),
            }
        }
        units
    }

    /// Literal text with widgets shown by their labels.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Link(link) => out.push_str(&link.label),
                Segment::Action(action) => out.push_str(action.label()),
            }
        }
        out
    }
}

/// One step of a reveal, before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Char(char),
    Link(Link),
    Action(Action),
}

/// What a surface receives on each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Char(char),
    NonBreakingSpace,
    LineBreak,
    Link(Link),
    Action(Action),
}

impl From<Unit> for Fragment {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Char(' ') => Fragment::NonBreakingSpace,
            Unit::Char('\n') => Fragment::LineBreak,
            Unit::Char(c) => Fragment::Char(c),
            Unit::Link(link) => Fragment::Link(link),
            Unit::Action(action) => Fragment::Action(action),
        }
    }
}

impl Fragment {
    pub fn to_html(&self) -> String {
        match self {
            Fragment::Char(c) => escape_html(&c.to_string()),
            Fragment::NonBreakingSpace => "&nbsp;".to_string(),
            Fragment::LineBreak => "<br />".to_string(),
            Fragment::Link(link) => format!(
                "<a href=\"{}\" target=\"_blank\">{}</a>",
                escape_html(&link.href),
                escape_html(&link.label)
            ),
            Fragment::Action(action) => format!(
                "<a onClick=\"{}\" class=\"text-neon-hover\">{}</a>",
                action.handler(),
                action.label()
            ),
        }
    }

    pub fn to_plain(&self) -> String {
        match self {
            Fragment::Char(c) => c.to_string(),
            Fragment::NonBreakingSpace => " ".to_string(),
            Fragment::LineBreak => "\n".to_string(),
            Fragment::Link(link) => link.label.clone(),
            Fragment::Action(action) => action.label().to_string(),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
