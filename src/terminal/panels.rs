//! Panel Initializer
//!
//! Finds the `terminal-effect` panels of a page and schedules their reveals.

use rand::Rng;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::content::{Credits, Message};
use super::render::{RenderService, SlotId};
use super::surface::SharedSurface;

pub const PANEL_CLASS: &str = "terminal-effect";
pub const PANEL_SOURCE_ATTR: &str = "data";

/// A panel found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSource {
    /// Element id, when the panel has one
    pub id: Option<String>,
    /// Raw source text, legacy markers included
    pub text: String,
}

/// List the panels of `html` in document order.
///
/// A panel without a `data` attribute reveals nothing.
pub fn discover_panels(html: &str) -> Vec<PanelSource> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(&format!(".{}", PANEL_CLASS)) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| PanelSource {
            id: element.value().id().map(str::to_string),
            text: element
                .value()
                .attr(PANEL_SOURCE_ATTR)
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

/// A panel whose reveal has been scheduled.
pub struct ScheduledPanel {
    pub source: PanelSource,
    pub slot: SlotId,
    pub handle: JoinHandle<()>,
}

pub struct PanelInitializer {
    render: RenderService,
    credits: Credits,
    delay: Duration,
}

impl PanelInitializer {
    pub fn new(render: RenderService, credits: Credits, delay: Duration) -> Self {
        Self {
            render,
            credits,
            delay,
        }
    }

    /// Schedule every panel, last one first. All reveals start after the same
    /// delay, each under its own random slot.
    pub fn schedule(&self, panels: Vec<(PanelSource, SharedSurface)>) -> Vec<ScheduledPanel> {
        let mut taken = HashSet::new();
        let mut scheduled = Vec::with_capacity(panels.len());

        for (source, surface) in panels.into_iter().rev() {
            let slot = unique_slot(&mut taken);
            let message = Message::parse_marked(&source.text, &self.credits);
            let render = self.render.clone();
            let delay = self.delay;
            debug!(slot = %slot, units = message.len(), "scheduling panel");

            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                render.start_render(&message, surface, true, slot);
            });

            scheduled.push(ScheduledPanel {
                source,
                slot,
                handle,
            });
        }
        scheduled
    }
}

fn unique_slot(taken: &mut HashSet<SlotId>) -> SlotId {
    let mut rng = rand::rng();
    loop {
        let slot = SlotId(rng.random_range(SlotId::PANEL_RANGE));
        if taken.insert(slot) {
            return slot;
        }
    }
}
