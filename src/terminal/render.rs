//! Render Slot Manager
//!
//! Reveals a [`Message`] into a surface one unit per tick. Every reveal runs
//! under a [`SlotId`]; starting a new reveal on a busy slot cancels the old
//! one before anything else happens, so two reveals never share a slot.
//!
//! Cancellation is exact: a tick only appends while holding the slot table
//! lock and after checking that its generation is still the current one for
//! the slot. A superseding call bumps the generation under the same lock.

use parking_lot::Mutex;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::content::{Fragment, Message, Unit};
use super::surface::SharedSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Slot shared by all command output.
    pub const COMMAND: SlotId = SlotId(0);
    /// Slot of the status bar.
    pub const STATUS: SlotId = SlotId(u32::MAX);
    /// Range random panel slots are drawn from.
    pub const PANEL_RANGE: RangeInclusive<u32> = 1..=90_000;

    pub fn random() -> Self {
        SlotId(rand::rng().random_range(Self::PANEL_RANGE))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pure reveal state: what is left to show.
#[derive(Debug, Clone)]
pub struct Reveal {
    pending: VecDeque<Unit>,
    revealed: usize,
}

impl Reveal {
    pub fn new(message: &Message) -> Self {
        Self {
            pending: message.units(),
            revealed: 0,
        }
    }

    /// Consume the next unit. Substitution happens here, one unit at a time.
    pub fn tick(&mut self) -> Option<Fragment> {
        let unit = self.pending.pop_front()?;
        self.revealed += 1;
        Some(Fragment::from(unit))
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Iterator for Reveal {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        self.tick()
    }
}

struct SlotEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct SlotTable {
    slots: HashMap<SlotId, SlotEntry>,
    next_generation: u64,
}

struct Inner {
    tick: Duration,
    table: Mutex<SlotTable>,
}

/// Handle to the slot table. Cheap to clone; clones share the slots.
#[derive(Clone)]
pub struct RenderService {
    inner: Arc<Inner>,
}

impl RenderService {
    pub fn new(tick: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tick,
                table: Mutex::new(SlotTable::default()),
            }),
        }
    }

    pub fn tick(&self) -> Duration {
        self.inner.tick
    }

    /// Start revealing `message` into `surface` under `slot`.
    ///
    /// Any reveal already running under `slot` is cancelled before this call
    /// touches the surface. The first unit lands one tick after the call.
    /// An empty message leaves the slot idle right away.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_render(
        &self,
        message: &Message,
        surface: SharedSurface,
        clear_first: bool,
        slot: SlotId,
    ) -> SlotId {
        let mut table = self.inner.table.lock();

        if let Some(previous) = table.slots.remove(&slot) {
            previous.handle.abort();
            debug!(slot = %slot, "superseded running reveal");
        }

        if clear_first {
            surface.lock().clear();
        }

        let reveal = Reveal::new(message);
        if reveal.is_finished() {
            trace!(slot = %slot, "empty reveal");
            return slot;
        }

        table.next_generation += 1;
        let generation = table.next_generation;
        let first_tick = Instant::now() + self.inner.tick;
        let handle = tokio::spawn(run_reveal(
            Arc::downgrade(&self.inner),
            slot,
            generation,
            first_tick,
            reveal,
            surface,
        ));
        table.slots.insert(slot, SlotEntry { generation, handle });
        slot
    }

    /// Stop the reveal running under `slot`, if any.
    pub fn cancel(&self, slot: SlotId) -> bool {
        match self.inner.table.lock().slots.remove(&slot) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.inner.table.lock().slots.contains_key(&slot)
    }

    pub fn active_slots(&self) -> usize {
        self.inner.table.lock().slots.len()
    }
}

async fn run_reveal(
    inner: Weak<Inner>,
    slot: SlotId,
    generation: u64,
    first_tick: Instant,
    mut reveal: Reveal,
    surface: SharedSurface,
) {
    let Some(period) = inner.upgrade().map(|i| i.tick) else {
        return;
    };
    let mut interval = tokio::time::interval_at(first_tick, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if !step(&inner, slot, generation, &mut reveal, &surface) {
            return;
        }
    }
}

/// Append one unit. Returns whether the reveal should keep ticking.
fn step(
    inner: &Weak<Inner>,
    slot: SlotId,
    generation: u64,
    reveal: &mut Reveal,
    surface: &SharedSurface,
) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    let mut table = inner.table.lock();
    match table.slots.get(&slot) {
        Some(entry) if entry.generation == generation => {}
        _ => return false,
    }

    if let Some(fragment) = reveal.tick() {
        surface.lock().append(&fragment);
    }

    if reveal.is_finished() {
        table.slots.remove(&slot);
        trace!(slot = %slot, units = reveal.revealed(), "reveal finished");
        return false;
    }
    true
}
