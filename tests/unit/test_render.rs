//! Unit tests for the render slot manager
//!
//! Tests cover:
//! - One unit per tick, first tick one interval after the call
//! - Superseding a running reveal on the same slot
//! - Independent slots
//! - Atomic widgets
//! - Reveal length and ordering properties

use nodem_site::terminal::content::{Fragment, Link, Message};
use nodem_site::terminal::render::{Reveal, RenderService, SlotId};
use nodem_site::terminal::surface::HtmlSurface;
use proptest::prelude::*;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(20);

/// Sleep to the middle of tick `n` (counted from the call).
async fn until_tick(n: u32) {
    tokio::time::sleep(TICK * n + TICK / 2).await;
}

// ============================================================================
// Timing
// ============================================================================

mod timing_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_unit_lands_one_tick_later() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();
        render.start_render(&Message::new().text("ab\n"), handle, true, SlotId(5));

        tokio::time::sleep(TICK / 2).await;
        assert!(surface.lock().is_empty());

        tokio::time::sleep(TICK).await;
        assert_eq!(surface.lock().fragments(), &[Fragment::Char('a')]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_appends_each_unit_then_stops() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();
        render.start_render(&Message::new().text("ab\n"), handle, true, SlotId(5));

        until_tick(1).await;
        assert_eq!(surface.lock().fragments(), &[Fragment::Char('a')]);
        tokio::time::sleep(TICK).await;
        assert_eq!(
            surface.lock().fragments(),
            &[Fragment::Char('a'), Fragment::Char('b')]
        );
        tokio::time::sleep(TICK).await;
        assert_eq!(
            surface.lock().fragments(),
            &[Fragment::Char('a'), Fragment::Char('b'), Fragment::LineBreak]
        );
        assert!(!render.is_active(SlotId(5)));

        tokio::time::sleep(TICK * 5).await;
        assert_eq!(surface.lock().fragments().len(), 3);
        assert_eq!(surface.lock().html(), "ab<br />");
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_slot_is_freed() {
        let render = RenderService::new(TICK);
        let (_surface, handle) = HtmlSurface::shared();
        render.start_render(&Message::new().text("ok"), handle, true, SlotId(11));
        assert_eq!(render.active_slots(), 1);

        until_tick(3).await;
        assert_eq!(render.active_slots(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_space_becomes_non_breaking() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();
        render.start_render(&Message::new().text("a b"), handle, true, SlotId(1));
        until_tick(4).await;
        assert_eq!(surface.lock().html(), "a&nbsp;b");
    }
}

// ============================================================================
// Cancellation
// ============================================================================

mod cancellation_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_second_reveal_supersedes_first() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();

        render.start_render(&Message::new().text("first"), handle.clone(), true, SlotId(7));
        until_tick(2).await;
        assert_eq!(surface.lock().plain_text(), "fi");

        render.start_render(&Message::new().text("second"), handle, true, SlotId(7));
        assert!(surface.lock().is_empty(), "clear happens inside the call");

        until_tick(10).await;
        assert_eq!(surface.lock().plain_text(), "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_without_clear_keeps_old_units() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();

        render.start_render(&Message::new().text("abc"), handle.clone(), true, SlotId(3));
        until_tick(1).await;
        render.start_render(&Message::new().text("xy"), handle, false, SlotId(3));

        until_tick(10).await;
        assert_eq!(surface.lock().plain_text(), "axy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_message_cancels_running_reveal() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();

        render.start_render(&Message::new().text("abcdef"), handle.clone(), true, SlotId(4));
        until_tick(2).await;
        render.start_render(&Message::new(), handle, true, SlotId(4));
        assert!(!render.is_active(SlotId(4)));

        until_tick(10).await;
        assert!(surface.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_are_independent() {
        let render = RenderService::new(TICK);
        let (left, left_handle) = HtmlSurface::shared();
        let (right, right_handle) = HtmlSurface::shared();

        render.start_render(&Message::new().text("left"), left_handle, true, SlotId(1));
        render.start_render(&Message::new().text("right"), right_handle, true, SlotId(2));
        assert_eq!(render.active_slots(), 2);

        until_tick(10).await;
        assert_eq!(left.lock().plain_text(), "left");
        assert_eq!(right.lock().plain_text(), "right");
    }
}

// ============================================================================
// Widgets
// ============================================================================

mod widget_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_link_appears_in_one_tick() {
        let render = RenderService::new(TICK);
        let (surface, handle) = HtmlSurface::shared();
        let message = Message::new()
            .text("x")
            .link(Link::new("barreto", "https://github.com/victoreduardobarreto"));
        render.start_render(&message, handle, true, SlotId(8));

        until_tick(1).await;
        assert_eq!(surface.lock().html(), "x");

        tokio::time::sleep(TICK).await;
        assert_eq!(
            surface.lock().html(),
            "x<a href=\"https://github.com/victoreduardobarreto\" target=\"_blank\">barreto</a>"
        );
        assert!(!render.is_active(SlotId(8)));
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn test_reveal_yields_one_fragment_per_char(s in "\\PC{0,64}") {
        let fragments: Vec<Fragment> = Reveal::new(&Message::new().text(s.clone())).collect();
        prop_assert_eq!(fragments.len(), s.chars().count());
    }

    #[test]
    fn test_reveal_preserves_order(s in "[a-z \\n]{0,64}") {
        let shown: String = Reveal::new(&Message::new().text(s.clone()))
            .map(|f| f.to_plain())
            .collect();
        prop_assert_eq!(shown, s);
    }

    #[test]
    fn test_widgets_count_once(before in "[a-z]{0,8}", after in "[a-z]{0,8}") {
        let message = Message::new()
            .text(before.clone())
            .link(Link::new("marco tulio avila", "https://github.com/marcoT89"))
            .text(after.clone());
        prop_assert_eq!(message.len(), before.len() + after.len() + 1);
        prop_assert_eq!(Reveal::new(&message).count(), message.len());
    }
}
