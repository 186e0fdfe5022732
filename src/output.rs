//! Output Control Module
//!
//! Task progress lines for the CLI, gulp style:
//! `[14:02:11] Finished 'styles' after 12 ms (1 file)`

use chrono::Local;
use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::{AssetTask, TaskReport};

/// Global output mode flag (set once at startup)
static QUIET_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(quiet: bool, no_color: bool) {
    QUIET_MODE.store(quiet, Ordering::SeqCst);
    if no_color {
        colored::control::set_override(false);
    }
}

#[inline]
pub(crate) fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::SeqCst)
}

fn timestamp() -> String {
    format!("[{}]", Local::now().format("%H:%M:%S").to_string().dimmed())
}

pub(crate) fn task_started(task: AssetTask) {
    if !is_quiet() {
        println!("{} Starting '{}'...", timestamp(), task.name().cyan());
    }
}

pub(crate) fn task_finished(report: &TaskReport) {
    if !is_quiet() {
        println!(
            "{} Finished '{}' after {} ({})",
            timestamp(),
            report.task.name().cyan(),
            format_elapsed(report.elapsed.as_millis() as u64).magenta(),
            pluralize(report.files.len(), "file")
        );
    }
}

/// Failures are always shown.
pub(crate) fn task_failed(task: AssetTask, error: &dyn std::fmt::Display) {
    eprintln!(
        "{} {} '{}': {}",
        timestamp(),
        "Failed".bright_red(),
        task.name().cyan(),
        error
    );
}

pub(crate) fn server_started(addr: &str, livereload: bool) {
    if !is_quiet() {
        let reload = if livereload { " (live reload on)" } else { "" };
        println!(
            "{} Server started {}{}",
            timestamp(),
            format!("http://{}", addr).bright_green(),
            reload.dimmed()
        );
    }
}

pub(crate) fn watching(dir: &str) {
    if !is_quiet() {
        println!("{} Watching {}", timestamp(), dir.bright_blue());
    }
}

pub fn format_elapsed(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.2} s", ms as f64 / 1000.0)
    } else {
        format!("{} ms", ms)
    }
}

fn pluralize(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
