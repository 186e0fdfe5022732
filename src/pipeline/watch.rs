//! Source watcher
//!
//! Maps changed source files to the asset tasks that consume them and reruns
//! each affected task once per burst of events.

use glob::{MatchOptions, Pattern};
use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{AssetTask, TaskRunner};
use crate::errors::PipelineError;
use crate::output;

/// Relative-to-source patterns and the task each one triggers. Fonts are
/// not watched.
const RULES: &[(&str, AssetTask)] = &[
    ("scss/*", AssetTask::Styles),
    ("images/*", AssetTask::Images),
    ("*/*.html", AssetTask::Markup),
    ("js/*.js", AssetTask::Scripts),
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct WatchRule {
    pub pattern: Pattern,
    pub task: AssetTask,
}

#[derive(Debug, Clone)]
pub struct WatchRules {
    source_dir: PathBuf,
    rules: Vec<WatchRule>,
}

impl WatchRules {
    pub fn new(source_dir: &Path) -> Result<Self, PipelineError> {
        let rules = RULES
            .iter()
            .map(|(pattern, task)| {
                Pattern::new(pattern)
                    .map(|pattern| WatchRule {
                        pattern,
                        task: *task,
                    })
                    .map_err(|e| PipelineError::Pattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source_dir: source_dir.to_path_buf(),
            rules,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Tasks to rerun after `path` changed. Paths outside the source
    /// directory match nothing.
    pub fn tasks_for(&self, path: &Path) -> Vec<AssetTask> {
        let Ok(relative) = path.strip_prefix(&self.source_dir) else {
            return Vec::new();
        };
        self.rules
            .iter()
            .filter(|rule| rule.pattern.matches_path_with(relative, MATCH_OPTIONS))
            .map(|rule| rule.task)
            .collect()
    }
}

/// Watches the source tree and reruns tasks until the event stream ends.
pub struct SourceWatcher {
    runner: TaskRunner,
    rules: WatchRules,
    debounce: Duration,
    // Dropping the watcher closes the event channel
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<notify::Event>,
}

impl SourceWatcher {
    pub fn new(runner: TaskRunner) -> Result<Self, PipelineError> {
        let source = &runner.pipeline().source_dir;
        let source = source.canonicalize().unwrap_or_else(|_| source.clone());
        let rules = WatchRules::new(&source)?;
        let debounce = Duration::from_millis(runner.pipeline().debounce_ms);

        let (tx, events) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(e) => warn!(error = %e, "watch error"),
            },
            NotifyConfig::default(),
        )
        .map_err(|e| PipelineError::Watch(e.to_string()))?;
        watcher
            .watch(&source, RecursiveMode::Recursive)
            .map_err(|e| PipelineError::Watch(format!("{}: {}", source.display(), e)))?;

        info!(dir = %source.display(), "watching sources");
        Ok(Self {
            runner,
            rules,
            debounce,
            _watcher: watcher,
            events,
        })
    }

    /// Wait for the next burst of relevant events and return the tasks it
    /// affects, in build order. `None` once the watcher is gone.
    pub async fn next_batch(&mut self) -> Option<BTreeSet<AssetTask>> {
        loop {
            let mut batch = BTreeSet::new();
            let first = self.events.recv().await?;
            self.collect(&first, &mut batch);

            // Extend the burst until it has been quiet for `debounce`
            while let Ok(Some(event)) = tokio::time::timeout(self.debounce, self.events.recv()).await
            {
                self.collect(&event, &mut batch);
            }

            if !batch.is_empty() {
                return Some(batch);
            }
        }
    }

    fn collect(&self, event: &notify::Event, batch: &mut BTreeSet<AssetTask>) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        for path in &event.paths {
            let tasks = self.rules.tasks_for(path);
            if !tasks.is_empty() {
                debug!(path = %path.display(), ?tasks, "source changed");
            }
            batch.extend(tasks);
        }
    }

    /// Rerun affected tasks forever. A failing task is reported and the
    /// watcher keeps going.
    pub async fn run(mut self) -> Result<(), PipelineError> {
        while let Some(batch) = self.next_batch().await {
            for task in batch {
                output::task_started(task);
                match self.runner.run(task).await {
                    Ok(report) => output::task_finished(&report),
                    Err(e) => {
                        error!(task = %task, error = %e, "task failed");
                        output::task_failed(task, &e);
                    }
                }
            }
        }
        Err(PipelineError::Watch("event stream closed".to_string()))
    }
}
