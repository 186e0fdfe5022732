//! Asset Pipeline
//!
//! The fixed set of build tasks for the site:
//! - `styles`: compile `scss/main.scss` into compressed CSS
//! - `fonts` / `images`: copy files as they are
//! - `pug` (alias `markup`): render the page templates
//! - `js`: strip comments and blank lines from scripts
//!
//! `server` and `watch` are long-running and live in [`crate::server`] and
//! [`watch`]. Every finished asset task sends a [`ReloadEvent`].

pub mod minify;
pub mod tasks;
pub mod watch;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::{Config, PipelineConfig, SiteConfig};
use crate::errors::PipelineError;

/// Capacity of the reload channel; slow listeners skip old events.
const RELOAD_CHANNEL_CAPACITY: usize = 64;

/// Tasks that turn sources into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetTask {
    Styles,
    Fonts,
    Images,
    Markup,
    Scripts,
}

impl AssetTask {
    /// Build order of `default` and `build`.
    pub const ALL: [AssetTask; 5] = [
        AssetTask::Styles,
        AssetTask::Fonts,
        AssetTask::Images,
        AssetTask::Markup,
        AssetTask::Scripts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AssetTask::Styles => "styles",
            AssetTask::Fonts => "fonts",
            AssetTask::Images => "images",
            AssetTask::Markup => "pug",
            AssetTask::Scripts => "js",
        }
    }
}

impl fmt::Display for AssetTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Asset(AssetTask),
    Server,
    Watch,
}

impl Task {
    /// Parse task names, expanding `default` and dropping repeats.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Task>, PipelineError> {
        let mut tasks = Vec::new();
        for name in names {
            let name = name.as_ref();
            let expanded: Vec<Task> = if name == "default" {
                AssetTask::ALL
                    .into_iter()
                    .map(Task::Asset)
                    .chain([Task::Server, Task::Watch])
                    .collect()
            } else {
                vec![name.parse()?]
            };
            for task in expanded {
                if !tasks.contains(&task) {
                    tasks.push(task);
                }
            }
        }
        Ok(tasks)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Asset(asset) => asset.name(),
            Task::Server => "server",
            Task::Watch => "watch",
        }
    }
}

impl FromStr for Task {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "styles" => Ok(Task::Asset(AssetTask::Styles)),
            "fonts" => Ok(Task::Asset(AssetTask::Fonts)),
            "images" => Ok(Task::Asset(AssetTask::Images)),
            "pug" | "markup" => Ok(Task::Asset(AssetTask::Markup)),
            "js" => Ok(Task::Asset(AssetTask::Scripts)),
            "server" => Ok(Task::Server),
            "watch" => Ok(Task::Watch),
            other => Err(PipelineError::UnknownTask {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one asset task.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: AssetTask,
    pub files: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Tells live-reload clients that `task` rewrote its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadEvent {
    pub task: AssetTask,
}

/// Runs asset tasks against one project layout.
#[derive(Clone)]
pub struct TaskRunner {
    pipeline: PipelineConfig,
    site: SiteConfig,
    version_placeholder: String,
    livereload: bool,
    reload: broadcast::Sender<ReloadEvent>,
}

impl TaskRunner {
    pub fn new(config: &Config) -> Self {
        let (reload, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        Self {
            pipeline: config.pipeline.clone(),
            site: config.site.clone(),
            version_placeholder: config.terminal.version_placeholder.clone(),
            livereload: config.server.livereload,
            reload,
        }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.reload.subscribe()
    }

    pub fn reload_sender(&self) -> broadcast::Sender<ReloadEvent> {
        self.reload.clone()
    }

    /// Run one task on the blocking pool and announce the reload.
    pub async fn run(&self, task: AssetTask) -> Result<TaskReport, PipelineError> {
        let runner = self.clone();
        let report = tokio::task::spawn_blocking(move || runner.run_blocking(task))
            .await
            .map_err(|e| PipelineError::Aborted {
                task: task.to_string(),
                message: e.to_string(),
            })??;

        // No subscriber is fine: nobody is listening for reloads
        let _ = self.reload.send(ReloadEvent { task });
        Ok(report)
    }

    /// Run tasks in order, stopping at the first failure.
    pub async fn run_all(&self, tasks: &[AssetTask]) -> Result<Vec<TaskReport>, PipelineError> {
        let mut reports = Vec::with_capacity(tasks.len());
        for task in tasks {
            reports.push(self.run(*task).await?);
        }
        Ok(reports)
    }

    /// Run one task on the current thread, without a reload event.
    pub fn run_blocking(&self, task: AssetTask) -> Result<TaskReport, PipelineError> {
        let started = Instant::now();
        let p = &self.pipeline;
        let src = &p.source_dir;
        let out = &p.output_dir;
        debug!(task = %task, "task started");

        let files = match task {
            AssetTask::Styles => tasks::compile_styles(
                &src.join("scss").join("main.scss"),
                &out.join(&p.styles_dest),
            )?,
            AssetTask::Fonts => tasks::copy_files(&src.join("fonts"), &out.join(&p.fonts_dest))?,
            AssetTask::Images => {
                tasks::copy_files(&src.join("images"), &out.join(&p.images_dest))?
            }
            AssetTask::Markup => tasks::render_templates(
                &src.join("templates"),
                out,
                &tasks::TemplateContext {
                    site: &self.site,
                    version_placeholder: &self.version_placeholder,
                    livereload: self.livereload,
                },
            )?,
            AssetTask::Scripts => tasks::minify_scripts(&src.join("js"), &out.join(&p.scripts_dest))?,
        };

        let elapsed = started.elapsed();
        info!(
            task = %task,
            files = files.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "task finished"
        );
        Ok(TaskReport {
            task,
            files,
            elapsed,
        })
    }
}
