//! nodem-site command line
//!
//! Build, serve and preview the nodem landing page.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::errors::SiteError;
use crate::observability::telemetry::init_tracing;
use crate::output;
use crate::pipeline::watch::SourceWatcher;
use crate::pipeline::{AssetTask, Task, TaskRunner};
use crate::server;
use crate::terminal::{
    discover_panels, ConsoleSurface, HtmlSurface, PageController, SharedSurface, Surfaces,
    SystemClipboard, VersionLabel, VersionService,
};

#[derive(Parser)]
#[command(name = "nodem-site")]
#[command(about = "Build, serve and preview the nodem landing page")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Project directory
    #[arg(short = 'C', long, value_name = "DIR")]
    workdir: Option<String>,

    /// Quiet mode (only failures are printed)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode (debug logging to stderr)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run named tasks (styles, fonts, images, pug, js, server, watch, default)
    Run {
        #[arg(required = true, value_name = "TASK")]
        tasks: Vec<String>,
    },

    /// Run every asset task once
    Build,

    /// Serve the site without building
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rebuild on source changes, without a server
    Watch,

    /// Build, then serve and watch (the default)
    Dev,

    /// Interactive preview of the page's terminal effect
    #[command(alias = "t")]
    Terminal {
        /// Page whose panels are revealed (defaults to the built index.html)
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,
    },

    /// Fetch and print the latest nodem version
    Version,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::init(cli.quiet, cli.no_color || std::env::var("NO_COLOR").is_ok());

    // Change to working directory FIRST (before resolving relative paths)
    if let Some(ref workdir) = cli.workdir {
        std::env::set_current_dir(workdir)
            .with_context(|| format!("Cannot enter project directory '{}'", workdir))?;
    }

    let config_path: Option<PathBuf> = cli.config.map(|p| {
        // Expand ~ to home directory
        if let Some(rest) = p.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(p)
    });

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let config = Config::load(config_path.as_deref())?.rooted_at(&cwd);

    match cli.command.unwrap_or(Commands::Dev) {
        Commands::Run { tasks } => {
            let tasks = Task::parse_list(tasks.as_slice()).map_err(SiteError::from)?;
            run_tasks(config, &tasks).await
        }
        Commands::Build => {
            run_tasks(config, &AssetTask::ALL.map(Task::Asset)).await
        }
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
                config.validate()?;
            }
            run_tasks(config, &[Task::Server]).await
        }
        Commands::Watch => run_tasks(config, &[Task::Watch]).await,
        Commands::Dev => {
            let tasks = Task::parse_list(&["default"]).map_err(SiteError::from)?;
            run_tasks(config, &tasks).await
        }
        Commands::Terminal { page } => run_terminal(config, page.as_deref()).await,
        Commands::Version => print_version(config).await,
    }
}

/// Asset tasks first, in the given order; then the server and the watcher
/// side by side until shutdown.
async fn run_tasks(config: Config, tasks: &[Task]) -> Result<()> {
    let runner = TaskRunner::new(&config);

    for task in tasks {
        if let Task::Asset(asset) = task {
            output::task_started(*asset);
            match runner.run(*asset).await {
                Ok(report) => output::task_finished(&report),
                Err(e) => {
                    output::task_failed(*asset, &e);
                    return Err(SiteError::Pipeline(e).into());
                }
            }
        }
    }

    let serve = tasks.contains(&Task::Server);
    let watch = tasks.contains(&Task::Watch);
    if !serve && !watch {
        return Ok(());
    }

    let server = async {
        let listener = server::bind(&config.server).await?;
        output::server_started(&config.server.addr(), config.server.livereload);
        let router = server::router(&config.server, runner.reload_sender());
        server::serve(listener, router, crate::shutdown_requested()).await?;
        Ok::<(), SiteError>(())
    };

    let watcher = async {
        let watcher = SourceWatcher::new(runner.clone())?;
        output::watching(&config.pipeline.source_dir.display().to_string());
        watcher.run().await?;
        Ok::<(), SiteError>(())
    };

    tokio::select! {
        result = server, if serve => result?,
        result = watcher, if watch => result?,
        _ = crate::shutdown_requested() => {}
    }
    Ok(())
}

async fn print_version(config: Config) -> Result<()> {
    let label = VersionLabel::new(&config.terminal.version_placeholder);
    let service = VersionService::new(config.version, label, None).map_err(SiteError::from)?;
    let version = service.fetch().await.map_err(SiteError::from)?;
    println!("{}", version);
    Ok(())
}

fn load_page(config: &Config, page: Option<&Path>) -> Result<String> {
    let path = match page {
        Some(p) => p.to_path_buf(),
        None => config.pipeline.output_dir.join("index.html"),
    };
    if page.is_none() && !path.exists() {
        tracing::warn!(path = %path.display(), "no built page, starting without panels");
        return Ok(String::new());
    }
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read page {}", path.display()))
}

async fn run_terminal(config: Config, page: Option<&Path>) -> Result<()> {
    let html = load_page(&config, page)?;

    let mut panels = Vec::new();
    let mut panel_views = Vec::new();
    for source in discover_panels(&html) {
        let (view, handle) = HtmlSurface::shared();
        panel_views.push((source.id.clone(), view));
        panels.push((source, handle));
    }

    let terminal: SharedSurface = Arc::new(Mutex::new(ConsoleSurface::stdout()));
    let status: SharedSurface = Arc::new(Mutex::new(ConsoleSurface::new(std::io::stderr())));
    let (version_view, version_handle) = HtmlSurface::shared();

    let controller = PageController::new(
        &config,
        Surfaces {
            terminal,
            status,
            version: Some(version_handle),
        },
        Box::new(SystemClipboard),
    )
    .map_err(SiteError::from)?;
    let session = controller.init(panels);

    println!(
        "{} {}",
        "nodem".bright_green().bold(),
        "type use, install, about, copy, panels, version or quit".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = crate::shutdown_requested() => None,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "copy" => {
                // The status bar shows the outcome and clears itself
                let (result, _cleared) = controller.copy_install_command();
                if let Err(e) = result {
                    tracing::debug!(error = %e, "copy from terminal session failed");
                }
            }
            "version" => {
                let shown = version_view.lock().plain_text();
                println!("{}", if shown.is_empty() { controller.version() } else { shown });
            }
            "panels" => {
                for (id, view) in &panel_views {
                    let name = id.as_deref().unwrap_or("(panel)");
                    println!("{}\n{}", name.bright_blue(), view.lock().plain_text());
                }
            }
            keyword => {
                controller.dispatch(keyword);
            }
        }
    }

    session.version_fetch.abort();
    for panel in session.panels {
        panel.handle.abort();
    }
    Ok(())
}
