//! Configuration Management
//!
//! Loads site configuration from TOML files.
//! Configuration includes:
//! - Pipeline layout (source and destination directories)
//! - Dev server settings (host, port, live reload)
//! - Terminal effect timings and the version placeholder
//! - Version fetch endpoint
//! - Site content (install command, credits)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::SiteError;

/// File looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG_FILE: &str = "nodem-site.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

/// Where each asset task reads from and writes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Root of the generated site; task destinations are relative to it
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_styles_dest")]
    pub styles_dest: PathBuf,
    #[serde(default = "default_fonts_dest")]
    pub fonts_dest: PathBuf,
    #[serde(default = "default_images_dest")]
    pub images_dest: PathBuf,
    #[serde(default = "default_scripts_dest")]
    pub scripts_dest: PathBuf,
    /// Quiet period before a burst of file events triggers a rebuild
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            styles_dest: default_styles_dest(),
            fonts_dest: default_fonts_dest(),
            images_dest: default_images_dest(),
            scripts_dest: default_scripts_dest(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_output_dir")]
    pub root: PathBuf,
    #[serde(default = "default_true")]
    pub livereload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: default_output_dir(),
            livereload: true,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Timings of the typing effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Delay between two revealed characters
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Delay between session start and the first panel tick
    #[serde(default = "default_panel_delay_ms")]
    pub panel_delay_ms: u64,
    /// How long the status bar keeps its message
    #[serde(default = "default_status_clear_ms")]
    pub status_clear_ms: u64,
    #[serde(default = "default_version_placeholder")]
    pub version_placeholder: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            panel_delay_ms: default_panel_delay_ms(),
            status_clear_ms: default_status_clear_ms(),
            version_placeholder: default_version_placeholder(),
        }
    }
}

impl TerminalConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn panel_delay(&self) -> Duration {
        Duration::from_millis(self.panel_delay_ms)
    }

    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// CORS proxy wrapping the upstream page in a JSON envelope
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Page listing the release tags, passed to the proxy as `url`
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// CSS selector of the element holding the latest tag
    #[serde(default = "default_selector")]
    pub selector: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            upstream_url: default_upstream_url(),
            selector: default_selector(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Static content shared by templates and the terminal messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_install_command")]
    pub install_command: String,
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default = "default_developer")]
    pub developer: Credit,
    #[serde(default = "default_designer")]
    pub designer: Credit,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            install_command: default_install_command(),
            repository: default_repository(),
            developer: default_developer(),
            designer: default_designer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    pub url: String,
}

fn default_true() -> bool {
    true
}
fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_styles_dest() -> PathBuf {
    PathBuf::from("css")
}
fn default_fonts_dest() -> PathBuf {
    PathBuf::from("fonts")
}
fn default_images_dest() -> PathBuf {
    PathBuf::from("img")
}
fn default_scripts_dest() -> PathBuf {
    PathBuf::from("js")
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8081
}
fn default_tick_ms() -> u64 {
    20
}
fn default_panel_delay_ms() -> u64 {
    1000
}
fn default_status_clear_ms() -> u64 {
    2000
}
fn default_version_placeholder() -> String {
    "loading version...".to_string()
}
fn default_proxy_url() -> String {
    "https://api.allorigins.win/get".to_string()
}
fn default_upstream_url() -> String {
    "github.com/marcoT89/nodem/tags".to_string()
}
fn default_selector() -> String {
    ".commit-title".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_install_command() -> String {
    "wget -O - https://raw.githubusercontent.com/marcoT89/nodem/master/install.sh | bash"
        .to_string()
}
fn default_repository() -> String {
    "https://github.com/marcoT89/nodem".to_string()
}
fn default_developer() -> Credit {
    Credit {
        name: "marco tulio avila".to_string(),
        url: "https://github.com/marcoT89".to_string(),
    }
}
fn default_designer() -> Credit {
    Credit {
        name: "barreto".to_string(),
        url: "https://github.com/victoreduardobarreto".to_string(),
    }
}

fn parse(path: &Path, content: &str) -> std::result::Result<Config, SiteError> {
    toml::from_str(content)
        .map_err(|e| SiteError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    SiteError::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                parse(p, &content)?
            }
            None => {
                let mut default_paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
                if let Some(dir) = dirs::config_dir() {
                    default_paths.push(dir.join("nodem-site").join("config.toml"));
                }

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        tracing::debug!(path = %p.display(), "loading config");
                        loaded = Some(parse(p, &content)?);
                        break;
                    }
                }
                loaded.unwrap_or_else(|| {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                })
            }
        };

        // Override with environment variables
        if let Ok(port) = std::env::var("NODEM_SITE_PORT") {
            if let Ok(n) = port.parse::<u16>() {
                config.server.port = n;
            }
        }
        if let Ok(proxy) = std::env::var("NODEM_SITE_PROXY_URL") {
            config.version.proxy_url = proxy;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SiteError> {
        if self.terminal.tick_ms == 0 {
            return Err(SiteError::Config(
                "terminal.tick_ms must be greater than zero".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(SiteError::Config(
                "server.port must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.version.proxy_url).map_err(|e| {
            SiteError::Config(format!(
                "version.proxy_url '{}' is not a valid URL: {}",
                self.version.proxy_url, e
            ))
        })?;
        Ok(())
    }

    /// Rebase every relative path onto `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        rebase(&mut self.pipeline.source_dir);
        rebase(&mut self.pipeline.output_dir);
        rebase(&mut self.server.root);
        self
    }
}
