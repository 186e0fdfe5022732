use std::path::PathBuf;
use thiserror::Error;

/// The central error type for nodem-site.
///
/// Library code returns the specific enums below; the CLI layer carries them
/// inside `anyhow::Error` and maps them back to exit codes with
/// [`get_exit_code`].
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown task '{name}'")]
    UnknownTask { name: String },

    #[error("Invalid source pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile styles {path}: {message}")]
    Styles { path: PathBuf, message: String },

    #[error("Failed to render template {name}: {message}")]
    Template { name: String, message: String },

    #[error("Watcher failed: {0}")]
    Watch(String),

    #[error("Task {task} did not complete: {message}")]
    Aborted { task: String, message: String },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Invalid proxy URL: {0}")]
    InvalidUrl(String),

    #[error("Version request timed out")]
    Timeout,

    #[error("Version endpoint returned status {status}")]
    HttpStatus { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse version payload: {0}")]
    Parse(String),

    #[error("No element matching '{selector}' in version payload")]
    MissingElement { selector: String },
}

impl From<reqwest::Error> for VersionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VersionError::Timeout
        } else if let Some(status) = err.status() {
            VersionError::HttpStatus {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            VersionError::Parse(err.to_string())
        } else {
            VersionError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server stopped unexpectedly: {0}")]
    Serve(String),
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard not available: {0}")]
    Unavailable(String),

    #[error("Failed to write clipboard: {0}")]
    SetFailed(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_PIPELINE_ERROR: u8 = 3;
pub const EXIT_VERSION_ERROR: u8 = 4;
pub const EXIT_SERVER_ERROR: u8 = 5;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(site_err) = e.downcast_ref::<SiteError>() {
        return match site_err {
            SiteError::Config(_) => EXIT_CONFIG_ERROR,
            SiteError::Pipeline(_) => EXIT_PIPELINE_ERROR,
            SiteError::Version(_) => EXIT_VERSION_ERROR,
            SiteError::Server(_) => EXIT_SERVER_ERROR,
            _ => EXIT_ERROR,
        };
    }

    if e.downcast_ref::<PipelineError>().is_some() {
        return EXIT_PIPELINE_ERROR;
    }
    if e.downcast_ref::<VersionError>().is_some() {
        return EXIT_VERSION_ERROR;
    }
    if e.downcast_ref::<ServerError>().is_some() {
        return EXIT_SERVER_ERROR;
    }

    EXIT_ERROR
}
