//! The asset task bodies. Each one reads a source directory, applies one
//! transform and returns the files it wrote.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::minify::minify_js;
use crate::config::SiteConfig;
use crate::errors::PipelineError;

/// Extension of page templates; partials start with `_`.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Variables visible to page templates.
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
    pub site: &'a SiteConfig,
    pub version_placeholder: &'a str,
    pub livereload: bool,
}

/// Regular files directly under `dir` whose name matches `pattern`, sorted.
/// A missing directory has no files.
pub fn list_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let full = dir.join(pattern);
    let full = full.to_string_lossy();
    let entries = glob::glob(&full).map_err(|e| PipelineError::Pattern {
        pattern: full.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            PipelineError::io(path, e.into_error())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|e| PipelineError::io(path, e))?;
    trace!(path = %path.display(), bytes = contents.len(), "wrote");
    Ok(())
}

fn output_name(path: &Path) -> Result<&std::ffi::OsStr, PipelineError> {
    path.file_name().ok_or_else(|| PipelineError::Pattern {
        pattern: path.display().to_string(),
        message: "matched a path without a file name".to_string(),
    })
}

/// Compile `entry` to compressed CSS as `<dest>/<stem>.css`.
pub fn compile_styles(entry: &Path, dest: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !entry.is_file() {
        debug!(path = %entry.display(), "no stylesheet entry, skipping");
        return Ok(Vec::new());
    }

    let options = grass::Options::default().style(grass::OutputStyle::Compressed);
    let css = grass::from_path(entry, &options).map_err(|e| PipelineError::Styles {
        path: entry.to_path_buf(),
        message: e.to_string(),
    })?;

    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string());
    ensure_dir(dest)?;
    let target = dest.join(format!("{}.css", stem));
    write_file(&target, css.as_bytes())?;
    Ok(vec![target])
}

/// Copy every file directly under `source` into `dest`.
pub fn copy_files(source: &Path, dest: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let files = list_files(source, "*")?;
    if files.is_empty() {
        return Ok(Vec::new());
    }

    ensure_dir(dest)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = dest.join(output_name(&file)?);
        fs::copy(&file, &target).map_err(|e| PipelineError::io(&file, e))?;
        written.push(target);
    }
    Ok(written)
}

/// Render each page template in `templates` into `dest`. Partials can be
/// included or extended by pages but are not written.
pub fn render_templates(
    templates: &Path,
    dest: &Path,
    context: &TemplateContext<'_>,
) -> Result<Vec<PathBuf>, PipelineError> {
    let pages: Vec<PathBuf> = list_files(templates, &format!("*.{}", TEMPLATE_EXTENSION))?
        .into_iter()
        .filter(|p| !is_partial(p))
        .collect();
    if pages.is_empty() {
        return Ok(Vec::new());
    }

    let mut env = minijinja::Environment::new();
    env.set_loader(minijinja::path_loader(templates));

    ensure_dir(dest)?;
    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let name = output_name(&page)?.to_string_lossy().into_owned();
        let template_error = |e: minijinja::Error| PipelineError::Template {
            name: name.clone(),
            message: e.to_string(),
        };
        let rendered = env
            .get_template(&name)
            .and_then(|t| t.render(context))
            .map_err(template_error)?;

        let target = dest.join(&name);
        write_file(&target, rendered.as_bytes())?;
        written.push(target);
    }
    Ok(written)
}

/// Minify each `*.js` directly under `source` into `dest`.
pub fn minify_scripts(source: &Path, dest: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let scripts = list_files(source, "*.js")?;
    if scripts.is_empty() {
        return Ok(Vec::new());
    }

    ensure_dir(dest)?;
    let mut written = Vec::with_capacity(scripts.len());
    for script in scripts {
        let code = fs::read_to_string(&script).map_err(|e| PipelineError::io(&script, e))?;
        let target = dest.join(output_name(&script)?);
        write_file(&target, minify_js(&code).as_bytes())?;
        written.push(target);
    }
    Ok(written)
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}
