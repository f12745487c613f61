//! Tera rendering engine: the [`TemplateSource`] trait and [`TemplateEngine`].
//!
//! # Template directory layout
//!
//! | Location                     | Role                                          |
//! |------------------------------|-----------------------------------------------|
//! | `<root>/*.j2`                | renderable templates, named by file name      |
//! | `<root>/includes/**`         | partials, named relative to `includes/`       |
//!
//! A top-level template shadows a partial with the same name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use pilot_core::Vars;

use crate::context::to_tera_context;
use crate::error::RenderError;

/// Extension that marks a top-level file as a renderable template.
pub const TEMPLATE_EXTENSION: &str = "j2";

/// Subdirectory holding partials for `{% include %}` and `{% import %}`.
pub const INCLUDES_DIR: &str = "includes";

// ---------------------------------------------------------------------------
// TemplateSource
// ---------------------------------------------------------------------------

/// What the planner needs from a template engine.
pub trait TemplateSource {
    /// Names of every renderable template, sorted.
    fn list_templates(&self) -> Vec<String>;

    /// Render `name` with `vars`. Unresolved variables are an error.
    fn render(&self, name: &str, vars: &Vars) -> Result<String, RenderError>;
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_includes(root: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let dir = root.join(INCLUDES_DIR);
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_files(&dir, &mut files)?;
    let mut partials = Vec::with_capacity(files.len());
    for path in files {
        let rel = path.strip_prefix(&dir).unwrap_or(path.as_path());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        partials.push((normalize_template_name(rel), contents));
    }
    Ok(partials)
}

fn load_top_level(root: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let entries = std::fs::read_dir(root).map_err(|e| io_err(root, e))?;
    let mut templates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(root, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some(TEMPLATE_EXTENSION) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn to_owned_pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(name, body)| (name.to_string(), body.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera engine over a set of templates and partials. Load once and reuse.
pub struct TemplateEngine {
    root: Option<PathBuf>,
    tera: Tera,
    templates: Vec<String>,
}

impl TemplateEngine {
    /// Load every template and partial under `root`.
    ///
    /// Fails if `root` cannot be read or any file does not parse.
    pub fn from_dir(root: &Path) -> Result<Self, RenderError> {
        let partials = load_includes(root)?;
        let top_level = load_top_level(root)?;
        let mut engine = Self::build(top_level, partials)?;
        tracing::debug!(
            "loaded {} template(s) from {}",
            engine.templates.len(),
            root.display()
        );
        engine.root = Some(root.to_path_buf());
        Ok(engine)
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    ///
    /// `templates` are renderable; `partials` are only reachable through
    /// `{% include %}` and `{% import %}`.
    pub fn from_sources(
        templates: &[(&str, &str)],
        partials: &[(&str, &str)],
    ) -> Result<Self, RenderError> {
        Self::build(to_owned_pairs(templates), to_owned_pairs(partials))
    }

    fn build(
        top_level: Vec<(String, String)>,
        partials: Vec<(String, String)>,
    ) -> Result<Self, RenderError> {
        let mut sources: HashMap<String, String> = partials.into_iter().collect();
        let mut templates: Vec<String> = top_level.iter().map(|(name, _)| name.clone()).collect();
        templates.sort();
        for (name, content) in top_level {
            sources.insert(name, content);
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources.into_iter().collect::<Vec<_>>())?;
        Ok(TemplateEngine {
            root: None,
            tera,
            templates,
        })
    }

    /// Directory the engine was loaded from; `None` for in-memory engines.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

impl TemplateSource for TemplateEngine {
    fn list_templates(&self) -> Vec<String> {
        self.templates.clone()
    }

    fn render(&self, name: &str, vars: &Vars) -> Result<String, RenderError> {
        if !self.templates.iter().any(|t| t == name) {
            return Err(RenderError::UnknownTemplate(name.to_string()));
        }
        let ctx = to_tera_context(vars)?;
        Ok(self.tera.render(name, &ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
