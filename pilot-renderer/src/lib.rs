//! # pilot-renderer
//!
//! Tera-based template engine that renders repository files from a local
//! template directory and a flat variable mapping.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pilot_core::Vars;
//! use pilot_renderer::{TemplateEngine, TemplateSource};
//!
//! fn render_all(dir: &Path, vars: &Vars) {
//!     if let Ok(engine) = TemplateEngine::from_dir(dir) {
//!         for name in engine.list_templates() {
//!             if let Ok(content) = engine.render(&name, vars) {
//!                 println!("{name}: {} bytes", content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use engine::{TemplateEngine, TemplateSource, INCLUDES_DIR, TEMPLATE_EXTENSION};
pub use error::RenderError;
