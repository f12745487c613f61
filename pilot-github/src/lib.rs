//! # pilot-github
//!
//! GitHub provider for git-pilot. Files are read and written one at a time
//! through the repository contents API; each write is its own commit.

mod contents;
pub mod provider;

pub use provider::{GitHubProvider, DEFAULT_API_URL};
