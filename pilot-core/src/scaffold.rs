//! Example template tree written by `git-pilot init`.
//!
//! # Layout
//!
//! ```text
//! <template_dir>/
//!   example.yml.j2
//!   override-example.yml.j2
//!   values.yml
//!   includes/
//!     units/hello-world.j2
//! ```
//!
//! Existing files are never overwritten.

use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};

const EXAMPLE_TEMPLATE: &str = r#"name: {{ ci_name }}

on:
  push:
    branches:
      - "{{ env }}"

jobs:
  {{ job_id }}:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout repo
        uses: actions/checkout@v4
{% include "units/hello-world.j2" %}
"#;

const OVERRIDE_TEMPLATE: &str = r#"name: {{ ci_name }}

on:
  push:
    branches:
      - "{{ env }}"

jobs:
  {{ job_id }}:
    runs-on: ubuntu-latest
    steps:
      - name: Hello from {{ env }}!
        run: echo "Hello, {{ job_id }}!"
        env:
          SUPER_SECRET: {% raw %}${{ secrets.SuperSecret }}{% endraw %}
"#;

const HELLO_WORLD_UNIT: &str = r#"      - name: Hello World
        run: echo "Hello, World from job {{ job_id | upper }}!"
"#;

const VALUES: &str = r#"defaults:
  branch: dev
  message: "git-pilot: update CI workflow"
  path: ".github/workflows"
  vars:
    ci_name: scan
  templates:
    - ".*\\.j2"

repos:
  - name: your-org/first-repo
    vars:
      job_id: container_scan
      env: test

  - name: your-org/second-repo
    branch: main
    message: "git-pilot: update CI workflow (override)"
    path: ".github/workflows/git-pilot/"
    vars:
      job_id: sast_scan
      env: stage
    templates:
      - "override.*\\.j2"
"#;

/// Write the example structure under `root`.
///
/// Returns the paths that were created; files already present are skipped.
pub fn write_example_structure(root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let files: [(PathBuf, &str); 4] = [
        (root.join("example.yml.j2"), EXAMPLE_TEMPLATE),
        (root.join("override-example.yml.j2"), OVERRIDE_TEMPLATE),
        (
            root.join("includes").join("units").join("hello-world.j2"),
            HELLO_WORLD_UNIT,
        ),
        (root.join("values.yml"), VALUES),
    ];

    let mut written = Vec::new();
    for (path, content) in files {
        if path.exists() {
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&path, content).map_err(|e| io_err(&path, e))?;
        written.push(path);
    }
    Ok(written)
}
