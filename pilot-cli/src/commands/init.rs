//! `git-pilot init --template-dir <dir>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pilot_core::scaffold::write_example_structure;

/// Write an example template directory.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the example templates and values.yml in.
    #[arg(long)]
    pub template_dir: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let written = write_example_structure(&self.template_dir).with_context(|| {
            format!(
                "failed to write example templates to '{}'",
                self.template_dir.display()
            )
        })?;

        if written.is_empty() {
            println!(
                "✓ '{}' already contains the example files, nothing written",
                self.template_dir.display()
            );
            return Ok(());
        }

        println!("✓ Template scaffold created at '{}'", self.template_dir.display());
        for path in &written {
            println!("  +  {}", path.display());
        }
        Ok(())
    }
}
