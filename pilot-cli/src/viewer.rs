//! Line-based interactive approval.
//!
//! Lists every change, lets the user toggle individual diffs by number and
//! asks for a single yes/no answer for the whole batch.

use std::io::{BufRead, Write};

use colored::Colorize;

use pilot_sync::diff::tuple_diff;
use pilot_sync::{DiffTuple, DiffViewer};

use crate::output::{change_label, colorize_diff, target};

pub struct TerminalDiffViewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalDiffViewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, diffs: &[DiffTuple], shown: &[bool]) -> std::io::Result<()> {
        writeln!(self.output, "{}", "Planned changes".cyan().bold())?;
        for (idx, tuple) in diffs.iter().enumerate() {
            let status = if !tuple.has_content() {
                "(no content)".bright_black().to_string()
            } else if shown[idx] {
                "(shown)".green().to_string()
            } else {
                "(hidden)".red().to_string()
            };
            writeln!(
                self.output,
                "{:>3}. {} [{}] {status}",
                idx + 1,
                target(tuple),
                change_label(tuple.operation)
            )?;
            if shown[idx] && tuple.has_content() {
                write!(self.output, "{}", colorize_diff(&tuple_diff(tuple)))?;
            }
        }
        write!(
            self.output,
            "\nApply these changes? [y/n, or a number to toggle its diff]: "
        )?;
        self.output.flush()
    }

    fn ask(&mut self, diffs: &[DiffTuple]) -> std::io::Result<bool> {
        let mut shown = vec![false; diffs.len()];
        loop {
            self.render(diffs, &shown)?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }
            let answer = line.trim().to_ascii_lowercase();
            match answer.as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=diffs.len()).contains(&n) => {
                        if diffs[n - 1].has_content() {
                            shown[n - 1] = !shown[n - 1];
                        }
                    }
                    _ => writeln!(self.output, "Please answer y, n or a change number.")?,
                },
            }
        }
    }
}

impl<R: BufRead, W: Write> DiffViewer for TerminalDiffViewer<R, W> {
    fn show(&mut self, diffs: &[DiffTuple]) -> bool {
        match self.ask(diffs) {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("approval prompt failed: {err}");
                false
            }
        }
    }
}
