//! Hands the message handle to later workflow steps.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub(crate) const MESSAGE_ID_OUTPUT_NAME: &str = "SLACK_MESSAGE_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputSink {
    /// Appends `name=value` lines to the `GITHUB_OUTPUT` file.
    File(PathBuf),
    /// Prints the legacy `::set-output` workflow command.
    Stdout,
}

impl OutputSink {
    pub(crate) fn from_path(path: Option<PathBuf>) -> Self {
        match path.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => Self::File(path),
            None => Self::Stdout,
        }
    }

    pub(crate) fn write_output(&self, name: &str, value: &str) -> Result<()> {
        match self {
            Self::File(path) => append_output_line(path, name, value),
            Self::Stdout => {
                println!("{}", render_set_output_command(name, value));
                Ok(())
            }
        }
    }
}

fn append_output_line(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{name}={value}")
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn render_set_output_command(name: &str, value: &str) -> String {
    format!("::set-output name={name}::{value}")
}
