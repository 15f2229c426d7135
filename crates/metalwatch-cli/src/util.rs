use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use metalwatch_analysis::limits::ReferenceLimits;
use serde::Serialize;

/// Report format for subcommands that print results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned plain-text tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Destination of a report: stdout, or a file given by `--output`.
#[derive(Debug)]
pub(crate) enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout(_) => f.write_str("stdout"),
            Output::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

impl Output {
    pub(crate) fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout(io::stdout().lock()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    /// Writes `value` as pretty JSON, or as text through `write_text`.
    pub(crate) fn write_report<T, F>(
        mut self,
        format: OutputFormat,
        value: &T,
        write_text: F,
    ) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self, value)
                    .with_context(|| format!("Failed to write JSON to {self}"))?;
                writeln!(self).with_context(|| format!("Failed to write to {self}"))?;
            }
            OutputFormat::Text => {
                write_text(&mut self).with_context(|| format!("Failed to write report to {self}"))?;
            }
        }
        self.flush()
            .with_context(|| format!("Failed to flush output to {self}"))?;
        if let Output::File { path, .. } = &self {
            log::info!("wrote {}", path.display());
        }
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads the reference-limit catalog, or returns the built-in limits.
pub(crate) fn load_limits(path: Option<&Path>) -> anyhow::Result<ReferenceLimits> {
    let Some(path) = path else {
        return Ok(ReferenceLimits::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open reference limits: {}", path.display()))?;
    let limits: ReferenceLimits = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse reference limits: {}", path.display()))?;
    log::info!(
        "loaded {} reference limits from {}",
        limits.limits.len(),
        path.display()
    );
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use std::env;

    use metalwatch_analysis::metal::Metal;

    use super::*;

    #[test]
    fn test_default_limits_without_file() {
        assert_eq!(load_limits(None).unwrap(), ReferenceLimits::default());
    }

    #[test]
    fn test_load_limits_file() {
        let path = env::temp_dir().join(format!("metalwatch-limits-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"limits": {"arsenic-total": {"value": 0.05, "source": "local"}}}"#,
        )
        .unwrap();
        let limits = load_limits(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(limits.get(Metal::ArsenicTotal), Some(0.05));
        assert_eq!(limits.get(Metal::IronDissolved), None);
    }
}
