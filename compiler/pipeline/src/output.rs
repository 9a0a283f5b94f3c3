//! Writing generated output to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use codegen::GeneratedUnit;
use tracing::{debug, warn};

/// The product of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Generated Rust source
    Rust(GeneratedUnit),
    /// The selected module, re-encoded in the wire format
    Json {
        /// Package name, used as the file stem
        package: String,
        /// Encoded bytes
        bytes: Vec<u8>,
    },
}

impl Output {
    /// Package name, used as the file stem.
    pub fn package(&self) -> &str {
        match self {
            Output::Rust(unit) => &unit.package,
            Output::Json { package, .. } => package,
        }
    }

    /// File extension for this output.
    pub fn extension(&self) -> &'static str {
        match self {
            Output::Rust(_) => "rs",
            Output::Json { .. } => "json",
        }
    }

    /// File name this output is written to.
    pub fn file_name(&self) -> String { format!("{}.{}", self.package(), self.extension()) }
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<&str> = src.lines().map(str::trim_end).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

/// Formats a Rust source file in place using `rustfmt`.
///
/// A missing or failing `rustfmt` leaves the file as written.
pub fn format_with_rustfmt(path: &Path) {
    match Command::new("rustfmt").arg("--edition=2021").arg(path).status() {
        Ok(status) if status.success() => debug!(path = %path.display(), "formatted"),
        Ok(status) => warn!(path = %path.display(), %status, "rustfmt failed"),
        Err(e) => warn!(path = %path.display(), error = %e, "rustfmt unavailable"),
    }
}

/// Persist `output` as `<package>.rs` or `<package>.json` under `out_dir`,
/// creating the directory if needed.
///
/// Rust source is cleaned of trailing whitespace and, when `rustfmt` is set,
/// formatted. JSON is written byte for byte with a final newline.
pub fn write_output<P: AsRef<Path>>(
    out_dir: P,
    output: &Output,
    rustfmt: bool,
) -> std::io::Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(output.file_name());

    match output {
        Output::Rust(unit) => {
            fs::write(&path, clean_generated_source(&unit.source))?;
            if rustfmt {
                format_with_rustfmt(&path);
            }
        }
        Output::Json { bytes, .. } => {
            let mut contents = bytes.clone();
            if contents.last() != Some(&b'\n') {
                contents.push(b'\n');
            }
            fs::write(&path, contents)?;
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_generated_source() {
        assert_eq!(clean_generated_source("a  \nb\t\n\n\n"), "a\nb\n");
        assert_eq!(clean_generated_source("\n \n"), "");
    }
}
