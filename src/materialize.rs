use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::{Builder, TempDir};

use crate::language::LanguageSpec;

/// Appended to python submissions that never print, so a program that runs
/// to completion silently is distinguishable from one that failed.
pub const PYTHON_SILENT_SENTINEL: &str = "⚠ No print statement found, only function defined.";

/// A submitted program written to disk for one execution attempt.
///
/// The backing directory is exclusive to this attempt; dropping the value
/// removes the source file and any build artifacts the toolchain placed
/// next to it, on every path including timeout.
#[derive(Debug)]
pub struct MaterializedSource {
    #[allow(dead_code)] // held for its Drop
    dir: TempDir,
    path: PathBuf,
    language_id: String,
}

impl MaterializedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }
}

/// Writes the source text to a uniquely named file with the registry
/// extension, inside a fresh per-request temporary directory.
pub fn materialize(spec: &LanguageSpec, source_text: &str) -> Result<MaterializedSource> {
    let dir = Builder::new()
        .prefix("coderun-")
        .tempdir()
        .context("Failed to create execution directory")?;

    let (mut file, path) = Builder::new()
        .prefix("snippet-")
        .suffix(&format!(".{}", spec.extension))
        .tempfile_in(dir.path())
        .context("Failed to create source file")?
        .keep()
        .context("Failed to persist source file")?;

    let text = apply_source_transforms(spec, source_text);
    file.write_all(text.as_bytes())
        .context("Failed to write source file")?;

    Ok(MaterializedSource {
        dir,
        path,
        language_id: spec.id.to_string(),
    })
}

/// Language-specific source rewrites. Only python gets one: a deliberate
/// usability heuristic, not a general transformation.
fn apply_source_transforms(spec: &LanguageSpec, source_text: &str) -> String {
    if spec.id == "python" && !source_text.contains("print(") {
        return format!("{source_text}\n\nprint('{PYTHON_SILENT_SENTINEL}')\n");
    }
    format!("{source_text}\n")
}
