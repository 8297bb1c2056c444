use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

/// `<output stem>.provenance.json`: what produced a runner output.
#[derive(Serialize)]
pub struct Sidecar<P: Serialize> {
    code_rev: String,
    polyanya_version: &'static str,
    callsite: Callsite,
    params: P,
    /// Small digest of the output (row counts, paths found).
    summary: Value,
    output: String,
}

impl<P: Serialize> Sidecar<P> {
    #[track_caller]
    pub fn new(output: &Path, params: P, summary: Value) -> Self {
        let callsite = Location::caller();
        Self {
            code_rev: code_rev(),
            polyanya_version: polyanya::VERSION,
            callsite: Callsite {
                file: callsite.file(),
                line: callsite.line(),
            },
            params,
            summary,
            output: output.display().to_string(),
        }
    }

    /// Writes the sidecar next to the output and returns its path.
    pub fn write(&self) -> Result<PathBuf> {
        let path = sidecar_path(Path::new(&self.output));
        fs::write(&path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.file_stem().unwrap_or(output.as_os_str()).to_os_string();
    name.push(".provenance.json");
    output.with_file_name(name)
}

/// `GIT_COMMIT` at build time, else at run time, else `unknown`.
fn code_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
