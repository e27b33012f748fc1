//! Best-effort persistence of intermediate composites for inspection.
//!
//! Nothing here can fail the caller: write errors are logged at warn
//! level and dropped. Inside a tokio runtime the write runs on the
//! blocking pool and the caller does not wait for it.

use std::path::{Path, PathBuf};

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_DEBUG_DIR: &str = "tmp/v3-debug";

/// Destination for debug artifacts.
pub trait DebugSink: Send + Sync {
    /// Persist `png` under `filename`. Must not panic or block on failure.
    fn try_save(&self, png: &[u8], filename: &str);
}

/// File name for a composite artifact: `<kind>-composite-<generation id>.png`.
///
/// Characters outside `[A-Za-z0-9._-]` in the generation id become `_`,
/// so the name is always a single path component.
pub fn artifact_name(kind: &str, generation_id: &str) -> String {
    let id: String = generation_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{kind}-composite-{id}.png")
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn try_save(&self, _png: &[u8], _filename: &str) {}
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
}

impl ScratchDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new(DEFAULT_DEBUG_DIR)
    }
}

impl DebugSink for ScratchDir {
    fn try_save(&self, png: &[u8], filename: &str) {
        let dir = self.dir.clone();
        let png = png.to_vec();
        let filename = filename.to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || save(&dir, &png, &filename));
            }
            Err(_) => save(&dir, &png, &filename),
        }
    }
}

fn save(dir: &Path, png: &[u8], filename: &str) {
    match write(dir, png, filename) {
        Ok(path) => tracing::debug!(path = %path.display(), bytes = png.len(), "saved debug artifact"),
        Err(err) => tracing::warn!(
            dir = %dir.display(),
            filename,
            error = %err,
            "failed to save debug artifact; continuing"
        ),
    }
}

fn write(dir: &Path, png: &[u8], filename: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, png)?;
    Ok(path)
}
