use anyhow::{Context, Result};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Render a path relative to `base` when possible, absolute otherwise.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

/// Join path components with `/` regardless of platform.
///
/// Library-relative document ids use `/` so category grouping and report
/// rows are stable across operating systems.
pub fn rel_unix_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Current epoch time in milliseconds for report timestamps.
pub fn now_epoch_ms() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis())
}

/// Round to one decimal place, the precision used for all scores.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
