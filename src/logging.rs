use crate::config::{DebugLogRotation, Settings};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "rankcheck-debug.log";

/// Prefix shared by Google API keys
const GOOGLE_KEY_PREFIX: &str = "AIza";

#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize debug logging.
///
/// When `debug` is enabled, logs are written to `~/.config/rankcheck/rankcheck-debug.log`
/// by default. When `debug` is disabled, this is a no-op.
pub fn init(settings: &Settings) -> Result<Option<LogGuard>> {
    if !settings.debug {
        return Ok(None);
    }

    let rotation = settings.debug_log_rotation.unwrap_or(DebugLogRotation::None);
    let base = resolve_base_log_path(settings.debug_log_path.as_deref())?;

    let (dir, base_name) = prepare_log_dir(&base)?;
    let (writer, guard): (NonBlocking, WorkerGuard) = match rotation {
        DebugLogRotation::None => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&base)
                .with_context(|| format!("Failed to open log file: {}", base.display()))?;

            tracing_appender::non_blocking(file)
        }
        DebugLogRotation::Daily => {
            // Prune before the appender opens today's file.
            cleanup_rotated_logs(&dir, &base_name, settings.debug_log_keep.unwrap_or(7))?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            tracing_appender::non_blocking(appender)
        }
    };

    // Default: debug our crate, warn for everything else.
    let filter = EnvFilter::try_new("rankcheck=debug,warn").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // If already initialized (e.g., in tests), don't crash.

    tracing::info!(log_file = %base.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn default_log_path() -> Result<PathBuf> {
    let config_path = crate::config::config_path()?;
    Ok(config_path.with_file_name(LOG_FILE_NAME))
}

fn resolve_base_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value else {
        return default_log_path();
    };

    let path = expand_tilde(raw);

    // A trailing separator or an existing directory means "put the log in here".
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }

    Ok(path)
}

/// `~/logs/x.log` -> `$HOME/logs/x.log`. Other paths are taken as is.
fn expand_tilde(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(raw),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Create the log file's directory and split the path into (dir, file name).
fn prepare_log_dir(path: &Path) -> Result<(PathBuf, String)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    Ok((dir, name))
}

/// Remove all but the `keep` newest daily files. `keep == 0` keeps everything.
fn cleanup_rotated_logs(dir: &Path, base_name: &str, keep: usize) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    // tracing_appender::rolling::daily uses: `{base_name}.{YYYY-MM-DD}`
    let prefix = format!("{base_name}.");

    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if name.starts_with(&prefix) {
            candidates.push(name.to_string());
        }
    }

    candidates.sort();
    candidates.reverse(); // newest first (dates sort lexicographically)

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Best-effort redaction for Google API keys (`AIza...`).
pub fn redact_secrets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find(GOOGLE_KEY_PREFIX) {
        let after = &rest[idx + GOOGLE_KEY_PREFIX.len()..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());

        out.push_str(&rest[..idx]);
        // Require a minimum length to reduce false positives.
        if key_len >= 8 {
            out.push_str("AIza***REDACTED***");
        } else {
            out.push_str(&rest[idx..idx + GOOGLE_KEY_PREFIX.len() + key_len]);
        }
        rest = &after[key_len..];
    }

    out.push_str(rest);
    out
}
