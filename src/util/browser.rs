//! Best-effort browser launching.

use std::process::{Command, Stdio};

use reqwest::Url;

use crate::error::ClaudebinError;

/// Launch command per platform identifier (`std::env::consts::OS`).
///
/// Entries are `(os, program, leading args)`; the URL is appended as its own
/// argument so it never passes through a shell.
const LAUNCHERS: &[(&str, &str, &[&str])] = &[
    ("macos", "open", &[]),
    ("windows", "cmd", &["/C", "start", ""]),
];

const FALLBACK_LAUNCHER: (&str, &[&str]) = ("xdg-open", &[]);

/// Parse `raw` and accept only absolute `http`/`https` URLs.
pub fn validate_url(raw: &str) -> Result<Url, ClaudebinError> {
    let url = Url::parse(raw).map_err(|_| ClaudebinError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(ClaudebinError::InvalidUrl(raw.to_string())),
    }
}

/// Resolve the launcher program and leading arguments for an OS identifier.
pub fn launcher_for(os: &str) -> (&'static str, &'static [&'static str]) {
    LAUNCHERS
        .iter()
        .find(|(name, _, _)| *name == os)
        .map(|(_, program, args)| (*program, *args))
        .unwrap_or(FALLBACK_LAUNCHER)
}

/// Validate `raw` and open it in the platform's default handler.
///
/// The launcher is spawned detached; only a failure to spawn is reported.
pub fn open_url(raw: &str) -> Result<(), ClaudebinError> {
    let url = validate_url(raw)?;
    let (program, args) = launcher_for(std::env::consts::OS);
    Command::new(program)
        .args(args)
        .arg(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Open `raw` if possible, logging instead of failing.
pub fn open_url_best_effort(raw: &str) {
    if let Err(e) = open_url(raw) {
        tracing::warn!(url = raw, error = %e, "Could not open browser");
    }
}
