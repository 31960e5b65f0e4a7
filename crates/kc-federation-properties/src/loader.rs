//! Properties file loader.
//!
//! Format, one entry per line:
//!
//! ```text
//! # comment
//! ! also a comment
//! alice=pw1
//! bob : pw2
//! carol pw3
//! dave
//! ```
//!
//! The key ends at the first `=`, `:` or whitespace. The value starts after
//! that separator and any surrounding whitespace, and is trimmed. A key with
//! no value maps to an empty secret. Lines with an empty key are skipped.
//! A repeated key overrides the earlier value.
//!
//! Backslash escapes, `\uXXXX` sequences and line continuations are not
//! interpreted; registry keys and secrets are taken literally.

use std::path::Path;

use kc_federation::ExternalRegistry;

use crate::error::{PropertiesError, PropertiesResult};
use crate::registry::PropertiesRegistry;

/// Splits one line into key and value.
///
/// Returns `None` for blank lines, comments, and lines that carry no entry.
#[must_use]
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let key_end = line
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let (key, rest) = line.split_at(key_end);
    if key.is_empty() {
        return None;
    }

    let rest = rest.trim_start();
    let value = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    Some((key, value.trim()))
}

/// Parses properties text into a registry.
#[must_use]
pub fn parse(input: &str) -> PropertiesRegistry {
    let mut registry = PropertiesRegistry::new();

    for (number, line) in input.lines().enumerate() {
        match parse_line(line) {
            Some((key, value)) => {
                if registry.insert(key, value) {
                    tracing::debug!(
                        line = number + 1,
                        key,
                        "Duplicate registry key overrides earlier entry"
                    );
                }
            }
            None => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with('!') {
                    tracing::warn!(line = number + 1, "Skipping registry line without a key");
                }
            }
        }
    }

    registry
}

/// Loads a registry file.
///
/// ## Errors
///
/// Returns `PropertiesError::Io` if the file cannot be read.
pub fn load(path: impl AsRef<Path>) -> PropertiesResult<PropertiesRegistry> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| PropertiesError::io(path, e))?;
    let registry = parse(&contents);

    tracing::info!(
        path = %path.display(),
        entries = registry.len(),
        "Loaded user registry"
    );
    Ok(registry)
}

/// Loads a registry file, falling back to an empty registry.
///
/// Read failures are logged and never returned.
#[must_use]
pub fn load_or_empty(path: impl AsRef<Path>) -> PropertiesRegistry {
    let path = path.as_ref();
    match load(path) {
        Ok(registry) => registry,
        Err(e) if e.is_missing_file() => {
            tracing::warn!(path = %path.display(), "Could not find user registry file");
            PropertiesRegistry::new()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load user registry file");
            PropertiesRegistry::new()
        }
    }
}
