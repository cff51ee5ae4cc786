//! Module version inference from the working tree.
//!
//! The version component of every global symbol minted for the module
//! under index comes from here; third-party packages get theirs from the
//! module graph instead. Preference order:
//!
//! 1. the first tag pointing at `HEAD` (in `git tag -l` listing order)
//!    that parses as semver;
//! 2. otherwise, any tag pointing at `HEAD`;
//! 3. otherwise, the 12-character prefix of the `HEAD` commit hash.

use std::path::Path;
use std::process::Command;

use semver::Version;
use thiserror::Error;

/// Version inference failures. The detail string carries git's stderr.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("failed to list tags for the current commit: {detail}")]
    Tags { detail: String },

    #[error("failed to resolve the current commit: {detail}")]
    Head { detail: String },
}

/// Infer the version of the module rooted at `dir`.
pub fn infer_module_version(dir: &Path) -> Result<String, VersionError> {
    let tags = run_git(dir, &["tag", "-l", "--points-at", "HEAD"])
        .map_err(|detail| VersionError::Tags { detail })?;
    let tags: Vec<&str> = tags.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    for tag in &tags {
        if Version::parse(tag.trim_start_matches('v')).is_ok() {
            return Ok(tag.to_string());
        }
    }

    // None of the tags parse as a version; still prefer a tag over a
    // bare commit hash.
    if let Some(tag) = tags.first() {
        return Ok(tag.to_string());
    }

    let commit = run_git(dir, &["rev-parse", "HEAD"])
        .map_err(|detail| VersionError::Head { detail })?;
    Ok(commit.trim().chars().take(12).collect())
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|err| format!("failed to run git: {err}"))?;

    if !output.status.success() {
        return Err(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
