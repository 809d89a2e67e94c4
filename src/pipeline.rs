//! Build, test, strip, and report pipeline.
//!
//! `Build -> (fail -> abort) -> Test -> (fail -> abort) ->
//! [Strip -> (fail -> warn, continue)] -> Report -> Done`. No stage is ever
//! retried; build and test failures abort the process, everything after a
//! validated build degrades to warnings.

use crate::cli::{OutputManager, RuntimeConfig, StripPolicy};
use crate::error::{BuildError, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Cargo feature selection for the release build.
const BUILD_FEATURES: &str = "pcre2";

/// Performance-oriented compile flags passed via the environment.
const BUILD_RUSTFLAGS: &str = "-C target-cpu=native";

/// Strip invocations in the order they are attempted: the platform-specific
/// form first, then the generic fallback.
#[cfg(target_os = "macos")]
const STRIP_ATTEMPTS: [&[&str]; 2] = [&["-x"], &[]];
#[cfg(not(target_os = "macos"))]
const STRIP_ATTEMPTS: [&[&str]; 2] = [&["--strip-debug"], &[]];

/// Run the full pipeline against the configured checkout.
pub async fn run(config: &RuntimeConfig) -> Result<()> {
    let output = config.output();

    output.section("Build")?;
    build(config).await?;

    output.section("Test")?;
    test(config).await?;

    if config.strip == StripPolicy::Strip {
        output.section("Strip")?;
        strip(&config.target_binary, output).await;
    }

    output.section("Report")?;
    report(&config.target_binary, output).await;

    Ok(())
}

/// `cargo build --release` with the fixed feature set and compile flags,
/// streaming cargo's own output. Build failure is fatal.
async fn build(config: &RuntimeConfig) -> Result<()> {
    let status = Command::new("cargo")
        .args(["build", "--release", "--features", BUILD_FEATURES])
        .env("RUSTFLAGS", BUILD_RUSTFLAGS)
        .current_dir(&config.checkout_dir)
        .stdin(Stdio::null())
        .status()
        .await?;

    if !status.success() {
        return Err(BuildError::BuildFailed {
            status: status.to_string(),
        }
        .into());
    }

    if !config.target_binary.is_file() {
        return Err(BuildError::TargetMissing {
            path: config.target_binary.clone(),
        }
        .into());
    }

    config.output().success("Build succeeded")?;
    Ok(())
}

/// `cargo test --all`. A failing suite is fatal; a half-validated executable
/// is never left in place silently.
async fn test(config: &RuntimeConfig) -> Result<()> {
    let status = Command::new("cargo")
        .args(["test", "--all"])
        .current_dir(&config.checkout_dir)
        .stdin(Stdio::null())
        .status()
        .await?;

    if !status.success() {
        return Err(BuildError::TestsFailed {
            status: status.to_string(),
        }
        .into());
    }

    config.output().success("Tests passed")?;
    Ok(())
}

/// Remove debug symbols from the built executable. Every failure in here is
/// a warning, never an abort: the executable is already built and tested.
async fn strip(binary: &Path, output: &OutputManager) {
    strip_with(Path::new("strip"), binary, output).await;
}

/// Strip implementation with the program parameterized so tests can drive
/// the fallback behavior with a scripted stand-in. Returns whether any
/// invocation succeeded.
async fn strip_with(program: &Path, binary: &Path, output: &OutputManager) -> bool {
    match listing(binary) {
        Ok(before) => {
            let _ = output.detail(&format!("before: {before}"));
        }
        Err(e) => {
            let _ = output.warn(&format!("could not stat executable before strip: {e}"));
        }
    }

    let mut stripped = false;
    for args in STRIP_ATTEMPTS {
        let result = Command::new(program)
            .args(args)
            .arg(binary)
            .stdin(Stdio::null())
            .status()
            .await;
        match result {
            Ok(status) if status.success() => {
                stripped = true;
                break;
            }
            Ok(status) => {
                log::debug!("strip {args:?} failed with {status}, trying next form");
            }
            Err(e) => {
                log::debug!("strip {args:?} could not run: {e}");
            }
        }
    }

    if !stripped {
        let _ = output.warn("all strip invocations failed; keeping debug symbols");
    }

    // The exec bit must survive stripping no matter which invocation ran.
    if let Err(e) = restore_exec_bit(binary) {
        let _ = output.warn(&format!("could not restore executable bit: {e}"));
    }

    if stripped {
        let _ = output.success("Stripped debug symbols");
    }
    match listing(binary) {
        Ok(after) => {
            let _ = output.detail(&format!("after:  {after}"));
        }
        Err(e) => {
            let _ = output.warn(&format!("could not stat executable after strip: {e}"));
        }
    }

    stripped
}

/// Report the executable's content checksum and self-reported version.
/// Failures here are cosmetic and never abort.
async fn report(binary: &Path, output: &OutputManager) {
    match checksum(binary).await {
        Ok(digest) => {
            let _ = output.println(&format!("sha256  {digest}"));
        }
        Err(e) => {
            let _ = output.warn(&format!("could not checksum executable: {e}"));
        }
    }

    match probe_version(binary).await {
        Ok(version) => {
            let _ = output.println(&format!("version {version}"));
        }
        Err(e) => {
            let _ = output.warn(&format!("could not query executable version: {e}"));
        }
    }

    match listing(binary) {
        Ok(line) => {
            let _ = output.println(&format!("file    {line}"));
        }
        Err(e) => {
            let _ = output.warn(&format!("could not stat executable: {e}"));
        }
    }
}

/// One-line file listing: size, mode, path.
fn listing(path: &Path) -> std::io::Result<String> {
    let meta = std::fs::metadata(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(format!(
            "{} bytes  mode {:o}  {}",
            meta.len(),
            meta.permissions().mode() & 0o7777,
            path.display()
        ))
    }
    #[cfg(not(unix))]
    {
        Ok(format!("{} bytes  {}", meta.len(), path.display()))
    }
}

/// Ensure the file is executable by owner/group/other again.
fn restore_exec_bit(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let meta = std::fs::metadata(path)?;
        let mut perms = meta.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// SHA-256 of the file's contents, hex-encoded.
async fn checksum(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// First line of `<binary> --version`.
async fn probe_version(path: &Path) -> Result<String> {
    let out = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await?;
    let text = String::from_utf8_lossy(&out.stdout);
    Ok(first_line(&text).to_string())
}

/// First non-empty line of a command's output, trimmed.
fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn strip_attempts_are_platform_specific_then_generic() {
        assert_eq!(STRIP_ATTEMPTS.len(), 2);
        assert!(
            !STRIP_ATTEMPTS[0].is_empty(),
            "first attempt carries platform flags"
        );
        assert!(
            STRIP_ATTEMPTS[1].is_empty(),
            "fallback is the bare generic invocation"
        );
    }

    /// Write a scripted stand-in for the strip utility that logs the number
    /// of arguments of every call to `log`, then runs `body`.
    #[cfg(unix)]
    fn scripted_strip(dir: &std::path::Path, log: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("strip-stand-in");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho \"$#\" >> {}\n{body}\n", log.display()),
        )
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[cfg(unix)]
    fn non_executable_binary(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let binary = dir.join("built-binary");
        std::fs::write(&binary, b"payload").unwrap();
        let mut perms = std::fs::metadata(&binary).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(&binary, perms).unwrap();
        binary
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn strip_falls_back_to_generic_invocation_when_platform_form_fails() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("calls.log");
        // Fails whenever a flag is passed (two args: flag + binary),
        // succeeds on the bare invocation (binary only).
        let script = scripted_strip(dir.path(), &log, "[ \"$#\" -eq 1 ] || exit 1\nexit 0");
        let binary = non_executable_binary(dir.path());

        let output = OutputManager::new(0);
        let stripped = strip_with(&script, &binary, &output).await;
        assert!(stripped, "bare fallback invocation must succeed");

        let calls = std::fs::read_to_string(&log).unwrap();
        let arg_counts: Vec<&str> = calls.lines().collect();
        assert_eq!(
            arg_counts,
            ["2", "1"],
            "platform-specific form first, then the generic fallback"
        );

        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111, "exec bit restored after stripping");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn strip_degrades_to_warning_when_every_invocation_fails() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("calls.log");
        let script = scripted_strip(dir.path(), &log, "exit 1");
        let binary = non_executable_binary(dir.path());

        let output = OutputManager::new(0);
        let stripped = strip_with(&script, &binary, &output).await;
        assert!(!stripped);

        // Both forms were tried before giving up.
        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(calls.lines().count(), 2);

        // The binary is untouched but usable either way.
        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[tokio::test]
    async fn checksum_matches_known_digest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let digest = checksum(file.path()).await.unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[cfg(unix)]
    #[test]
    fn exec_bit_restored_on_plain_file() {
        use std::os::unix::fs::PermissionsExt;

        let file = NamedTempFile::new().unwrap();
        let mut perms = std::fs::metadata(file.path()).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        restore_exec_bit(file.path()).unwrap();
        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn listing_includes_size_and_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        let line = listing(file.path()).unwrap();
        assert!(line.contains("10 bytes"));
        assert!(line.contains(&file.path().display().to_string()));
    }

    #[test]
    fn first_line_skips_blank_lines() {
        assert_eq!(first_line("\nrg 14.1.0\nextra"), "rg 14.1.0");
        assert_eq!(first_line(""), "");
    }
}
