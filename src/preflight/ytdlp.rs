//! Download tool preflight check.

use super::CheckResult;
use crate::services::ytdlp;

/// Check if the download tool is installed.
pub fn check(program: &str) -> CheckResult {
    if ytdlp::is_installed(program) {
        match ytdlp::get_version(program) {
            Ok(version) => CheckResult::ok(program, &format!("installed ({})", version)),
            Err(_) => CheckResult::ok(program, "installed"),
        }
    } else {
        CheckResult::fail(
            program,
            "not found",
            "Install yt-dlp: pip install -U yt-dlp (or set [tool] program in config.toml)",
        )
    }
}
