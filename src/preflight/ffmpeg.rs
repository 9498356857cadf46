//! FFmpeg preflight check.
//!
//! The download tool needs ffmpeg to merge a video-only stream with an
//! audio track.

use super::CheckResult;
use std::process::Command;

/// Check if ffmpeg is installed.
pub fn check() -> CheckResult {
    let output = Command::new("ffmpeg").arg("-version").output();

    match output {
        Ok(o) if o.status.success() => {
            let stdout = String::from_utf8_lossy(&o.stdout);
            let version = stdout
                .lines()
                .next()
                .and_then(|l| l.split_whitespace().nth(2))
                .unwrap_or("unknown");
            CheckResult::ok("ffmpeg", &format!("installed ({})", version))
        }
        _ => CheckResult::fail(
            "ffmpeg",
            "not found",
            "Install FFmpeg: sudo apt install ffmpeg",
        ),
    }
}
