//! Download tool service.
//!
//! The download tool is an external program (yt-dlp or compatible). Runs go
//! through the [`MediaTool`] trait so the orchestrator can be driven by a
//! fake in tests.

use crate::models::config::ToolConfig;
use crate::models::media::MediaItemId;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Marker the tool prints when a selector matches no format.
const FORMAT_UNAVAILABLE_MARKERS: &[&str] = &[
    "Requested format is not available",
    "requested format not available",
];

/// One download or merge request to the tool.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Format selector, e.g. `160` or `160+233-1`.
    pub selector: String,
    /// Item to fetch.
    pub item_id: MediaItemId,
    /// Directory the tool runs in; its output lands here.
    pub directory: PathBuf,
    /// Output filename template.
    pub output_template: String,
}

/// Result of a tool run that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool exited successfully.
    Completed,
    /// The selector matched no available format.
    FormatUnavailable { detail: String },
}

/// External download tool.
#[allow(async_fn_in_trait)]
pub trait MediaTool {
    /// Download (and merge, for composite selectors) into the invocation's
    /// directory.
    async fn fetch(&self, invocation: &ToolInvocation) -> Result<ToolOutcome>;

    /// Text listing of the formats available for an item.
    async fn list_formats(&self, item_id: &MediaItemId) -> Result<String>;
}

impl<T: MediaTool> MediaTool for &T {
    async fn fetch(&self, invocation: &ToolInvocation) -> Result<ToolOutcome> {
        (**self).fetch(invocation).await
    }

    async fn list_formats(&self, item_id: &MediaItemId) -> Result<String> {
        (**self).list_formats(item_id).await
    }
}

/// Check whether tool stderr reports an unavailable format.
pub fn is_format_unavailable(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    FORMAT_UNAVAILABLE_MARKERS
        .iter()
        .any(|m| lower.contains(&m.to_lowercase()))
}

/// Check if the tool is installed.
pub fn is_installed(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get the tool version.
pub fn get_version(program: &str) -> Result<String> {
    let output = std::process::Command::new(program).arg("--version").output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or("unknown");

    Ok(first_line.trim().to_string())
}

/// yt-dlp backed [`MediaTool`].
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: ToolConfig,
    show_progress: bool,
}

impl YtDlp {
    /// Create a new tool runner.
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            show_progress: true,
        }
    }

    /// Disable the spinner (e.g. for JSON output).
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    /// Run the tool, returning exit code, stdout and stderr.
    async fn run(&self, args: &[String], dir: Option<&Path>, label: &str) -> Result<RunOutput> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.extra_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("Running {} {:?}", self.config.program, args);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                crate::Error::ToolNotFound(self.config.program.clone())
            } else {
                crate::Error::Io(e)
            }
        })?;

        let pb = self.spinner(format!("{} {}", self.config.program, label));

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout, stderr) = tokio::join!(
            collect_lines(stdout, pb.as_ref(), false),
            collect_lines(stderr, None, true)
        );
        let status = child.wait().await?;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(RunOutput {
            success: status.success(),
            code: status.code(),
            stdout: stdout?,
            stderr: stderr?,
        })
    }
}

struct RunOutput {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

/// Drain a child pipe line by line, logging as it goes.
///
/// Lines are decoded lossily; the pipe is always read to EOF.
async fn collect_lines<R>(pipe: Option<R>, pb: Option<&ProgressBar>, is_stderr: bool) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(pipe) = pipe else {
        return Ok(collected);
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end_matches(['\n', '\r']);

        if is_stderr {
            tracing::debug!(target: "dub_fetch::tool", "stderr: {}", line);
        } else {
            tracing::debug!(target: "dub_fetch::tool", "{}", line);
            if let Some(pb) = pb {
                if line.starts_with("[download]") || line.starts_with("[Merger]") {
                    pb.set_message(line.to_string());
                }
            }
        }
        collected.push_str(line);
        collected.push('\n');
    }

    Ok(collected)
}

/// Last non-empty lines of tool output, for error messages.
fn tail(text: &str, lines: usize) -> String {
    let kept: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = kept.len().saturating_sub(lines);
    kept[start..].join(" | ")
}

impl MediaTool for YtDlp {
    async fn fetch(&self, invocation: &ToolInvocation) -> Result<ToolOutcome> {
        let url = invocation.item_id.url(&self.config.url_template);
        let args = vec![
            "-f".to_string(),
            invocation.selector.clone(),
            "-o".to_string(),
            invocation.output_template.clone(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            url,
        ];

        let output = self
            .run(&args, Some(&invocation.directory), &invocation.selector)
            .await?;

        if output.success {
            return Ok(ToolOutcome::Completed);
        }

        if is_format_unavailable(&output.stderr) {
            return Ok(ToolOutcome::FormatUnavailable {
                detail: tail(&output.stderr, 2),
            });
        }

        Err(crate::Error::ToolInvocation {
            selector: invocation.selector.clone(),
            code: output.code,
            detail: tail(&output.stderr, 3),
        })
    }

    async fn list_formats(&self, item_id: &MediaItemId) -> Result<String> {
        let args = vec![
            "-F".to_string(),
            "--no-playlist".to_string(),
            item_id.url(&self.config.url_template),
        ];

        let output = self.run(&args, None, "listing formats").await?;
        if !output.success {
            return Err(crate::Error::ToolInvocation {
                selector: "-F".to_string(),
                code: output.code,
                detail: tail(&output.stderr, 3),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unavailable_detection() {
        assert!(is_format_unavailable(
            "ERROR: [youtube] abcABC12345: Requested format is not available. Use --list-formats"
        ));
        assert!(!is_format_unavailable("ERROR: unable to download video data: HTTP Error 403"));
    }

    #[tokio::test]
    async fn test_collect_lines_tolerates_invalid_utf8() {
        let output: &[u8] = b"[download] Caf\xe9 [abcABC12345]\r\n[Merger] done\nlast";
        let collected = collect_lines(Some(output), None, false).await.unwrap();
        assert_eq!(
            collected,
            "[download] Caf\u{fffd} [abcABC12345]\n[Merger] done\nlast\n"
        );
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("a\n\nb\nc\n", 2), "b | c");
        assert_eq!(tail("", 3), "");
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let tool = YtDlp::new(ToolConfig {
            program: "dub-fetch-no-such-tool".to_string(),
            ..ToolConfig::default()
        })
        .quiet();
        let id = MediaItemId::parse("abcABC12345").unwrap();

        let result = tool.list_formats(&id).await;
        assert!(matches!(result, Err(crate::Error::ToolNotFound(_))));
    }
}
