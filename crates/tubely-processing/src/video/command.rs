use std::ffi::OsStr;
use std::process::{Output, Stdio};

use tokio::process::Command;

use crate::error::ToolError;

/// Longest stderr excerpt kept in an error.
const STDERR_LIMIT: usize = 2048;

/// Reject tool paths carrying shell metacharacters or traversal sequences.
pub fn validate_tool_path(path: &str) -> Result<(), ToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ToolError::InvalidPath(path.to_string()));
    }
    if path.contains("..") {
        return Err(ToolError::InvalidPath(path.to_string()));
    }
    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\'))
    {
        return Err(ToolError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Run a tool to completion and return its output if it exited successfully.
///
/// The child is killed when the returned future is dropped.
pub(crate) async fn run_tool<I, S>(program: &str, args: I) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let stderr = match stderr.char_indices().nth(STDERR_LIMIT) {
            Some((idx, _)) => format!("{}...", &stderr[..idx]),
            None => stderr.to_string(),
        };
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.code(),
            stderr,
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tool_path() {
        assert!(validate_tool_path("ffprobe").is_ok());
        assert!(validate_tool_path("/usr/local/bin/ffmpeg").is_ok());
        assert!(validate_tool_path("ffmpeg; rm -rf /").is_err());
        assert!(validate_tool_path("$(whoami)").is_err());
        assert!(validate_tool_path("../bin/ffmpeg").is_err());
        assert!(validate_tool_path("ff mpeg").is_err());
        assert!(validate_tool_path("").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let err = run_tool("false", Vec::<&str>::new()).await.unwrap_err();
        match err {
            ToolError::Failed {
                program, status, ..
            } => {
                assert_eq!(program, "false");
                assert_eq!(status, Some(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = run_tool("/nonexistent/tubely-tool", ["-version"])
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
