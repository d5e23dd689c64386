//! The seam between selection and whatever actually publishes a post.
//!
//! The engine hands an [`ActionRequest`] to an [`ActionExecutor`] and only
//! looks at the success flag of the [`ActionResult`] it gets back.
//!
//! # Command protocol
//! [`CommandExecutor`] runs an external program once per request. The request
//! is written to its stdin as JSON and an `ActionResult` JSON object is read
//! from its stdout. Stderr passes through to the terminal. The request is fed
//! from a separate thread while stdout is drained, so the program may write
//! before, during or after reading its input. A program that cannot be
//! spawned, or prints something that is not a result, counts as a failed
//! attempt.

use crate::error::{Result, RotapostError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub destination_id: String,
    pub destination_name: String,
    pub destination_url: String,
    pub content_id: String,
    pub category: String,
    pub audience_segment: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_comment: Option<String>,
    /// Ask the executor to read and record the destination's house rules.
    #[serde(default)]
    pub capture_rules: bool,
    #[serde(default)]
    pub is_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

pub trait ActionExecutor {
    fn execute(&mut self, request: &ActionRequest) -> ActionResult;

    /// Dry-run executors report success without publishing; their outcomes
    /// are not recorded.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Logs each request and reports success.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    pub requests: Vec<ActionRequest>,
}

impl ActionExecutor for DryRunExecutor {
    fn execute(&mut self, request: &ActionRequest) -> ActionResult {
        tracing::info!(
            destination = %request.destination_id,
            content = %request.content_id,
            photo = request.photo_filename.as_deref().unwrap_or("none"),
            "dry run"
        );
        self.requests.push(request.clone());
        ActionResult::ok(format!("[dry run] would post to {}", request.destination_name))
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Delegates each request to an external program speaking the JSON protocol.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: PathBuf,
    args: Vec<String>,
    root: PathBuf,
}

impl CommandExecutor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, root: &Path) -> Self {
        Self {
            program: program.into(),
            args,
            root: root.to_path_buf(),
        }
    }

    fn run(&self, request: &ActionRequest) -> Result<ActionResult> {
        let payload = serde_json::to_string(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("ROTAPOST_ROOT", &self.root)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                RotapostError::ExecutorFailed(format!("{}: {e}", self.program.display()))
            })?;

        // The writer drops stdin when done so the program sees EOF.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(payload.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| RotapostError::ExecutorFailed(e.to_string()))?;
        if let Some(Ok(Err(e))) = writer.map(|w| w.join()) {
            // Programs that answer without reading the request close the pipe early.
            tracing::debug!(program = %self.program.display(), error = %e, "request not fully written");
        }
        let stdout = String::from_utf8_lossy(&output.stdout);

        match serde_json::from_str::<ActionResult>(stdout.trim()) {
            Ok(result) => Ok(result),
            Err(_) if !output.status.success() => Err(RotapostError::ExecutorFailed(format!(
                "exited with {}",
                output.status
            ))),
            Err(e) => {
                let hint: String = stdout.chars().take(200).collect();
                Err(RotapostError::ExecutorFailed(format!(
                    "unreadable result ({e}): {hint}"
                )))
            }
        }
    }
}

impl ActionExecutor for CommandExecutor {
    fn execute(&mut self, request: &ActionRequest) -> ActionResult {
        self.run(request).unwrap_or_else(|e| {
            ActionResult::failed(format!("could not post to {}", request.destination_name), e.to_string())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request() -> ActionRequest {
        ActionRequest {
            destination_id: "g1".into(),
            destination_name: "Group One".into(),
            destination_url: "https://example.com/g1".into(),
            content_id: "tips-1".into(),
            category: "tips".into(),
            audience_segment: "community".into(),
            text: "Reboot your router".into(),
            photo_path: None,
            photo_filename: None,
            follow_up_comment: None,
            capture_rules: true,
            is_page: false,
        }
    }

    #[test]
    fn dry_run_records_and_succeeds() {
        let mut exec = DryRunExecutor::default();
        let result = exec.execute(&request());
        assert!(result.success);
        assert!(exec.is_dry_run());
        assert_eq!(exec.requests.len(), 1);
    }

    #[test]
    fn request_json_omits_absent_optionals() {
        let json = serde_json::to_value(request()).unwrap();
        assert!(json.get("photo_path").is_none());
        assert_eq!(json["capture_rules"], true);
    }

    #[test]
    fn missing_program_is_a_failed_result() {
        let dir = TempDir::new().unwrap();
        let mut exec = CommandExecutor::new(
            dir.path().join("definitely-not-here"),
            Vec::new(),
            dir.path(),
        );
        let result = exec.execute(&request());
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(!exec.is_dry_run());
    }

    #[cfg(unix)]
    #[test]
    fn command_result_is_parsed_from_stdout() {
        let dir = TempDir::new().unwrap();
        let mut exec = CommandExecutor::new(
            "sh",
            vec![
                "-c".into(),
                r#"cat >/dev/null; echo '{"success": true, "message": "posted"}'"#.into(),
            ],
            dir.path(),
        );
        let result = exec.execute(&request());
        assert!(result.success);
        assert_eq!(result.message, "posted");
    }

    #[cfg(unix)]
    #[test]
    fn large_output_before_reading_input_completes() {
        let dir = TempDir::new().unwrap();
        let script = concat!(
            r#"printf '{"success": true, "message": "'; "#,
            r#"head -c 200000 /dev/zero | tr '\0' a; "#,
            r#"printf '"}'; cat >/dev/null"#,
        );
        let mut exec = CommandExecutor::new("sh", vec!["-c".into(), script.into()], dir.path());
        let mut req = request();
        req.text = "x".repeat(200_000);

        let result = exec.execute(&req);
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.message.len(), 200_000);
    }

    #[cfg(unix)]
    #[test]
    fn program_ignoring_input_still_reports() {
        let dir = TempDir::new().unwrap();
        let mut exec = CommandExecutor::new(
            "sh",
            vec!["-c".into(), r#"echo '{"success": true, "message": "ok"}'"#.into()],
            dir.path(),
        );
        let mut req = request();
        req.text = "x".repeat(200_000);
        assert!(exec.execute(&req).success);
    }

    #[cfg(unix)]
    #[test]
    fn garbage_output_is_a_failed_result() {
        let dir = TempDir::new().unwrap();
        let mut exec = CommandExecutor::new(
            "sh",
            vec!["-c".into(), "cat >/dev/null; echo hello".into()],
            dir.path(),
        );
        assert!(!exec.execute(&request()).success);
    }
}
