use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command `{0}` timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("Command `{0}` failed with status {1}")]
    CommandFailed(String, ExitStatus),
    #[error("Command output was not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

fn shell(command_str: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command_str);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command_str);
        c
    }
}

/// Waits for `child`, killing it if `timeout` elapses first.
fn wait_for(
    child: &mut Child,
    command_str: &str,
    timeout: Option<Duration>,
) -> Result<(), ShellError> {
    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ShellError::Timeout(command_str.to_string(), duration));
            }
        },
        None => child.wait()?,
    };

    if !status.success() {
        return Err(ShellError::CommandFailed(command_str.to_string(), status));
    }
    Ok(())
}

/// Execute a shell command with the given input piped to stdin.
///
/// Returns the command's stdout on success.
///
/// # Arguments
///
/// * `command_str` - The shell command to execute
/// * `input` - Data to write to the command's stdin
/// * `timeout` - Optional timeout; if exceeded, the process is killed
///
/// # Notes
///
/// Stdin is fed from a helper thread while stdout is drained, so a tool that
/// starts writing before it has consumed all of its input (most minifiers on
/// large stylesheets) cannot deadlock against a full pipe buffer.
pub fn run_piped(
    command_str: &str,
    input: &str,
    timeout: Option<Duration>,
) -> Result<String, ShellError> {
    log::debug!("running `{}` with {} bytes on stdin", command_str, input.len());

    let mut cmd = shell(command_str);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        let bytes = input.as_bytes().to_vec();
        thread::spawn(move || stdin.write_all(&bytes))
    });

    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    wait_for(&mut child, command_str, timeout)?;

    if let Some(handle) = writer {
        match handle.join() {
            Ok(result) => match result {
                Ok(()) => {}
                // The tool may legitimately exit without reading everything.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e.into()),
            },
            Err(_) => {
                return Err(std::io::Error::other("stdin writer thread panicked").into());
            }
        }
    }

    let bytes = match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("stdout reader thread panicked"))??,
        None => Vec::new(),
    };

    Ok(String::from_utf8(bytes)?)
}

/// Execute a shell command for its side effects.
///
/// Stdin is closed and stdout/stderr go straight to the terminal.
pub fn run_command(command_str: &str, timeout: Option<Duration>) -> Result<(), ShellError> {
    log::debug!("running `{}`", command_str);

    let mut cmd = shell(command_str);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn()?;
    wait_for(&mut child, command_str, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo() {
        let output = run_piped("echo hello", "", None).unwrap();
        assert!(output.trim().contains("hello"));
    }

    #[test]
    fn test_input_piping() {
        let cmd = if cfg!(windows) {
            "findstr foo"
        } else {
            "grep foo"
        };
        let input = "foo\nbar\nbaz";
        let output = run_piped(cmd, input, None).unwrap();
        assert_eq!(output.trim(), "foo");
    }

    #[cfg(unix)]
    #[test]
    fn test_large_input_does_not_deadlock() {
        let input = "a { color: red; }\n".repeat(50_000);
        let output = run_piped("cat", &input, Some(Duration::from_secs(20))).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout() {
        let start = std::time::Instant::now();
        let res = run_piped("sleep 2", "", Some(Duration::from_millis(500)));
        assert!(matches!(res, Err(ShellError::Timeout(_, _))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_command_failed_includes_command_name() {
        let cmd = "exit 1";
        let res = run_piped(cmd, "", None);
        match res {
            Err(ShellError::CommandFailed(cmd_str, _)) => {
                assert_eq!(cmd_str, cmd);
            }
            _ => panic!("Expected CommandFailed error"),
        }
    }

    #[test]
    fn test_run_command_reports_failure() {
        assert!(run_command("exit 0", None).is_ok());
        assert!(matches!(
            run_command("exit 3", None),
            Err(ShellError::CommandFailed(_, _))
        ));
    }
}
