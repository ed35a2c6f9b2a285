use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::process::{Child, Command, Stdio};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellRunResult {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellRunResult {
    /// Text to show the user: stdout when it has content, otherwise stderr.
    pub fn display_text(&self) -> Option<&str> {
        if !self.stdout.trim().is_empty() {
            Some(&self.stdout)
        } else if !self.stderr.trim().is_empty() {
            Some(&self.stderr)
        } else {
            None
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs one command line through the platform interpreter.
///
/// There is no timeout: a command that never exits blocks the caller.
pub trait ShellRunner {
    fn run(&self, cmd: &str) -> Result<ShellRunResult>;
}

/// Runs commands in the current directory of the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformShellRunner;

impl ShellRunner for PlatformShellRunner {
    fn run(&self, cmd: &str) -> Result<ShellRunResult> {
        let child = spawn_command(cmd)?;
        let output = child.wait_with_output()?;
        Ok(ShellRunResult {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn spawn_command(cmd: &str) -> Result<Child> {
    let mut errors = Vec::new();
    for mut command in candidate_commands(cmd) {
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.stdin(Stdio::inherit());
        let program = command.get_program().to_string_lossy().to_string();
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(err) => errors.push(format!("{program}: {err}")),
        }
    }
    Err(anyhow!(
        "failed to spawn command '{cmd}': {}",
        errors.join(" | ")
    ))
}

#[cfg(target_os = "windows")]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut cmd_shell = Command::new("cmd");
    cmd_shell.arg("/C").arg(cmd);
    commands.push(cmd_shell);

    let mut ps_shell = Command::new("powershell");
    ps_shell
        .arg("-NoLogo")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(cmd);
    commands.push(ps_shell);

    commands
}

#[cfg(not(target_os = "windows"))]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut sh_shell = Command::new("sh");
    sh_shell.arg("-c").arg(cmd);
    commands.push(sh_shell);

    let mut bash_shell = Command::new("bash");
    bash_shell.arg("-c").arg(cmd);
    commands.push(bash_shell);

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_runner_captures_stdout() {
        let runner = PlatformShellRunner::default();
        let out = runner.run("echo senpai").expect("run command");
        assert!(out.success());
        assert_eq!(out.display_text().map(str::trim), Some("senpai"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn failing_command_reports_stderr_and_status() {
        let runner = PlatformShellRunner::default();
        let out = runner.run("echo oops 1>&2; exit 4").expect("run command");
        assert_eq!(out.status, Some(4));
        assert!(out.stdout.is_empty());
        assert_eq!(out.display_text().map(str::trim), Some("oops"));
    }

    #[test]
    fn stdout_wins_over_stderr() {
        let result = ShellRunResult {
            status: Some(1),
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(result.display_text(), Some("out\n"));
        let silent = ShellRunResult {
            status: Some(0),
            stdout: " \n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(silent.display_text(), None);
    }
}
