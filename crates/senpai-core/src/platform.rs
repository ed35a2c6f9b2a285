//! OS metadata sent along with questions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemMetadata {
    pub os: String,
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

pub trait PlatformProbe {
    fn metadata(&self) -> SystemMetadata;
}

/// Returns the probe for the platform this binary was built for.
pub fn detect_platform() -> Box<dyn PlatformProbe + Send + Sync> {
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsProbe)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(MacProbe)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Box::new(LinuxProbe::default())
    }
}

#[derive(Debug, Clone)]
pub struct LinuxProbe {
    pub os_release_paths: Vec<PathBuf>,
}

impl Default for LinuxProbe {
    fn default() -> Self {
        Self {
            os_release_paths: vec![
                PathBuf::from("/etc/os-release"),
                PathBuf::from("/usr/lib/os-release"),
            ],
        }
    }
}

impl PlatformProbe for LinuxProbe {
    fn metadata(&self) -> SystemMetadata {
        let version = self
            .os_release_paths
            .iter()
            .find(|path| path.exists())
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|raw| parse_os_release(&raw));
        SystemMetadata {
            os: "Linux".to_string(),
            version,
            arch: None,
            shell: login_shell(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacProbe;

impl PlatformProbe for MacProbe {
    fn metadata(&self) -> SystemMetadata {
        SystemMetadata {
            os: "macOS".to_string(),
            version: command_output("sw_vers", &["-productVersion"]),
            arch: Some(std::env::consts::ARCH.to_string()),
            shell: login_shell(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsProbe;

impl PlatformProbe for WindowsProbe {
    fn metadata(&self) -> SystemMetadata {
        let version = command_output("cmd", &["/C", "ver"]).map(|raw| parse_windows_ver(&raw));
        SystemMetadata {
            os: "Windows".to_string(),
            version,
            arch: None,
            shell: None,
        }
    }
}

/// Extracts `PRETTY_NAME` from the contents of an os-release file.
pub fn parse_os_release(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.to_ascii_uppercase().starts_with("PRETTY_NAME"))
        .filter_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .next_back()
}

/// `Microsoft Windows [Version 10.0.19045.3570]` becomes `10.0.19045.3570`.
fn parse_windows_ver(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .rsplit_once("Version ")
        .map(|(_, rest)| rest.trim_end_matches(']').trim().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn login_shell() -> Option<String> {
    std::env::var("SHELL").ok().filter(|s| !s.trim().is_empty())
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = std::process::Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pretty_name_is_unquoted() {
        let raw = "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nID=ubuntu\n";
        assert_eq!(parse_os_release(raw), Some("Ubuntu 22.04.3 LTS".to_string()));
        assert_eq!(parse_os_release("ID=arch\n"), None);
    }

    #[test]
    fn linux_probe_falls_back_to_second_path() {
        let dir = TempDir::new().expect("tempdir");
        let fallback = dir.path().join("os-release");
        std::fs::write(&fallback, "PRETTY_NAME='Debian GNU/Linux 12'\n").expect("write");
        let probe = LinuxProbe {
            os_release_paths: vec![dir.path().join("missing"), fallback],
        };
        let meta = probe.metadata();
        assert_eq!(meta.os, "Linux");
        assert_eq!(meta.version.as_deref(), Some("Debian GNU/Linux 12"));
    }

    #[test]
    fn linux_probe_without_release_file_has_no_version() {
        let probe = LinuxProbe {
            os_release_paths: vec![],
        };
        assert_eq!(probe.metadata().version, None);
    }

    #[test]
    fn windows_ver_output_is_trimmed() {
        assert_eq!(
            parse_windows_ver("\r\nMicrosoft Windows [Version 10.0.19045.3570]\r\n"),
            "10.0.19045.3570"
        );
    }

    #[test]
    fn metadata_serializes_null_version_but_skips_missing_arch() {
        let meta = SystemMetadata {
            os: "Linux".to_string(),
            version: None,
            arch: None,
            shell: Some("/bin/zsh".to_string()),
        };
        let value = serde_json::to_value(&meta).expect("serialize");
        assert!(value["version"].is_null());
        assert!(value.get("arch").is_none());
        assert_eq!(value["shell"], "/bin/zsh");
    }
}
