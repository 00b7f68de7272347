//! The CI host side: workflow commands understood by a GitHub Actions runner.
//!
//! Masks go out as `::add-mask::` commands on stdout. Outputs and exported
//! variables are appended to the files named by `GITHUB_OUTPUT` / `GITHUB_ENV`
//! when the runner provides them, and fall back to the legacy stdout commands
//! otherwise.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::error::{LoginError, Result};
use crate::mask::{SecretMasker, SecretRegistry};

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";
pub const GITHUB_ENV_ENV: &str = "GITHUB_ENV";

/// Result sink and environment exporter of the invoking CI runner.
pub trait ActionsHost: SecretMasker {
    fn set_output(&self, name: &str, value: &str) -> Result<()>;
    fn export_variable(&self, name: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// GithubActions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GithubActions {
    registry: SecretRegistry,
    output_file: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl GithubActions {
    /// Host bound to the command files advertised in the environment.
    pub fn from_env(registry: SecretRegistry) -> Self {
        Self::with_files(
            registry,
            env_path(GITHUB_OUTPUT_ENV),
            env_path(GITHUB_ENV_ENV),
        )
    }

    pub fn with_files(
        registry: SecretRegistry,
        output_file: Option<PathBuf>,
        env_file: Option<PathBuf>,
    ) -> Self {
        Self {
            registry,
            output_file,
            env_file,
        }
    }

    pub fn registry(&self) -> &SecretRegistry {
        &self.registry
    }
}

impl SecretMasker for GithubActions {
    fn add_mask(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.registry.register(value);
        println!("::add-mask::{}", escape_data(value));
    }
}

impl ActionsHost for GithubActions {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.output_file {
            Some(file) => append_file_command(file, name, value),
            None => {
                println!(
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
                Ok(())
            }
        }
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        std::env::set_var(name, value);
        match &self.env_file {
            Some(file) => append_file_command(file, name, value),
            None => {
                println!(
                    "::set-env name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
                Ok(())
            }
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// RecordingHost
// ---------------------------------------------------------------------------

/// In-memory host that records everything it is given. Used by tests and
/// dry runs.
#[derive(Debug, Default)]
pub struct RecordingHost {
    masks: Mutex<Vec<String>>,
    outputs: Mutex<Vec<(String, String)>>,
    variables: Mutex<Vec<(String, String)>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masks(&self) -> Vec<String> {
        self.masks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn variables(&self) -> Vec<(String, String)> {
        self.variables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SecretMasker for RecordingHost {
    fn add_mask(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.masks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value.to_string());
    }
}

impl ActionsHost for RecordingHost {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        self.variables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command encoding
// ---------------------------------------------------------------------------

/// Escape a workflow command payload.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property (`name=...`).
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Heredoc block for the `GITHUB_OUTPUT` / `GITHUB_ENV` files.
pub fn file_command(name: &str, value: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(LoginError::Host(format!(
            "unexpected input: '{name}' or its value contains the delimiter"
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn append_file_command(file: &Path, name: &str, value: &str) -> Result<()> {
    let block = file_command(name, value)?;
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)?;
    f.write_all(block.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn escape_data_encodes_newlines_and_percent() {
        assert_eq!(escape_data("a%b\r\nc"), "a%25b%0D%0Ac");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }

    #[test]
    fn file_command_uses_heredoc() {
        let block = file_command("kubeconfig_path", "/home/runner/.kube/config").unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 3);
        let delimiter = lines[0].strip_prefix("kubeconfig_path<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines[1], "/home/runner/.kube/config");
        assert_eq!(lines[2], delimiter);
    }

    #[test]
    fn outputs_and_env_are_appended_to_files() {
        let dir = TempDir::new().unwrap();
        let output_file = dir.path().join("output");
        let env_file = dir.path().join("env");
        std::fs::write(&env_file, "EXISTING<<x\n1\nx\n").unwrap();

        let host = GithubActions::with_files(
            SecretRegistry::new(),
            Some(output_file.clone()),
            Some(env_file.clone()),
        );
        host.set_output("kubeconfig_path", "/tmp/kube/config").unwrap();
        host.export_variable("OC_LOGIN_CORE_TEST_VAR", "/tmp/kube/config")
            .unwrap();

        let output = std::fs::read_to_string(&output_file).unwrap();
        assert!(output.starts_with("kubeconfig_path<<ghadelimiter_"));
        assert!(output.contains("\n/tmp/kube/config\n"));

        let env = std::fs::read_to_string(&env_file).unwrap();
        assert!(env.starts_with("EXISTING<<x\n"));
        assert!(env.contains("OC_LOGIN_CORE_TEST_VAR<<ghadelimiter_"));
        assert_eq!(
            std::env::var("OC_LOGIN_CORE_TEST_VAR").unwrap(),
            "/tmp/kube/config"
        );
    }

    #[test]
    fn add_mask_registers_non_empty_values() {
        let host = GithubActions::with_files(SecretRegistry::new(), None, None);
        host.add_mask("");
        host.add_mask("sha256~token");
        assert_eq!(host.registry().len(), 1);
        assert!(host.registry().contains("sha256~token"));
    }

    #[test]
    fn recording_host_keeps_everything() {
        let host = RecordingHost::new();
        host.add_mask("a");
        host.add_mask("");
        host.set_output("o", "1").unwrap();
        host.export_variable("V", "2").unwrap();
        assert_eq!(host.masks(), vec!["a"]);
        assert_eq!(host.outputs(), vec![("o".to_string(), "1".to_string())]);
        assert_eq!(host.variables(), vec![("V".to_string(), "2".to_string())]);
    }
}
