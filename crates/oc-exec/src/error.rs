use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcExecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{0}' not found on PATH")]
    NotFound(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `command` holds the executable and its subcommands only; flag values
    /// are left out because they may carry credentials.
    #[error("{command} exited with code {exit_code}{}", stderr_suffix(.stderr))]
    Execution {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

impl OcExecError {
    /// Exit code of the failed process, if this is an execution failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            OcExecError::Execution { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\nstderr: {trimmed}")
    }
}
