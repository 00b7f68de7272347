use oc_exec::OcExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Exec(#[from] OcExecError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("host command error: {0}")]
    Host(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoginError>;
