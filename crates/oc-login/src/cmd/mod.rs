pub mod login;
pub mod logout;

use anyhow::Result;
use oc_exec::{OcRunner, Platform};
use std::path::Path;

/// The `oc` to drive: the explicit path if given, otherwise a PATH lookup.
pub fn resolve_runner(oc_path: Option<&Path>) -> oc_exec::Result<OcRunner> {
    match oc_path {
        Some(path) => Ok(OcRunner::with_executable(path)),
        None => OcRunner::locate(Platform::current()),
    }
}

/// Single-threaded runtime; every `oc` call is awaited in sequence.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
