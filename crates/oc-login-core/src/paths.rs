use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const KUBECONFIG_DIR: &str = ".kube";
pub const KUBECONFIG_FILE: &str = "config";
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn kubeconfig_dir(base: &Path) -> PathBuf {
    base.join(KUBECONFIG_DIR)
}

pub fn kubeconfig_path(dir: &Path) -> PathBuf {
    dir.join(KUBECONFIG_FILE)
}

/// `true` for a `<dir>/.kube/config` path, the only layout this tool writes.
pub fn is_kubeconfig_path(path: &Path) -> bool {
    path.file_name().is_some_and(|f| f == KUBECONFIG_FILE)
        && path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|d| d == KUBECONFIG_DIR)
}

pub fn home_dir() -> Option<PathBuf> {
    home::home_dir().filter(|p| !p.as_os_str().is_empty())
}
