use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::paths;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Readers never observe a half-written kubeconfig.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Restrict `path` to owner read/write. No-op off Unix.
pub fn restrict_to_owner(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Create the kubeconfig directory under `home`, falling back once to `cwd`.
pub fn ensure_kubeconfig_dir(home: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match home {
        Some(home) => {
            let dir = paths::kubeconfig_dir(home);
            match std::fs::create_dir_all(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) => warn!(
                    dir = %dir.display(),
                    error = %e,
                    "could not create kubeconfig directory, falling back to working directory"
                ),
            }
        }
        None => warn!("home directory not found, falling back to working directory"),
    }

    let dir = paths::kubeconfig_dir(cwd);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write the kubeconfig into `dir` with owner-only permissions.
pub fn write_kubeconfig(dir: &Path, contents: &str) -> Result<PathBuf> {
    let path = paths::kubeconfig_path(dir);
    info!(path = %path.display(), "writing kubeconfig");
    atomic_write(&path, contents.as_bytes())?;
    restrict_to_owner(&path)?;
    Ok(path)
}

/// Remove a kubeconfig previously written by [`write_kubeconfig`].
///
/// A path list (as `KUBECONFIG` allows) or a file outside the
/// `.kube/config` layout is left in place with a warning. Returns whether a
/// file was removed.
pub fn remove_kubeconfig(path: &Path) -> Result<bool> {
    if std::env::split_paths(path.as_os_str()).count() > 1 {
        warn!(
            value = %path.display(),
            "{} holds a path list, not removing anything",
            paths::KUBECONFIG_ENV
        );
        return Ok(false);
    }
    if !paths::is_kubeconfig_path(path) {
        warn!(path = %path.display(), "not a kubeconfig written by oc-login, leaving it in place");
        return Ok(false);
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed kubeconfig");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "kubeconfig already gone");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Write certificate-authority data to a private temp file. The file is
/// removed when the returned handle is dropped.
pub fn write_temp_ca(data: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("oc-login-ca-")
        .suffix(".crt")
        .tempfile()?;
    file.write_all(data.as_bytes())?;
    if !data.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/config");
        atomic_write(&path, b"apiVersion: v1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "apiVersion: v1");
    }

    #[test]
    fn kubeconfig_dir_prefers_home() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        let dir = ensure_kubeconfig_dir(Some(home.path()), cwd.path()).unwrap();
        assert_eq!(dir, home.path().join(".kube"));
        assert!(dir.is_dir());
        assert!(!cwd.path().join(".kube").exists());
    }

    #[test]
    fn kubeconfig_dir_falls_back_to_cwd() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the home directory should be.
        let home = tmp.path().join("not-a-dir");
        std::fs::write(&home, b"").unwrap();
        let cwd = tmp.path().join("work");
        std::fs::create_dir(&cwd).unwrap();

        let dir = ensure_kubeconfig_dir(Some(&home), &cwd).unwrap();
        assert_eq!(dir, cwd.join(".kube"));

        let dir = ensure_kubeconfig_dir(None, &cwd).unwrap();
        assert_eq!(dir, cwd.join(".kube"));
    }

    #[test]
    fn kubeconfig_dir_fails_after_single_fallback() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        assert!(ensure_kubeconfig_dir(Some(&blocker), &blocker).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn kubeconfig_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(dir.path(), "apiVersion: v1\n").unwrap();
        assert_eq!(path, dir.path().join("config"));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn remove_kubeconfig_only_touches_written_layout() {
        let dir = TempDir::new().unwrap();
        let kube = ensure_kubeconfig_dir(Some(dir.path()), dir.path()).unwrap();
        let written = write_kubeconfig(&kube, "apiVersion: v1\n").unwrap();

        let foreign = dir.path().join("cluster.yaml");
        std::fs::write(&foreign, "apiVersion: v1\n").unwrap();
        assert!(!remove_kubeconfig(&foreign).unwrap());
        assert!(foreign.exists());

        let list = std::env::join_paths([written.as_path(), foreign.as_path()]).unwrap();
        assert!(!remove_kubeconfig(Path::new(&list)).unwrap());
        assert!(written.exists());

        assert!(remove_kubeconfig(&written).unwrap());
        assert!(!written.exists());
        assert!(!remove_kubeconfig(&written).unwrap());
    }

    #[test]
    fn temp_ca_is_removed_on_drop() {
        let file = write_temp_ca("-----BEGIN CERTIFICATE-----").unwrap();
        let path = file.path().to_path_buf();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .ends_with("-----\n"));
        drop(file);
        assert!(!path.exists());
    }
}
