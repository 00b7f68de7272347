#![cfg(unix)]
#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KUBECONFIG: &str = "apiVersion: v1
clusters:
- cluster:
    server: https://api.ci.example.com:6443
  name: api-ci-example-com:6443
contexts:
- context:
    cluster: api-ci-example-com:6443
    user: robot
  name: ci
current-context: ci
users:
- name: robot
  user:
    token: sha256~fromconfig
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// A temp dir holding a fake `oc`, a home directory and the runner's
    /// command files. `fail_on` makes that subcommand exit 3.
    fn new(fail_on: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("bin")).unwrap();
        std::fs::create_dir(root.join("home")).unwrap();
        std::fs::write(root.join("kubeconfig.yaml"), KUBECONFIG).unwrap();
        std::fs::write(root.join("github_env"), "").unwrap();
        std::fs::write(root.join("github_output"), "").unwrap();

        let fail = fail_on
            .map(|cmd| format!("if [ \"$1\" = \"{cmd}\" ]; then echo \"{cmd} refused\" >&2; exit 3; fi\n"))
            .unwrap_or_default();
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> \"{log}\"\n{fail}if [ \"$1 $2\" = \"config view\" ]; then cat \"{kc}\"; fi\nexit 0\n",
            log = root.join("argv.log").display(),
            kc = root.join("kubeconfig.yaml").display(),
        );
        let oc = root.join("bin/oc");
        std::fs::write(&oc, script).unwrap();
        std::fs::set_permissions(&oc, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn kubeconfig(&self) -> PathBuf {
        self.path("home/.kube/config")
    }

    fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap_or_default()
    }

    /// `oc-login` with a clean environment: no inherited inputs, the fake
    /// `oc` first on PATH.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("oc-login").unwrap();
        let path = format!(
            "{}:{}",
            self.path("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        for var in [
            "INPUT_OPENSHIFT_SERVER_URL",
            "INPUT_OPENSHIFT_TOKEN",
            "INPUT_OPENSHIFT_USERNAME",
            "INPUT_OPENSHIFT_PASSWORD",
            "INPUT_INSECURE_SKIP_TLS_VERIFY",
            "INPUT_CERTIFICATE_AUTHORITY_DATA",
            "INPUT_NAMESPACE",
            "INPUT_REVEAL_CLUSTER_NAME",
            "INPUT_SKIP_KUBECONFIG",
            "KUBECONFIG",
            "OC_PATH",
            "RUNNER_DEBUG",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path())
            .env("PATH", path)
            .env("HOME", self.path("home"))
            .env("GITHUB_ENV", self.path("github_env"))
            .env("GITHUB_OUTPUT", self.path("github_output"));
        cmd
    }
}

fn mode(path: &Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

// ---------------------------------------------------------------------------
// oc-login login
// ---------------------------------------------------------------------------

#[test]
fn login_writes_private_kubeconfig_and_exports_it() {
    let fx = Fixture::new(None);
    let assert = fx
        .cmd()
        .arg("login")
        .env("INPUT_OPENSHIFT_SERVER_URL", "https://api.ci.example.com:6443")
        .env("INPUT_OPENSHIFT_TOKEN", "sha256~abc")
        .env("INPUT_NAMESPACE", "ci")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("::add-mask::sha256~abc"));
    assert!(stdout.contains("::add-mask::sha256~fromconfig"));
    assert!(stdout.contains("::add-mask::api-ci-example-com:6443"));
    assert!(stdout.contains("::group::oc login"));
    assert!(stdout.contains("::endgroup::"));
    // The echoed login command line is scrubbed; only the mask command names the token.
    assert!(stdout.contains("login --token=*** --server="));
    assert_eq!(stdout.matches("sha256~abc").count(), 1);
    // `config view` output is suppressed.
    assert!(stdout.contains("*** Suppressing command output"));
    assert!(!stdout.contains("current-context"));

    let kubeconfig = fx.kubeconfig();
    assert_eq!(std::fs::read_to_string(&kubeconfig).unwrap(), KUBECONFIG);
    assert_eq!(mode(&kubeconfig), 0o600);

    let env_file = fx.read("github_env");
    assert!(env_file.starts_with("KUBECONFIG<<ghadelimiter_"));
    assert!(env_file.contains(&kubeconfig.display().to_string()));
    let output_file = fx.read("github_output");
    assert!(output_file.starts_with("kubeconfig_path<<ghadelimiter_"));

    assert_eq!(
        fx.read("argv.log").lines().collect::<Vec<_>>(),
        vec![
            "login --token=sha256~abc --server=https://api.ci.example.com:6443",
            "whoami",
            "config set-context --current --namespace=ci",
            "config view --flatten --minify=true",
        ]
    );
}

#[test]
fn login_with_flags_and_explicit_oc_path() {
    let fx = Fixture::new(None);
    fx.cmd()
        .env("PATH", "/usr/bin:/bin")
        .args(["--oc-path"])
        .arg(fx.path("bin/oc"))
        .args([
            "login",
            "--username",
            "developer",
            "--password",
            "hunter2",
            "--insecure-skip-tls-verify",
            "--skip-kubeconfig",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("::add-mask::hunter2"));

    assert!(!fx.kubeconfig().exists());
    assert_eq!(
        fx.read("argv.log").lines().collect::<Vec<_>>(),
        vec![
            "login --username=developer --password=hunter2 --insecure-skip-tls-verify",
            "whoami",
        ]
    );
}

#[test]
fn login_without_credentials_fails_before_running_oc() {
    let fx = Fixture::new(None);
    fx.cmd()
        .arg("login")
        .env("INPUT_OPENSHIFT_SERVER_URL", "https://api.ci.example.com:6443")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("::error::"))
        .stderr(predicate::str::contains("openshift_token"));

    assert!(!fx.path("argv.log").exists());
    assert!(!fx.kubeconfig().exists());
}

#[test]
fn rejected_login_reports_exit_code_and_stderr() {
    let fx = Fixture::new(Some("login"));
    fx.cmd()
        .arg("login")
        .env("INPUT_OPENSHIFT_TOKEN", "sha256~abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited with code 3"))
        .stderr(predicate::str::contains("login refused"));

    assert!(!fx.kubeconfig().exists());
    assert_eq!(fx.read("github_env"), "");
}

// ---------------------------------------------------------------------------
// oc-login logout
// ---------------------------------------------------------------------------

#[test]
fn logout_removes_kubeconfig() {
    let fx = Fixture::new(None);
    fx.cmd()
        .arg("login")
        .env("INPUT_OPENSHIFT_TOKEN", "sha256~abc")
        .assert()
        .success();
    assert!(fx.kubeconfig().exists());

    fx.cmd()
        .arg("logout")
        .env("KUBECONFIG", fx.kubeconfig())
        .assert()
        .success();

    assert!(!fx.kubeconfig().exists());
    assert!(fx.read("argv.log").lines().any(|l| l == "logout"));
}

#[test]
fn logout_tolerates_failing_or_missing_oc() {
    let fx = Fixture::new(Some("logout"));
    std::fs::create_dir_all(fx.path("home/.kube")).unwrap();
    std::fs::write(fx.kubeconfig(), KUBECONFIG).unwrap();

    fx.cmd()
        .arg("logout")
        .env("KUBECONFIG", fx.kubeconfig())
        .assert()
        .success();
    assert!(!fx.kubeconfig().exists());

    std::fs::write(fx.kubeconfig(), KUBECONFIG).unwrap();
    fx.cmd()
        .arg("logout")
        .env("PATH", fx.path("home"))
        .env("KUBECONFIG", fx.kubeconfig())
        .assert()
        .success();
    assert!(!fx.kubeconfig().exists());
}

#[test]
fn logout_keeps_kubeconfig_it_did_not_write() {
    let fx = Fixture::new(None);
    let foreign = fx.path("cluster.yaml");
    std::fs::write(&foreign, KUBECONFIG).unwrap();
    std::fs::create_dir_all(fx.path("home/.kube")).unwrap();
    std::fs::write(fx.kubeconfig(), KUBECONFIG).unwrap();

    fx.cmd()
        .arg("logout")
        .env("KUBECONFIG", &foreign)
        .assert()
        .success();
    assert!(foreign.exists());

    let list = std::env::join_paths([fx.kubeconfig(), foreign.clone()]).unwrap();
    fx.cmd()
        .arg("logout")
        .env("KUBECONFIG", list)
        .assert()
        .success();
    assert!(foreign.exists());
    assert!(fx.kubeconfig().exists());
}
