//! Login and logout pipelines built from `oc` invocations.
//!
//! Login moves through
//! `Start → Authenticated → ContextConfigured (optional) → Exported → Done`
//! and stops at the first failure; the error is returned unchanged.

use std::fmt;
use std::path::{Path, PathBuf};

use oc_exec::{command_args, ExecPolicy, Flag, OcRunner, OptionSet, Subcommand};
use tracing::{debug, info, warn};

use crate::actions::ActionsHost;
use crate::auth::AuthDescriptor;
use crate::error::Result;
use crate::inputs::{outputs, present, LoginInputs};
use crate::{io, kubeconfig, paths};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Authenticated,
    ContextConfigured,
    Exported,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::Authenticated => "authenticated",
            Stage::ContextConfigured => "context_configured",
            Stage::Exported => "exported",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// `None` when kubeconfig export was skipped.
    pub kubeconfig_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// LoginWorkflow
// ---------------------------------------------------------------------------

pub struct LoginWorkflow<'a> {
    runner: &'a OcRunner,
    host: &'a dyn ActionsHost,
    home: Option<PathBuf>,
    cwd: PathBuf,
}

impl<'a> LoginWorkflow<'a> {
    pub fn new(runner: &'a OcRunner, host: &'a dyn ActionsHost) -> Self {
        Self {
            runner,
            host,
            home: paths::home_dir(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Override where the kubeconfig directory is created.
    pub fn with_dirs(mut self, home: Option<PathBuf>, cwd: PathBuf) -> Self {
        self.home = home;
        self.cwd = cwd;
        self
    }

    pub async fn run(&self, inputs: &LoginInputs) -> Result<LoginOutcome> {
        let mut stage = Stage::Start;
        debug!(%stage, "login workflow started");

        // Resolved before anything is spawned.
        let auth = AuthDescriptor::from_inputs(inputs)?;
        self.login(&auth).await?;
        stage = Stage::Authenticated;
        debug!(%stage, "login succeeded");

        if let Some(namespace) = present(&inputs.namespace) {
            self.set_namespace(namespace).await?;
            stage = Stage::ContextConfigured;
            debug!(%stage, "namespace set");
        }

        let kubeconfig_path = if inputs.skip_kubeconfig {
            info!("skipping kubeconfig export");
            None
        } else {
            let path = self.export_kubeconfig(inputs.reveal_cluster_name).await?;
            stage = Stage::Exported;
            debug!(%stage, "kubeconfig exported");
            Some(path)
        };

        stage = Stage::Done;
        debug!(%stage, "login workflow finished");
        Ok(LoginOutcome { kubeconfig_path })
    }

    async fn login(&self, auth: &AuthDescriptor) -> Result<()> {
        // The login command line is echoed with its credentials in it.
        for secret in auth.secrets() {
            self.host.add_mask(secret);
        }

        info!(method = auth.method(), "authenticating");
        let ca_file = match &auth.certificate_authority_data {
            Some(data) => Some(io::write_temp_ca(data)?),
            None => None,
        };
        let options = auth.login_options(ca_file.as_ref().map(|f| f.path()));
        let args = command_args(&[Subcommand::Login], &options);
        self.runner
            .run(&args, &ExecPolicy::visible().in_group("oc login"))
            .await?;
        drop(ca_file);

        let whoami = self
            .runner
            .run(
                &command_args(&[Subcommand::Whoami], &OptionSet::new()),
                &ExecPolicy::visible().allow_failure(),
            )
            .await?;
        if !whoami.success() {
            warn!(exit_code = whoami.exit_code, "could not verify identity after login");
        }
        Ok(())
    }

    async fn set_namespace(&self, namespace: &str) -> Result<()> {
        info!(namespace, "setting current context's namespace");
        let options = OptionSet::new()
            .with_bare(Flag::Current)
            .with(Flag::Namespace, namespace);
        let args = command_args(&[Subcommand::Config, Subcommand::SetContext], &options);
        self.runner.run(&args, &ExecPolicy::visible()).await?;
        Ok(())
    }

    async fn export_kubeconfig(&self, reveal_cluster_name: bool) -> Result<PathBuf> {
        let options = OptionSet::new()
            .with_bare(Flag::Flatten)
            .with(Flag::Minify, "true");
        let args = command_args(&[Subcommand::Config, Subcommand::View], &options);
        // Hidden: the secrets in it are not registered yet.
        let view = self.runner.run(&args, &ExecPolicy::hidden()).await?;

        kubeconfig::mask_secrets(&view.stdout, reveal_cluster_name, self.host)?;

        let dir = io::ensure_kubeconfig_dir(self.home.as_deref(), &self.cwd)?;
        let path = io::write_kubeconfig(&dir, &view.stdout)?;
        let path_str = path.display().to_string();

        info!(var = paths::KUBECONFIG_ENV, path = %path_str, "exporting kubeconfig location");
        self.host.export_variable(paths::KUBECONFIG_ENV, &path_str)?;
        self.host.set_output(outputs::KUBECONFIG_PATH, &path_str)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// LogoutWorkflow
// ---------------------------------------------------------------------------

/// Post-job cleanup: end the session and remove the exported kubeconfig.
pub struct LogoutWorkflow<'a> {
    runner: &'a OcRunner,
}

impl<'a> LogoutWorkflow<'a> {
    pub fn new(runner: &'a OcRunner) -> Self {
        Self { runner }
    }

    pub async fn run(&self, kubeconfig: Option<&Path>) -> Result<()> {
        let args = command_args(&[Subcommand::Logout], &OptionSet::new());
        let result = self
            .runner
            .run(&args, &ExecPolicy::visible().allow_failure())
            .await?;
        if !result.success() {
            warn!(exit_code = result.exit_code, "oc logout failed");
        }

        if let Some(path) = kubeconfig {
            io::remove_kubeconfig(path)?;
        }
        Ok(())
    }
}
