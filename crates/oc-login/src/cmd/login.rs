use anyhow::{Context, Result};
use clap::Args;
use oc_login_core::inputs::is_true;
use oc_login_core::{GithubActions, LoginInputs, LoginWorkflow, SecretRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Every flag falls back to the `INPUT_*` variable the Actions runner sets.
/// Boolean inputs count as set only for the literal `true`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Cluster API server URL
    #[arg(long, env = "INPUT_OPENSHIFT_SERVER_URL")]
    server_url: Option<String>,

    /// Bearer token; takes precedence over username/password
    #[arg(long, env = "INPUT_OPENSHIFT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "INPUT_OPENSHIFT_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "INPUT_OPENSHIFT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip server certificate verification
    #[arg(
        long,
        env = "INPUT_INSECURE_SKIP_TLS_VERIFY",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    insecure_skip_tls_verify: Option<String>,

    /// PEM certificate-authority data for the server
    #[arg(long, env = "INPUT_CERTIFICATE_AUTHORITY_DATA", hide_env_values = true)]
    certificate_authority_data: Option<String>,

    /// Namespace to set on the current context
    #[arg(long, env = "INPUT_NAMESPACE")]
    namespace: Option<String>,

    /// Do not mask cluster names in logs
    #[arg(
        long,
        env = "INPUT_REVEAL_CLUSTER_NAME",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    reveal_cluster_name: Option<String>,

    /// Log in only; do not write or export a kubeconfig
    #[arg(
        long,
        env = "INPUT_SKIP_KUBECONFIG",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    skip_kubeconfig: Option<String>,
}

impl From<LoginArgs> for LoginInputs {
    fn from(args: LoginArgs) -> Self {
        LoginInputs {
            server_url: args.server_url,
            token: args.token,
            username: args.username,
            password: args.password,
            skip_tls_verify: is_true(args.insecure_skip_tls_verify.as_deref()),
            certificate_authority_data: args.certificate_authority_data,
            namespace: args.namespace,
            reveal_cluster_name: is_true(args.reveal_cluster_name.as_deref()),
            skip_kubeconfig: is_true(args.skip_kubeconfig.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(oc_path: Option<&Path>, registry: &SecretRegistry, args: LoginArgs) -> Result<()> {
    let inputs = LoginInputs::from(args);
    let host = GithubActions::from_env(registry.clone());
    let runner = super::resolve_runner(oc_path)?.with_redactor(Arc::new(registry.clone()));
    info!(oc = %runner.executable().display(), "using oc");

    let rt = super::runtime()?;
    let outcome = rt
        .block_on(LoginWorkflow::new(&runner, &host).run(&inputs))
        .context("login failed")?;

    match outcome.kubeconfig_path {
        Some(path) => info!(path = %path.display(), "logged in; kubeconfig ready"),
        None => info!("logged in"),
    }
    Ok(())
}
