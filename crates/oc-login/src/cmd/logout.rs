use anyhow::{Context, Result};
use clap::Args;
use oc_exec::OcExecError;
use oc_login_core::{io, LogoutWorkflow};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Kubeconfig to remove (default: the one exported by `login`)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,
}

pub fn run(oc_path: Option<&Path>, args: LogoutArgs) -> Result<()> {
    let kubeconfig = args.kubeconfig.as_deref();

    let runner = match super::resolve_runner(oc_path) {
        Ok(runner) => runner,
        // Nothing to log out of, but the kubeconfig still goes.
        Err(OcExecError::NotFound(name)) => {
            warn!(executable = %name, "oc not found, skipping logout");
            if let Some(path) = kubeconfig {
                io::remove_kubeconfig(path)?;
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let rt = super::runtime()?;
    rt.block_on(LogoutWorkflow::new(&runner).run(kubeconfig))
        .context("logout failed")?;
    Ok(())
}
