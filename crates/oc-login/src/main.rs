mod cmd;

use clap::{Parser, Subcommand};
use cmd::{login::LoginArgs, logout::LogoutArgs};
use oc_login_core::actions::escape_data;
use oc_login_core::{RedactingMakeWriter, SecretRegistry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "oc-login",
    about = "Log in to an OpenShift cluster with oc and export a kubeconfig for later CI steps",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the oc executable (default: search PATH)
    #[arg(long, global = true, env = "OC_PATH")]
    oc_path: Option<PathBuf>,

    /// Enable debug logging (also enabled by RUNNER_DEBUG=1)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, optionally set the namespace, and write the kubeconfig
    Login(LoginArgs),

    /// Log out and remove the kubeconfig written by `login`
    Logout(LogoutArgs),
}

fn main() {
    let cli = Cli::parse();

    let debug = cli.verbose || std::env::var("RUNNER_DEBUG").as_deref() == Ok("1");
    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Every secret registered during the run is scrubbed from our own logs.
    let registry = SecretRegistry::new();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(RedactingMakeWriter::stderr(registry.clone()))
        .init();

    let oc_path = cli.oc_path.as_deref();
    let result = match cli.command {
        Commands::Login(args) => cmd::login::run(oc_path, &registry, args),
        Commands::Logout(args) => cmd::logout::run(oc_path, args),
    };

    if let Err(e) = result {
        let message = registry.redact(&format!("{e:#}"));
        println!("::error::{}", escape_data(&message));
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}
