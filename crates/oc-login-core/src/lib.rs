//! Core of `oc-login`: resolves credentials, drives `oc` through the login
//! pipeline, redacts the resulting kubeconfig's secrets and reports back to
//! the CI runner.

pub mod actions;
pub mod auth;
pub mod error;
pub mod inputs;
pub mod io;
pub mod kubeconfig;
pub mod mask;
pub mod paths;
pub mod workflow;

pub use actions::{ActionsHost, GithubActions, RecordingHost};
pub use auth::{AuthDescriptor, Credentials};
pub use error::{LoginError, Result};
pub use inputs::LoginInputs;
pub use mask::{RedactingMakeWriter, SecretMasker, SecretRegistry};
pub use workflow::{LoginOutcome, LoginWorkflow, LogoutWorkflow, Stage};
