use std::path::Path;

use oc_exec::{Flag, OptionSet};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{LoginError, Result};
use crate::inputs::{names, present, LoginInputs};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Credentials {
    Token(SecretString),
    UsernamePassword {
        username: String,
        password: SecretString,
    },
}

// ---------------------------------------------------------------------------
// AuthDescriptor
// ---------------------------------------------------------------------------

/// Everything `oc login` needs. Built once per run, consumed by the login step.
#[derive(Debug)]
pub struct AuthDescriptor {
    pub server_url: Option<String>,
    pub credentials: Credentials,
    pub skip_tls_verify: bool,
    pub certificate_authority_data: Option<String>,
}

impl AuthDescriptor {
    /// Resolve credentials from the run inputs. A token takes precedence over
    /// a username/password pair.
    pub fn from_inputs(inputs: &LoginInputs) -> Result<Self> {
        let server_url = present(&inputs.server_url).map(str::to_string);
        if server_url.is_some() {
            debug!("found server URL");
        }

        let credentials = if let Some(token) = present(&inputs.token) {
            debug!("found token");
            Credentials::Token(SecretString::new(token.to_string()))
        } else {
            match (present(&inputs.username), present(&inputs.password)) {
                (Some(username), Some(password)) => {
                    debug!("found username and password");
                    Credentials::UsernamePassword {
                        username: username.to_string(),
                        password: SecretString::new(password.to_string()),
                    }
                }
                _ => {
                    return Err(LoginError::Configuration(format!(
                        "required inputs are missing: either \"{}\", or both \"{}\" and \"{}\" must be set",
                        names::TOKEN,
                        names::USERNAME,
                        names::PASSWORD
                    )))
                }
            }
        };

        Ok(Self {
            server_url,
            credentials,
            skip_tls_verify: inputs.skip_tls_verify,
            certificate_authority_data: present(&inputs.certificate_authority_data)
                .map(str::to_string),
        })
    }

    /// Values that must be masked before `oc login` echoes its command line.
    pub fn secrets(&self) -> Vec<&str> {
        match &self.credentials {
            Credentials::Token(token) => vec![token.expose_secret().as_str()],
            Credentials::UsernamePassword { password, .. } => {
                vec![password.expose_secret().as_str()]
            }
        }
    }

    /// Options for `oc login`. `ca_file` is the certificate-authority file
    /// written from [`certificate_authority_data`](Self::certificate_authority_data).
    pub fn login_options(&self, ca_file: Option<&Path>) -> OptionSet {
        let mut options = match &self.credentials {
            Credentials::Token(token) => {
                OptionSet::new().with(Flag::Token, token.expose_secret().as_str())
            }
            Credentials::UsernamePassword { username, password } => OptionSet::new()
                .with(Flag::Username, username.as_str())
                .with(Flag::Password, password.expose_secret().as_str()),
        };

        options.insert(Flag::Server, self.server_url.clone());
        if self.skip_tls_verify {
            options.insert(Flag::SkipTlsVerify, Some(String::new()));
        }
        if let Some(ca_file) = ca_file {
            options.insert(
                Flag::CertificateAuthority,
                Some(ca_file.display().to_string()),
            );
        }
        options
    }

    pub fn method(&self) -> &'static str {
        match self.credentials {
            Credentials::Token(_) => "token",
            Credentials::UsernamePassword { .. } => "credentials",
        }
    }
}
