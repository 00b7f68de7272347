use std::fmt;

/// Input names, as declared by the action and used in error messages.
pub mod names {
    pub const SERVER_URL: &str = "openshift_server_url";
    pub const TOKEN: &str = "openshift_token";
    pub const USERNAME: &str = "openshift_username";
    pub const PASSWORD: &str = "openshift_password";
    pub const SKIP_TLS_VERIFY: &str = "insecure_skip_tls_verify";
    pub const CERTIFICATE_AUTHORITY_DATA: &str = "certificate_authority_data";
    pub const NAMESPACE: &str = "namespace";
    pub const REVEAL_CLUSTER_NAME: &str = "reveal_cluster_name";
    pub const SKIP_KUBECONFIG: &str = "skip_kubeconfig";
}

/// Output names reported to the CI host.
pub mod outputs {
    pub const KUBECONFIG_PATH: &str = "kubeconfig_path";
}

/// Raw inputs for a login run. Empty strings count as absent.
#[derive(Clone, Default)]
pub struct LoginInputs {
    pub server_url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skip_tls_verify: bool,
    pub certificate_authority_data: Option<String>,
    pub namespace: Option<String>,
    pub reveal_cluster_name: bool,
    pub skip_kubeconfig: bool,
}

impl fmt::Debug for LoginInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |v: &Option<String>| present(v).map(|_| "[REDACTED]");
        f.debug_struct("LoginInputs")
            .field("server_url", &self.server_url)
            .field("token", &hidden(&self.token))
            .field("username", &self.username)
            .field("password", &hidden(&self.password))
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field(
                "certificate_authority_data",
                &self.certificate_authority_data.is_some(),
            )
            .field("namespace", &self.namespace)
            .field("reveal_cluster_name", &self.reveal_cluster_name)
            .field("skip_kubeconfig", &self.skip_kubeconfig)
            .finish()
    }
}

/// The value, unless it is absent or blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Boolean inputs are set only by the literal `true`.
pub fn is_true(value: Option<&str>) -> bool {
    value.map(str::trim) == Some("true")
}
