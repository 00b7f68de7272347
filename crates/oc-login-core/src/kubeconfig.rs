//! Read side of the kubeconfig produced by `oc config view`, and the pass
//! that registers its secret-bearing values for masking.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{LoginError, Result};
use crate::mask::SecretMasker;

// ---------------------------------------------------------------------------
// Document shape
// ---------------------------------------------------------------------------

/// The parts of a kubeconfig this crate looks at. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Kubeconfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<NamedContext>,
    #[serde(default, rename = "current-context")]
    pub current_context: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedCluster {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub server: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub context: Context,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct User {
    #[serde(default)]
    pub client_certificate_data: Option<String>,
    #[serde(default)]
    pub client_key_data: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// `oc` prints `users: null` for an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Kubeconfig {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(LoginError::Parse("kubeconfig is empty".into()));
        }
        let parsed: Option<Kubeconfig> = serde_yaml::from_str(raw)
            .map_err(|e| LoginError::Parse(format!("could not load kubeconfig as YAML: {e}")))?;
        parsed.ok_or_else(|| LoginError::Parse("kubeconfig is empty".into()))
    }

    /// Cluster names referenced by contexts, in document order.
    pub fn context_cluster_names(&self) -> impl Iterator<Item = &str> {
        self.contexts
            .iter()
            .filter_map(|c| c.context.cluster.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Secret-bearing user values, paired with the key they came from.
    pub fn user_secrets(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.users.iter().flat_map(|u| {
            [
                ("client-certificate-data", u.user.client_certificate_data.as_deref()),
                ("client-key-data", u.user.client_key_data.as_deref()),
                ("token", u.user.token.as_deref()),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        })
    }
}

// ---------------------------------------------------------------------------
// Secret redaction
// ---------------------------------------------------------------------------

/// Register every secret in `raw` with `masker`.
///
/// Must run before the document, or anything derived from it, is logged.
/// Cluster names are masked too unless `reveal_cluster_name` is set.
pub fn mask_secrets<M: SecretMasker + ?Sized>(
    raw: &str,
    reveal_cluster_name: bool,
    masker: &M,
) -> Result<()> {
    let kubeconfig = Kubeconfig::parse(raw)?;

    if !reveal_cluster_name {
        for cluster in kubeconfig.context_cluster_names() {
            debug!("masking cluster name");
            masker.add_mask(cluster);
        }
    }

    for (key, value) in kubeconfig.user_secrets() {
        debug!(key, "masking user secret");
        masker.add_mask(value);
    }

    Ok(())
}
