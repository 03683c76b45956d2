//! Prerequisite secrets created before the components are deployed.

use crate::error::ClusterError;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use rand::Rng;
use rand::distributions::Alphanumeric;
use reana_backend::{Outcome, SecretStore};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Length of generated secret values
const GENERATED_VALUE_LENGTH: usize = 32;

/// Where a secret value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Random alphanumeric value
    Generated,
    /// Asked from the operator, with an optional default
    Prompted(Option<&'static str>),
}

/// One key of a prerequisite secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretKey {
    pub name: &'static str,
    pub source: ValueSource,
}

/// A secret the components expect to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerequisiteSecret {
    pub name: &'static str,
    pub keys: &'static [SecretKey],
}

/// Secrets created by `init` and optionally deleted by `down`
pub const PREREQUISITE_SECRETS: &[PrerequisiteSecret] = &[
    PrerequisiteSecret {
        name: "reana-db-secrets",
        keys: &[
            SecretKey { name: "user", source: ValueSource::Generated },
            SecretKey { name: "password", source: ValueSource::Generated },
        ],
    },
    PrerequisiteSecret {
        name: "reana-cern-sso-secrets",
        keys: &[
            SecretKey { name: "CERN_CONSUMER_KEY", source: ValueSource::Prompted(None) },
            SecretKey { name: "CERN_CONSUMER_SECRET", source: ValueSource::Prompted(None) },
        ],
    },
    PrerequisiteSecret {
        name: "reana-cern-gitlab-secrets",
        keys: &[
            SecretKey { name: "REANA_GITLAB_OAUTH_APP_ID", source: ValueSource::Prompted(None) },
            SecretKey { name: "REANA_GITLAB_OAUTH_APP_SECRET", source: ValueSource::Prompted(None) },
            SecretKey { name: "REANA_GITLAB_HOST", source: ValueSource::Prompted(Some("gitlab.cern.ch")) },
        ],
    },
];

/// Supplies the values of prerequisite secrets
pub trait SecretValues {
    fn value(&mut self, secret: &str, key: &SecretKey) -> Result<String, ClusterError>;
}

/// Random values for generated keys, terminal prompts for the rest
#[derive(Debug, Default)]
pub struct InteractiveSecretValues;

impl SecretValues for InteractiveSecretValues {
    fn value(&mut self, secret: &str, key: &SecretKey) -> Result<String, ClusterError> {
        match key.source {
            ValueSource::Generated => Ok(generate_value()),
            ValueSource::Prompted(default) => {
                let theme = ColorfulTheme::default();
                let mut input = Input::<String>::with_theme(&theme)
                    .with_prompt(format!("{secret}: {}", key.name))
                    .allow_empty(true);
                if let Some(default) = default {
                    input = input.default(default.to_string());
                }
                input.interact_text().map_err(|e| ClusterError::Prompt(e.to_string()))
            }
        }
    }
}

/// Fixed values, falling back to prompt defaults and generated values.
///
/// Used where no terminal is available.
#[derive(Debug, Default)]
pub struct FixedSecretValues {
    values: BTreeMap<String, String>,
}

impl FixedSecretValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `key` in every secret declaring it
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SecretValues for FixedSecretValues {
    fn value(&mut self, _secret: &str, key: &SecretKey) -> Result<String, ClusterError> {
        if let Some(value) = self.values.get(key.name) {
            return Ok(value.clone());
        }
        Ok(match key.source {
            ValueSource::Generated => generate_value(),
            ValueSource::Prompted(default) => default.unwrap_or_default().to_string(),
        })
    }
}

fn generate_value() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_VALUE_LENGTH)
        .map(char::from)
        .collect()
}

/// Create the prerequisite secrets that do not exist yet.
///
/// Existing secrets are left untouched and their values are not asked for.
pub async fn create_prerequisite_secrets<S: SecretStore + ?Sized>(
    store: &S,
    values: &mut dyn SecretValues,
    namespace: &str,
) -> Result<(), ClusterError> {
    for secret in PREREQUISITE_SECRETS {
        if store.secret_exists(secret.name, namespace).await? {
            info!("Secret {} already exists, leaving it untouched", secret.name);
            continue;
        }

        let mut data = BTreeMap::new();
        for key in secret.keys {
            data.insert(key.name.to_string(), values.value(secret.name, key)?);
        }

        match store.create_secret(secret.name, namespace, &data).await? {
            Outcome::AlreadyExists => info!("Secret {} already exists", secret.name),
            _ => info!("Created secret {}", secret.name),
        }
    }
    Ok(())
}

/// Delete the prerequisite secrets, logging failures
pub async fn delete_prerequisite_secrets<S: SecretStore + ?Sized>(store: &S, namespace: &str) {
    for secret in PREREQUISITE_SECRETS {
        match store.delete_secret(secret.name, namespace).await {
            Ok(Outcome::Applied) => info!("Deleted secret {}", secret.name),
            Ok(_) => info!("Secret {} was already deleted", secret.name),
            Err(e) => warn!("Failed to delete secret {}: {}", secret.name, e),
        }
    }
}
