//! The Secret Store Client (§4.1): read-only access to named string parameters.
//! Lookups are independent and never mutate; a missing parameter is `Ok(None)`,
//! never an error. Modeled as a trait so the default-substitution logic in
//! `read_or_default` is testable without a live AWS SSM client.

use std::future::Future;

use crate::errors::SecretStoreError;

pub trait SecretStore {
    fn get_parameter(&self, name: &str) -> impl Future<Output = Result<Option<String>, SecretStoreError>> + Send;
}

pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSecretStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

impl SecretStore for SsmSecretStore {
    async fn get_parameter(&self, name: &str) -> Result<Option<String>, SecretStoreError> {
        match self.client.get_parameter().name(name).send().await {
            Ok(output) => Ok(output.parameter.and_then(|parameter| parameter.value)),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_parameter_not_found() {
                    Ok(None)
                } else {
                    Err(SecretStoreError::Transport(service_err.to_string()))
                }
            }
        }
    }
}

/// Read a parameter, substituting `default` whenever it is absent or the lookup
/// itself fails (§4.1, §7 *SecretMissing*) — a worker run never aborts because a
/// single secret is unreachable, it just logs and carries on with the default.
pub async fn read_or_default(store: &impl SecretStore, name: &str, default: &str) -> String {
    match store.get_parameter(name).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::warn!(parameter = name, "secret parameter not found, using default");
            default.to_string()
        }
        Err(err) => {
            tracing::warn!(parameter = name, error = %err, "secret store lookup failed, using default");
            default.to_string()
        }
    }
}
