use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the secret store collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("no secret found for account")]
    NotFound,

    #[error("invalid secret format")]
    InvalidFormat,

    #[error("secret store failed: {0}")]
    StorageFailed(String),
}

/// Secure credential storage seam.
///
/// Production wires a platform keystore; tests and the demo binary use
/// [`InMemorySecretStore`].
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, account: &str) -> Result<String, SecretError>;
    async fn put(&self, account: &str, secret: &str) -> Result<(), SecretError>;
    async fn delete(&self, account: &str) -> Result<(), SecretError>;
    async fn exists(&self, account: &str) -> bool;
}

/// Process-local secret store
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, account: &str) -> Result<String, SecretError> {
        self.secrets
            .read()
            .await
            .get(account)
            .cloned()
            .ok_or(SecretError::NotFound)
    }

    async fn put(&self, account: &str, secret: &str) -> Result<(), SecretError> {
        if secret.is_empty() {
            return Err(SecretError::InvalidFormat);
        }

        self.secrets
            .write()
            .await
            .insert(account.to_string(), secret.to_string());
        Ok(())
    }

    async fn delete(&self, account: &str) -> Result<(), SecretError> {
        self.secrets.write().await.remove(account);
        Ok(())
    }

    async fn exists(&self, account: &str) -> bool {
        self.secrets.read().await.contains_key(account)
    }
}
