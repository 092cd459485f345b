//! Validate API Key use case
//!
//! Checks a key against the completion endpoint off the UI thread. The
//! result comes back as a [`KeyValidationEvent`] on a channel; the receiver
//! decides whether to persist the key.

use crate::ports::completion_gateway::{CompletionGateway, KeyStatus};
use quiz_domain::ApiKey;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Outcome of a background key check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValidationEvent {
    pub key: ApiKey,
    pub status: KeyStatus,
}

/// Use case for validating an API key
pub struct ValidateApiKeyUseCase<G: CompletionGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: CompletionGateway + 'static> Clone for ValidateApiKeyUseCase<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: CompletionGateway + 'static> ValidateApiKeyUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, key: &ApiKey) -> KeyStatus {
        debug!("Validating API key {}", key.masked());
        let status = self.gateway.validate_key(key).await;
        info!("API key validation finished: {:?}", status);
        status
    }

    /// Run the check on a worker task and report through `sender`.
    ///
    /// A closed receiver is not an error: nobody is waiting for the answer.
    pub fn spawn(
        &self,
        key: ApiKey,
        sender: mpsc::UnboundedSender<KeyValidationEvent>,
    ) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let status = this.execute(&key).await;
            let _ = sender.send(KeyValidationEvent { key, status });
        })
    }
}
