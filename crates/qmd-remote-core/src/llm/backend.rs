//! Backend selection and the process-wide default remote client

use super::{Llm, RemoteLlm};
use crate::config::{ConfigStore, EndpointConfig};
use crate::error::{QmdError, Result};
use lazy_static::lazy_static;
use std::sync::{Arc, PoisonError, RwLock};

/// Which inference backend serves a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// HTTP endpoints from [`EndpointConfig`]
    Remote,
    /// In-process engine supplied by the caller
    Local,
}

impl Backend {
    /// Remote when any endpoint URL is configured, local otherwise
    pub fn from_config(config: &EndpointConfig) -> Self {
        if config.is_empty() {
            Backend::Local
        } else {
            Backend::Remote
        }
    }
}

/// Build the backend `config` selects
///
/// `local` is only consulted when no remote endpoint is configured.
pub fn select_backend(
    config: EndpointConfig,
    local: Option<Arc<dyn Llm>>,
) -> Result<Arc<dyn Llm>> {
    match Backend::from_config(&config) {
        Backend::Remote => {
            tracing::debug!("Using remote inference backend");
            Ok(Arc::new(RemoteLlm::new(config)?))
        }
        Backend::Local => local.ok_or_else(|| {
            QmdError::Config(
                "No remote endpoints configured and no local backend available".to_string(),
            )
        }),
    }
}

lazy_static! {
    static ref DEFAULT_REMOTE: RwLock<Option<Arc<RemoteLlm>>> = RwLock::new(None);
}

/// Get or create the default remote client from the environment and persisted config
pub fn default_remote() -> Result<Arc<RemoteLlm>> {
    if let Some(client) = DEFAULT_REMOTE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Ok(client.clone());
    }

    let mut slot = DEFAULT_REMOTE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(client) = slot.as_ref() {
        return Ok(client.clone());
    }

    let client = Arc::new(RemoteLlm::from_store(
        EndpointConfig::default(),
        &ConfigStore::open_default(),
    )?);
    *slot = Some(client.clone());
    Ok(client)
}

/// Replace the default remote client
pub fn set_default_remote(client: Arc<RemoteLlm>) {
    *DEFAULT_REMOTE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(client);
}

/// Drop the default remote client; the next [`default_remote`] rebuilds it
pub fn reset_default_remote() -> Option<Arc<RemoteLlm>> {
    DEFAULT_REMOTE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}
