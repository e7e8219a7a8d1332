//! CLI command handlers

pub mod dir;
pub mod embed;
pub mod expand;
pub mod health;
pub mod remote;
pub mod rerank;

use anyhow::Result;
use qmd_remote_core::{ConfigStore, EndpointConfig, Llm, RemoteLlm};
use std::sync::Arc;

/// Build the remote client from environment and saved config
fn remote_client(store: &ConfigStore) -> Result<RemoteLlm> {
    Ok(RemoteLlm::from_store(EndpointConfig::default(), store)?)
}

fn remote_backend(store: &ConfigStore) -> Result<Arc<dyn Llm>> {
    Ok(Arc::new(remote_client(store)?))
}
