//! Endpoint liveness checks

use super::RemoteLlm;
use crate::config::Capability;
use serde::{Deserialize, Serialize};

/// Liveness of each remote capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub embed: bool,
    pub rerank: bool,
    pub generate: bool,
}

impl HealthStatus {
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::Embed => self.embed,
            Capability::Rerank => self.rerank,
            Capability::Generate => self.generate,
        }
    }

    pub fn all_healthy(&self) -> bool {
        self.embed && self.rerank && self.generate
    }
}

impl RemoteLlm {
    /// Call `GET {url}/health` for every configured endpoint concurrently
    ///
    /// Unconfigured endpoints report unhealthy without a request.
    pub async fn check_health(&self) -> HealthStatus {
        let (embed, rerank, generate) = tokio::join!(
            self.ping(Capability::Embed),
            self.ping(Capability::Rerank),
            self.ping(Capability::Generate),
        );

        HealthStatus {
            embed,
            rerank,
            generate,
        }
    }

    async fn ping(&self, capability: Capability) -> bool {
        let Some(base) = self.config().url(capability) else {
            return false;
        };

        let url = format!("{}/health", base);
        match self.http_client.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!("{} health check returned HTTP {}", capability, response.status());
                false
            }
            Err(e) => {
                tracing::debug!("{} health check failed: {}", capability, e);
                false
            }
        }
    }
}
