//! Health command

use crate::app::OutputFormat;
use anyhow::Result;
use qmd_remote_core::{Capability, ConfigStore};

pub async fn run(store: &ConfigStore, format: OutputFormat) -> Result<()> {
    let client = super::remote_client(store)?;
    let status = client.check_health().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Cli => {
            for capability in Capability::ALL {
                let state = match (client.config().url(capability), status.get(capability)) {
                    (None, _) => "not configured",
                    (Some(_), true) => "ok",
                    (Some(_), false) => "unreachable",
                };
                println!("{:<10} {}", format!("{}:", capability), state);
            }
        }
    }
    Ok(())
}
