//! Remote endpoint configuration commands

use crate::app::{OutputFormat, RemoteAction, RemoteArgs};
use anyhow::Result;
use qmd_remote_core::{Capability, ConfigStore, EndpointConfig};

pub async fn run(args: RemoteArgs, store: &ConfigStore, format: OutputFormat) -> Result<()> {
    match args.action {
        RemoteAction::Set {
            embed_url,
            rerank_url,
            generate_url,
            generate_model,
        } => {
            let update = EndpointConfig {
                embed_url,
                rerank_url,
                generate_url,
                generate_model,
            }
            .normalized();
            update.validate()?;
            let config = update.overlay(&store.load());
            store.save(&config)?;
            println!("Saved remote config to {}", store.path().display());
        }
        RemoteAction::Show => {
            let config = store.load();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Cli => print_config(&config),
            }
        }
        RemoteAction::Clear => {
            store.clear()?;
            println!("Cleared remote config");
        }
    }
    Ok(())
}

fn print_config(config: &EndpointConfig) {
    if config.is_empty() {
        println!("No remote endpoints configured");
    }
    for capability in Capability::ALL {
        println!(
            "{:<10} {}",
            format!("{}:", capability),
            config.url(capability).unwrap_or("-")
        );
    }
    if let Some(ref model) = config.generate_model {
        println!("{:<10} {}", "model:", model);
    }
}
