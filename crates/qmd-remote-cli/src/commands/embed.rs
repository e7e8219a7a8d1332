//! Embed command

use crate::app::{EmbedArgs, OutputFormat};
use anyhow::Result;
use qmd_remote_core::{with_session, ConfigStore};

pub async fn run(args: EmbedArgs, store: &ConfigStore, format: OutputFormat) -> Result<()> {
    let backend = super::remote_backend(store)?;
    let texts = args.texts;
    let results = with_session(backend, |session| {
        let texts = texts.clone();
        async move { session.embed_batch(&texts).await }
    })
    .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Cli => {
            for (text, result) in texts.iter().zip(&results) {
                match result {
                    Some(r) => println!("{} dims ({})  {}", r.embedding.len(), r.model, text),
                    None => println!("unavailable  {}", text),
                }
            }
        }
    }
    Ok(())
}
