//! Rerank command

use crate::app::{OutputFormat, RerankArgs};
use anyhow::Result;
use qmd_remote_core::{with_session, ConfigStore, RerankDocument, RerankOptions};

pub async fn run(args: RerankArgs, store: &ConfigStore, format: OutputFormat) -> Result<()> {
    // Documents are identified by their position on the command line
    let documents: Vec<RerankDocument> = args
        .docs
        .iter()
        .enumerate()
        .map(|(i, text)| RerankDocument::new(format!("#{}", i), text.clone()))
        .collect();

    let backend = super::remote_backend(store)?;
    let query = args.query;
    let result = with_session(backend, |session| async move {
        session
            .rerank(&query, &documents, &RerankOptions::default())
            .await
    })
    .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Cli => {
            if result.source.is_fallback() {
                eprintln!("Reranking unavailable ({}), showing input order", result.model);
            }
            for r in &result.results {
                println!("{:.3}  {}  {}", r.score, r.file, args.docs[r.index]);
            }
        }
    }
    Ok(())
}
