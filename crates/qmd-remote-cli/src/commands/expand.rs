//! Query expansion command

use crate::app::{ExpandArgs, OutputFormat};
use anyhow::{bail, Result};
use qmd_remote_core::{with_session, ConfigStore, ExpandOptions};

pub async fn run(args: ExpandArgs, store: &ConfigStore, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        bail!("Query must not be empty");
    }

    let options = ExpandOptions {
        context: args.context,
        include_lexical: !args.no_lex,
    };

    let backend = super::remote_backend(store)?;
    let queries = with_session(backend, |session| async move {
        session.expand_query(&query, &options).await
    })
    .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&queries)?),
        OutputFormat::Cli => {
            for q in &queries {
                println!("{}: {}", q.kind.as_str(), q.text);
            }
        }
    }
    Ok(())
}
