//! Persisted qmd directory commands

use crate::app::{DirAction, DirArgs, OutputFormat};
use anyhow::Result;
use qmd_remote_core::ConfigStore;

pub async fn run(args: DirArgs, store: &ConfigStore, format: OutputFormat) -> Result<()> {
    match args.action {
        DirAction::Set { path } => {
            store.save_dir(&path)?;
            println!("Saved qmd directory '{}'", path.display());
        }
        DirAction::Show => {
            let dir = store.load_dir();
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "qmdDir": dir }));
                }
                OutputFormat::Cli => match dir {
                    Some(dir) => println!("{}", dir.display()),
                    None => println!("No qmd directory saved"),
                },
            }
        }
        DirAction::Clear => {
            store.clear_dir()?;
            println!("Cleared qmd directory");
        }
    }
    Ok(())
}
