//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qmd-remote")]
#[command(
    author,
    version,
    about = "Manage and check remote inference endpoints for qmd search"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage remote endpoint URLs
    Remote(RemoteArgs),

    /// Manage the persisted qmd directory
    Dir(DirArgs),

    /// Check endpoint liveness
    Health,

    /// Expand a query into lex/vec/hyde variants
    Expand(ExpandArgs),

    /// Embed one or more texts
    Embed(EmbedArgs),

    /// Rerank documents for a query
    Rerank(RerankArgs),
}

#[derive(Args)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub action: RemoteAction,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Set endpoint URLs; unspecified ones keep their saved value
    Set {
        #[arg(long)]
        embed_url: Option<String>,
        #[arg(long)]
        rerank_url: Option<String>,
        #[arg(long)]
        generate_url: Option<String>,
        #[arg(long)]
        generate_model: Option<String>,
    },
    /// Show saved endpoint URLs
    Show,
    /// Remove saved endpoint URLs
    Clear,
}

#[derive(Args)]
pub struct DirArgs {
    #[command(subcommand)]
    pub action: DirAction,
}

#[derive(Subcommand)]
pub enum DirAction {
    /// Save the qmd directory
    Set { path: PathBuf },
    /// Show the saved qmd directory
    Show,
    /// Forget the saved qmd directory
    Clear,
}

#[derive(Args)]
pub struct ExpandArgs {
    /// Search query
    pub query: Vec<String>,

    /// Background hint for the expansion
    #[arg(long)]
    pub context: Option<String>,

    /// Skip lexical variants
    #[arg(long)]
    pub no_lex: bool,
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Texts to embed
    #[arg(required = true)]
    pub texts: Vec<String>,
}

#[derive(Args)]
pub struct RerankArgs {
    /// Search query
    pub query: String,

    /// Document text (repeatable)
    #[arg(short, long = "doc", required = true)]
    pub docs: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
