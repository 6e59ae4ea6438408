use clap::{Args, Parser, Subcommand};

use crate::navigation::NavigationParameters;

#[derive(Parser)]
#[command(name = "dirview")]
#[command(about = "Browse a repository directory and its recent commits on a code-search server")]
pub struct Cli {
    /// Path to a JSON configuration file (defaults to $DIRVIEW_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Base URL of the code-search server (overrides the configuration)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Repository path, e.g. github.com/gorilla/mux
    pub repo: String,
    /// Commit or revision to resolve the tree at
    #[arg(short, long, default_value = "HEAD")]
    pub commit: String,
    /// Directory inside the repository (empty for the root)
    #[arg(short, long, default_value = "")]
    pub path: String,
    /// Revision label to scope searches and links with
    #[arg(short, long)]
    pub rev: Option<String>,
    /// Repository description shown under the root header
    #[arg(short, long)]
    pub description: Option<String>,
}

impl LocationArgs {
    pub fn to_parameters(&self) -> NavigationParameters {
        NavigationParameters {
            repo_path: self.repo.clone(),
            commit_id: self.commit.clone(),
            file_path: self.path.trim_matches('/').to_string(),
            rev: self.rev.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive directory page
    Browse {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Load the page once and print it as text
    Show {
        #[command(flatten)]
        location: LocationArgs,
        /// Output file for the rendered page (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Terminal width for rendering
        #[arg(long, default_value = "100")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "40")]
        height: u16,
        /// Log to stderr
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the search URL for a query scoped to a directory
    Search {
        #[command(flatten)]
        location: LocationArgs,
        /// Query text to append to the scope
        query: String,
        /// Log to stderr
        #[arg(short, long)]
        verbose: bool,
    },
}
