//! CLI entry point for corpus-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corpus_rs::commands;
use corpus_rs::content::UnitKind;

#[derive(Parser)]
#[command(name = "corpus")]
#[command(version)]
#[command(about = "Validate and manage the front matter of a Jekyll-style blog", long_about = None)]
struct Cli {
    /// Set the site root (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every post, draft and tab
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// List site content
    #[command(alias = "ls")]
    List {
        /// Type of content to list (post, draft, tab, tag, category)
        #[arg(default_value = "post")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new post, draft or tab
    New {
        /// Layout to use (post, draft, tab)
        #[arg(short, long, default_value = "post")]
        layout: UnitKind,

        /// Title of the new unit
        title: String,

        /// Tag to add (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Category to add (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Pin the post
        #[arg(long)]
        pin: bool,

        /// File name for the new unit, without extension
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show the normalized header of one file
    Show {
        /// File to read, relative to the site root
        file: PathBuf,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "corpus_rs=debug,info"
    } else {
        "corpus_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Check { strict } => {
            let corpus = corpus_rs::Corpus::new(&base_dir)?;
            tracing::info!("Checking content in {:?}", corpus.source_dir);
            corpus.check(strict)?;
        }

        Commands::List { r#type, json } => {
            let corpus = corpus_rs::Corpus::new(&base_dir)?;
            commands::list::run(&corpus, &r#type, json)?;
        }

        Commands::New {
            layout,
            title,
            tags,
            categories,
            pin,
            path,
        } => {
            let corpus = corpus_rs::Corpus::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            let options = commands::new::NewOptions {
                layout,
                tags,
                categories,
                pin,
                path,
            };
            commands::new::run(&corpus, &title, &options)?;
        }

        Commands::Show { file, json } => {
            let corpus = corpus_rs::Corpus::new(&base_dir)?;
            commands::show::run(&corpus, &file, json)?;
        }

        Commands::Version => {
            println!("corpus-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
