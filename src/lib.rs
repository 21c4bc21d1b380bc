//! corpus-rs: front-matter tooling for a Jekyll-style blog
//!
//! This crate reads the posts and navigation tabs of a static blog, validates
//! their front matter the way the site generator consumes it, and writes new
//! units with well-formed headers. Rendering the bodies is left to the
//! generator.

pub mod commands;
pub mod config;
pub mod content;

use anyhow::Result;
use std::path::Path;

/// The main corpus handle
#[derive(Clone)]
pub struct Corpus {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Source directory
    pub source_dir: std::path::PathBuf,
    /// Posts directory
    pub posts_dir: std::path::PathBuf,
    /// Navigation tabs directory
    pub tabs_dir: std::path::PathBuf,
    /// Drafts directory
    pub drafts_dir: std::path::PathBuf,
}

impl Corpus {
    /// Create a new corpus from a site directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let source_dir = match config.source_dir.trim() {
            "" | "." => base_dir.clone(),
            dir => base_dir.join(dir),
        };
        let posts_dir = source_dir.join(&config.posts_dir);
        let tabs_dir = source_dir.join(&config.tabs_dir);
        let drafts_dir = source_dir.join(&config.drafts_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            posts_dir,
            tabs_dir,
            drafts_dir,
        })
    }

    /// Validate every unit
    pub fn check(&self, strict: bool) -> Result<()> {
        commands::check::run(self, strict)
    }
}
