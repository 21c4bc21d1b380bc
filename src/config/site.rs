//! Site configuration (_config.yml)

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    /// IANA timezone name used for dates without an offset
    pub timezone: String,

    // Directory
    pub source_dir: String,
    pub posts_dir: String,
    pub tabs_dir: String,
    pub drafts_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub new_post_name: String,
    pub show_drafts: bool,
    pub future: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            author: None,
            timezone: String::new(),

            source_dir: ".".to_string(),
            posts_dir: "_posts".to_string(),
            tabs_dir: "_tabs".to_string(),
            drafts_dir: "_drafts".to_string(),
            exclude: Vec::new(),

            new_post_name: ":year-:month-:day-:title.md".to_string(),
            show_drafts: false,
            future: true,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", path))?;

        // Surface a bad timezone now rather than on the first naive date
        config.tz()?;
        config.exclude_patterns()?;

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// The configured timezone, `None` when unset (dates default to UTC)
    pub fn tz(&self) -> Result<Option<Tz>> {
        let name = self.timezone.trim();
        if name.is_empty() {
            return Ok(None);
        }
        name.parse::<Tz>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", name, e))
    }

    /// Compiled `exclude` glob patterns
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern {:?}", p))
            })
            .collect()
    }
}
