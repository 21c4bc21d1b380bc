//! Create a new post, draft or tab

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::content::date::format_header_date;
use crate::content::loader::ContentLoader;
use crate::content::{FrontMatter, UnitKind};
use crate::Corpus;

/// Settings for a new unit
#[derive(Debug, Clone)]
pub struct NewOptions {
    pub layout: UnitKind,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub pin: bool,
    /// File name (without extension) overriding `new_post_name`
    pub path: Option<String>,
}

impl Default for NewOptions {
    fn default() -> Self {
        Self {
            layout: UnitKind::Post,
            tags: Vec::new(),
            categories: Vec::new(),
            pin: false,
            path: None,
        }
    }
}

impl FromStr for UnitKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "post" => Ok(UnitKind::Post),
            "draft" => Ok(UnitKind::Draft),
            "tab" | "page" => Ok(UnitKind::Tab),
            other => Err(anyhow!(
                "Unknown layout: {}. Available: post, draft, tab",
                other
            )),
        }
    }
}

/// Current time in the site timezone, to the second
fn now(corpus: &Corpus) -> Result<DateTime<FixedOffset>> {
    let now = Utc::now().with_nanosecond(0).unwrap_or_else(Utc::now);
    Ok(match corpus.config.tz()? {
        Some(tz) => now.with_timezone(&tz).fixed_offset(),
        None => now.fixed_offset(),
    })
}

/// Create a new post/draft/tab and return its path
pub fn create_unit(corpus: &Corpus, title: &str, options: &NewOptions) -> Result<PathBuf> {
    if title.trim().is_empty() {
        anyhow::bail!("Title must not be empty");
    }

    let now = now(corpus)?;
    let slug = slug::slugify(title);

    let (target_dir, filename) = match options.layout {
        UnitKind::Post => {
            let filename = match &options.path {
                Some(p) => format!("{}.md", p),
                None => corpus
                    .config
                    .new_post_name
                    .replace(":title", &slug)
                    .replace(":year", &now.format("%Y").to_string())
                    .replace(":month", &now.format("%m").to_string())
                    .replace(":day", &now.format("%d").to_string())
                    .replace(":i_month", &now.format("%-m").to_string())
                    .replace(":i_day", &now.format("%-d").to_string()),
            };
            (corpus.posts_dir.clone(), filename)
        }
        UnitKind::Draft => {
            let stem = options.path.clone().unwrap_or(slug);
            (corpus.drafts_dir.clone(), format!("{}.md", stem))
        }
        UnitKind::Tab => {
            let stem = options.path.clone().unwrap_or(slug);
            (corpus.tabs_dir.clone(), format!("{}.md", stem))
        }
    };

    let file_path = target_dir.join(&filename);

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut fm = FrontMatter {
        title: Some(title.to_string()),
        date: Some(format_header_date(&now)),
        tags: options.tags.clone(),
        categories: options.categories.clone(),
        pin: options.pin,
        ..Default::default()
    };
    if options.layout == UnitKind::Tab {
        fm.order = Some(next_tab_order(corpus)?);
    } else {
        fm.author = corpus.config.author.clone();
    }

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, fm.to_header()?)?;

    tracing::info!("Created {} {:?}", options.layout, file_path);
    Ok(file_path)
}

/// One past the highest `order` among existing tabs
fn next_tab_order(corpus: &Corpus) -> Result<i64> {
    let report = ContentLoader::new(corpus)?.load_all_with_drafts(false);
    Ok(report
        .of_kind(UnitKind::Tab)
        .filter_map(|t| t.order)
        .max()
        .map_or(1, |max| max + 1))
}

/// Run the new command
pub fn run(corpus: &Corpus, title: &str, options: &NewOptions) -> Result<()> {
    let path = create_unit(corpus, title, options)?;
    println!("Created: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path()).unwrap();
        let options = NewOptions {
            tags: vec!["rust".to_string()],
            categories: vec!["Programming".to_string()],
            pin: true,
            ..Default::default()
        };

        let path = create_unit(&corpus, "Hello Rust World", &options).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-hello-rust-world.md"));
        assert!(path.starts_with(&corpus.posts_dir));

        let loader = ContentLoader::new(&corpus).unwrap();
        let unit = loader.load_file(&path).unwrap();
        assert_eq!(unit.kind, UnitKind::Post);
        assert_eq!(unit.title, "Hello Rust World");
        assert_eq!(unit.tags, vec!["rust"]);
        assert_eq!(unit.categories, vec!["Programming"]);
        assert!(unit.pin);
        assert_eq!(unit.slug, "hello-rust-world");
        assert_eq!(unit.filename_date(), Some(unit.date.date_naive()));
    }

    #[test]
    fn test_new_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path()).unwrap();
        let options = NewOptions {
            layout: UnitKind::Draft,
            ..Default::default()
        };

        let path = create_unit(&corpus, "Work in progress", &options).unwrap();
        assert!(path.ends_with("_drafts/work-in-progress.md"));
        assert!(create_unit(&corpus, "Work in progress", &options).is_err());
    }

    #[test]
    fn test_new_tab_takes_next_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("_tabs")).unwrap();
        fs::write(
            root.join("_tabs/archives.md"),
            "---\ntitle: Archives\ndate: 2024-01-01\norder: 3\n---\n",
        )
        .unwrap();

        let corpus = Corpus::new(root).unwrap();
        let options = NewOptions {
            layout: "tab".parse().unwrap(),
            ..Default::default()
        };
        let path = create_unit(&corpus, "About", &options).unwrap();
        assert!(path.ends_with("_tabs/about.md"));

        let unit = ContentLoader::new(&corpus).unwrap().load_file(&path).unwrap();
        assert_eq!(unit.kind, UnitKind::Tab);
        assert_eq!(unit.order, Some(4));
    }

    #[test]
    fn test_new_uses_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("_config.yml"),
            "timezone: Asia/Shanghai\nauthor: someone\nnew_post_name: \":title.md\"\n",
        )
        .unwrap();

        let corpus = Corpus::new(root).unwrap();
        let path = create_unit(&corpus, "Plain Name", &NewOptions::default()).unwrap();
        assert!(path.ends_with("_posts/plain-name.md"));

        let unit = ContentLoader::new(&corpus).unwrap().load_file(&path).unwrap();
        assert_eq!(unit.author.as_deref(), Some("someone"));
        assert_eq!(unit.date.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_bad_layout_and_title() {
        assert!("gallery".parse::<UnitKind>().is_err());

        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path()).unwrap();
        assert!(create_unit(&corpus, "   ", &NewOptions::default()).is_err());
    }
}
