//! Content loader - enumerates posts, drafts and tabs under the source directory

use anyhow::Result;
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentUnit, FrontMatterError, UnitKind};
use crate::Corpus;

/// A unit that could not be read
#[derive(Debug)]
pub struct LoadFailure {
    /// Source file path (relative to the site root)
    pub source: String,
    pub error: LoadError,
}

/// Why a unit could not be read
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot reach file: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Everything found in one pass over the source directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully parsed units, posts and drafts first, then tabs
    pub units: Vec<ContentUnit>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// Units of one kind, in load order
    pub fn of_kind(&self, kind: UnitKind) -> impl Iterator<Item = &ContentUnit> {
        self.units.iter().filter(move |u| u.kind == kind)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads content units from the source directory
pub struct ContentLoader<'a> {
    corpus: &'a Corpus,
    tz: Option<Tz>,
    exclude: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(corpus: &'a Corpus) -> Result<Self> {
        Ok(Self {
            corpus,
            tz: corpus.config.tz()?,
            exclude: corpus.config.exclude_patterns()?,
        })
    }

    /// Load every post, tab and (when enabled) draft
    pub fn load_all(&self) -> LoadReport {
        self.load_all_with_drafts(self.corpus.config.show_drafts)
    }

    /// Load every post and tab, plus drafts when `drafts` is set
    pub fn load_all_with_drafts(&self, drafts: bool) -> LoadReport {
        let mut report = LoadReport::default();

        let mut posts = self.load_dir(&self.corpus.posts_dir, UnitKind::Post, &mut report);
        if drafts {
            posts.extend(self.load_dir(&self.corpus.drafts_dir, UnitKind::Draft, &mut report));
        }
        posts.sort_by(compare_posts);

        let mut tabs = self.load_dir(&self.corpus.tabs_dir, UnitKind::Tab, &mut report);
        tabs.sort_by(compare_tabs);

        report.units = posts;
        report.units.extend(tabs);

        tracing::debug!(
            "Loaded {} units ({} failed)",
            report.units.len(),
            report.failures.len()
        );
        report
    }

    /// Parse a single file, wherever it lives
    pub fn load_file(&self, path: &Path) -> Result<ContentUnit, LoadError> {
        let kind = self.kind_for(path);
        self.load_unit(path, kind)
    }

    fn load_dir(&self, dir: &Path, kind: UnitKind, report: &mut LoadReport) -> Vec<ContentUnit> {
        if !dir.exists() {
            tracing::debug!("No {} directory at {:?}", kind, dir);
            return Vec::new();
        }

        let mut units = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(dir, kind, err, report);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) || self.is_excluded(path) {
                continue;
            }

            match self.load_unit(path, kind) {
                Ok(unit) => units.push(unit),
                Err(error) => {
                    tracing::warn!("Failed to load {} {:?}: {}", kind, path, error);
                    report.failures.push(LoadFailure {
                        source: self.relative(path),
                        error,
                    });
                }
            }
        }

        units
    }

    /// Broken links and link loops become failures; other unreadable files are not units
    fn record_walk_error(
        &self,
        dir: &Path,
        kind: UnitKind,
        err: walkdir::Error,
        report: &mut LoadReport,
    ) {
        let path = err.path().unwrap_or(dir).to_path_buf();
        if self.is_excluded(&path) {
            return;
        }
        if err.loop_ancestor().is_none() && err.path().is_some() && !is_markdown_file(&path) {
            tracing::debug!("Skipping unreachable {:?}: {}", path, err);
            return;
        }

        tracing::warn!("Failed to load {} {:?}: {}", kind, path, err);
        report.failures.push(LoadFailure {
            source: self.relative(&path),
            error: err.into(),
        });
    }

    fn load_unit(&self, path: &Path, kind: UnitKind) -> Result<ContentUnit, LoadError> {
        let content = fs::read_to_string(path)?;
        let mut unit = ContentUnit::parse(kind, self.relative(path), &content, self.tz)?;
        unit.full_source = path.to_path_buf();
        Ok(unit)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.exclude.iter().any(|p| p.matches(&relative))
    }

    /// Guess the kind of a file from the directory it sits in
    fn kind_for(&self, path: &Path) -> UnitKind {
        let path = absolute(path);
        if path.starts_with(absolute(&self.corpus.tabs_dir)) {
            UnitKind::Tab
        } else if path.starts_with(absolute(&self.corpus.drafts_dir)) {
            UnitKind::Draft
        } else {
            UnitKind::Post
        }
    }

    /// Path relative to the site root, with `/` separators
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.corpus.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Pinned first, then newest first
fn compare_posts(a: &ContentUnit, b: &ContentUnit) -> Ordering {
    b.pin
        .cmp(&a.pin)
        .then_with(|| b.date.cmp(&a.date))
        .then_with(|| a.source.cmp(&b.source))
}

/// By `order`, unordered tabs last
fn compare_tabs(a: &ContentUnit, b: &ContentUnit) -> Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.title.cmp(&b.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn post(title: &str, date: &str, extra: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n{}---\nBody of {}.\n", title, date, extra, title)
    }

    #[test]
    fn test_load_orders_posts_and_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_posts/2024-01-01-old.md", &post("Old", "2024-01-01", ""));
        write(root, "_posts/2024-06-01-new.md", &post("New", "2024-06-01", ""));
        write(root, "_posts/2023-01-01-pinned.md", &post("Pinned", "2023-01-01", "pin: true\n"));
        write(root, "_posts/notes.txt", "not a post");
        write(root, "_tabs/about.md", &post("About", "2024-01-01", "order: 4\n"));
        write(root, "_tabs/archives.md", &post("Archives", "2024-01-01", "order: 3\n"));
        write(root, "_tabs/misc.md", &post("Misc", "2024-01-01", ""));

        let corpus = Corpus::new(root).unwrap();
        let report = ContentLoader::new(&corpus).unwrap().load_all();
        assert!(report.is_clean());

        let posts: Vec<_> = report.of_kind(UnitKind::Post).map(|u| u.title.as_str()).collect();
        assert_eq!(posts, vec!["Pinned", "New", "Old"]);

        let tabs: Vec<_> = report.of_kind(UnitKind::Tab).map(|u| u.title.as_str()).collect();
        assert_eq!(tabs, vec!["Archives", "About", "Misc"]);

        let pinned = &report.units[0];
        assert_eq!(pinned.source, "_posts/2023-01-01-pinned.md");
        assert_eq!(pinned.slug, "pinned");
    }

    #[test]
    fn test_failures_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_posts/2024-01-01-good.md", &post("Good", "2024-01-01", ""));
        write(root, "_posts/2024-01-02-bare.md", "No header at all.\n");
        write(root, "_posts/2024-01-03-baddate.md", &post("Bad", "2024-13-01", ""));

        let corpus = Corpus::new(root).unwrap();
        let report = ContentLoader::new(&corpus).unwrap().load_all();
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.failures.len(), 2);

        let bare = &report.failures[0];
        assert_eq!(bare.source, "_posts/2024-01-02-bare.md");
        assert!(matches!(
            bare.error,
            LoadError::FrontMatter(FrontMatterError::MalformedMetadata(_))
        ));
        assert!(matches!(
            report.failures[1].error,
            LoadError::FrontMatter(FrontMatterError::InvalidDate { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_posts/2024-01-01-a.md", &post("A", "2024-01-01", ""));
        std::os::unix::fs::symlink(
            root.join("_posts/missing.md"),
            root.join("_posts/2024-01-02-b.md"),
        )
        .unwrap();

        let corpus = Corpus::new(root).unwrap();
        let report = ContentLoader::new(&corpus).unwrap().load_all();
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, "_posts/2024-01-02-b.md");
        assert!(matches!(report.failures[0].error, LoadError::Walk(_)));
    }

    #[test]
    fn test_markdown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_posts/2024-01-01-long.markdown", &post("Long", "2024-01-01", ""));
        write(root, "_posts/2024-01-02-short.md", &post("Short", "2024-01-02", ""));
        write(root, "_posts/2024-01-03-text.mdown.txt", &post("Text", "2024-01-03", ""));

        let corpus = Corpus::new(root).unwrap();
        let report = ContentLoader::new(&corpus).unwrap().load_all();
        let titles: Vec<_> = report.units.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["Short", "Long"]);
        assert_eq!(report.units[1].slug, "long");
    }

    #[test]
    fn test_drafts_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_posts/2024-01-01-a.md", &post("A", "2024-01-01", ""));
        write(root, "_posts/archive/2019-01-01-b.md", &post("B", "2019-01-01", ""));
        write(root, "_drafts/wip.md", &post("WIP", "2024-02-01", ""));
        write(root, "_config.yml", "exclude:\n  - \"_posts/archive/*\"\n");

        let corpus = Corpus::new(root).unwrap();
        let loader = ContentLoader::new(&corpus).unwrap();

        let report = loader.load_all();
        let titles: Vec<_> = report.units.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["A"]);

        let report = loader.load_all_with_drafts(true);
        let titles: Vec<_> = report.units.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["WIP", "A"]);
        assert_eq!(report.units[0].kind, UnitKind::Draft);
    }

    #[test]
    fn test_custom_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_config.yml", "source_dir: site\ntabs_dir: pages\n");
        write(root, "site/pages/about.md", &post("About", "2024-01-01", ""));

        let corpus = Corpus::new(root).unwrap();
        assert_eq!(corpus.config.source_dir, "site");
        let report = ContentLoader::new(&corpus).unwrap().load_all();
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].kind, UnitKind::Tab);
        assert_eq!(report.units[0].source, "site/pages/about.md");
    }

    #[test]
    fn test_load_file_detects_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "_tabs/about.md", &post("About", "2024-01-01", ""));

        let corpus = Corpus::new(root).unwrap();
        let loader = ContentLoader::new(&corpus).unwrap();
        let unit = loader.load_file(&root.join("_tabs/about.md")).unwrap();
        assert_eq!(unit.kind, UnitKind::Tab);
        assert_eq!(unit.body, "Body of About.\n");

        let missing = loader.load_file(&root.join("_tabs/none.md")).unwrap_err();
        assert!(matches!(missing, LoadError::Io(_)));
    }
}
