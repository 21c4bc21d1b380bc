//! Content unit model

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::date::{format_header_date, parse_date, split_dated_stem};
use super::frontmatter::{FrontMatter, FrontMatterError, Image};

/// Where a unit lives in the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Post,
    Draft,
    Tab,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Post => "post",
            UnitKind::Draft => "draft",
            UnitKind::Tab => "tab",
        };
        f.write_str(name)
    }
}

/// A validated post or tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentUnit {
    /// Post, draft or tab
    pub kind: UnitKind,

    /// Headline, never empty
    pub title: String,

    /// Optional summary, may contain markup
    pub description: Option<String>,

    pub author: Option<String>,
    pub authors: Vec<String>,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Last modification date, when the author records one
    pub last_modified_at: Option<DateTime<FixedOffset>>,

    pub categories: Vec<String>,
    pub tags: Vec<String>,

    /// Pinned units sort ahead of everything else
    pub pin: bool,

    pub image: Option<Image>,

    /// Navigation icon (tabs)
    pub icon: Option<String>,

    /// Navigation position (tabs)
    pub order: Option<i64>,

    pub published: bool,

    /// Unrecognized header keys, in source order
    pub extra: IndexMap<String, serde_yaml::Value>,

    /// Source file path (relative to the site root)
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// File stem without any date prefix
    pub slug: String,

    /// Document payload, untouched
    #[serde(skip)]
    pub body: String,
}

impl ContentUnit {
    /// Parse a whole document into a unit.
    ///
    /// `title` and `date` are required; naive dates are read in `tz`.
    pub fn parse(
        kind: UnitKind,
        source: impl Into<String>,
        content: &str,
        tz: Option<Tz>,
    ) -> Result<Self, FrontMatterError> {
        let (fm, body) = FrontMatter::parse(content)?;
        Self::from_front_matter(kind, source.into(), fm, body.to_string(), tz)
    }

    /// Validate a parsed header
    pub fn from_front_matter(
        kind: UnitKind,
        source: String,
        fm: FrontMatter,
        body: String,
        tz: Option<Tz>,
    ) -> Result<Self, FrontMatterError> {
        let title = match fm.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                return Err(FrontMatterError::malformed(
                    "missing required field `title`",
                ))
            }
        };

        let raw_date = fm
            .date
            .ok_or_else(|| FrontMatterError::malformed("missing required field `date`"))?;
        let date = parse_date(&raw_date, tz).ok_or(FrontMatterError::InvalidDate {
            field: "date",
            value: raw_date,
        })?;

        let last_modified_at = match fm.last_modified_at {
            Some(raw) => Some(parse_date(&raw, tz).ok_or(FrontMatterError::InvalidDate {
                field: "last_modified_at",
                value: raw,
            })?),
            None => None,
        };

        let full_source = PathBuf::from(&source);
        let slug = slug_for(&full_source);

        Ok(Self {
            kind,
            title,
            description: fm.description,
            author: fm.author,
            authors: fm.authors,
            date,
            last_modified_at,
            categories: fm.categories,
            tags: fm.tags,
            pin: fm.pin,
            image: fm.image,
            icon: fm.icon,
            order: fm.order,
            published: fm.published,
            extra: fm.extra,
            source,
            full_source,
            slug,
            body,
        })
    }

    /// The header this unit would be written with
    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            author: self.author.clone(),
            authors: self.authors.clone(),
            date: Some(format_header_date(&self.date)),
            last_modified_at: self.last_modified_at.as_ref().map(format_header_date),
            categories: self.categories.clone(),
            tags: self.tags.clone(),
            pin: self.pin,
            image: self.image.clone(),
            icon: self.icon.clone(),
            order: self.order,
            published: self.published,
            extra: self.extra.clone(),
        }
    }

    /// Header followed by the body, as it would be stored on disk
    pub fn to_document(&self) -> Result<String, FrontMatterError> {
        Ok(format!("{}{}", self.front_matter().to_header()?, self.body))
    }

    /// Date prefix of the file name, for `YYYY-MM-DD-title.md` posts
    pub fn filename_date(&self) -> Option<chrono::NaiveDate> {
        let stem = self.full_source.file_stem()?.to_str()?;
        split_dated_stem(stem).0
    }
}

/// File stem with any `YYYY-MM-DD-` prefix removed
fn slug_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    split_dated_stem(stem).1.to_string()
}
