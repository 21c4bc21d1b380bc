//! Front-matter parsing and serialization

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while reading a content unit's header
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontMatterError {
    #[error("malformed front matter: {0}")]
    MalformedMetadata(String),

    #[error("invalid date in `{field}`: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("failed to serialize front matter: {0}")]
    Serialize(String),
}

impl FrontMatterError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FrontMatterError::MalformedMetadata(message.into())
    }
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<Scalar>()? {
                vec.push(item.0);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// A YAML scalar read as text, so `title: 2024` or `tags: [1984]` still work
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_scalar(deserializer)?
            .map(Scalar)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar, found null"))
    }
}

/// Optional scalar field; numbers and booleans are kept as their text
fn opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Cover image; accepts either `image: /path.png` or a `path`/`alt`/`lqip` mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ImageRepr", into = "ImageRepr")]
pub struct Image {
    pub path: String,
    pub alt: Option<String>,
    pub lqip: Option<String>,
}

impl Image {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alt: None,
            lqip: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ImageRepr {
    Path(String),
    Detailed {
        #[serde(alias = "src")]
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lqip: Option<String>,
    },
}

impl From<ImageRepr> for Image {
    fn from(repr: ImageRepr) -> Self {
        match repr {
            ImageRepr::Path(path) => Image::new(path),
            ImageRepr::Detailed { path, alt, lqip } => Image { path, alt, lqip },
        }
    }
}

impl From<Image> for ImageRepr {
    fn from(image: Image) -> Self {
        match (image.alt, image.lqip) {
            (None, None) => ImageRepr::Path(image.path),
            (alt, lqip) => ImageRepr::Detailed {
                path: image.path,
                alt,
                lqip,
            },
        }
    }
}

/// Front-matter data exactly as authored.
///
/// Nothing here is validated yet; see [`super::ContentUnit`] for the checked form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(deserialize_with = "string_or_vec", skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(deserialize_with = "string_or_vec", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub pin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(deserialize_with = "opt_scalar", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Units are published unless they opt out
    #[serde(default = "default_published", skip_serializing_if = "is_true")]
    pub published: bool,

    /// Additional custom fields, in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_true(b: &bool) -> bool {
    *b
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            author: None,
            authors: Vec::new(),
            date: None,
            last_modified_at: None,
            categories: Vec::new(),
            tags: Vec::new(),
            pin: false,
            image: None,
            icon: None,
            order: None,
            published: true,
            extra: IndexMap::new(),
        }
    }
}

/// Split a document into its raw header text and body.
///
/// The header must open on the first non-blank line with `---` and close with
/// the next `---` or `...` line. Trailing whitespace on either delimiter is ignored.
pub fn split_header(content: &str) -> Result<(&str, &str), FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let mut offset = 0;
    let first = loop {
        let line = lines
            .next()
            .ok_or_else(|| FrontMatterError::malformed("document is empty"))?;
        offset += line.len();
        if !line.trim().is_empty() {
            break line;
        }
    };
    if first.trim_end() != "---" {
        return Err(FrontMatterError::malformed(
            "missing opening `---` delimiter",
        ));
    }

    let header_start = offset;
    for line in lines {
        let bare = line.trim_end();
        if bare == "---" || bare == "..." {
            let header = &content[header_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((header, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::malformed(
        "missing closing `---` delimiter",
    ))
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (header, body) = split_header(content)?;

        // An empty header is a valid mapping with nothing in it
        if header.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let value: serde_yaml::Value = serde_yaml::from_str(header)
            .map_err(|e| FrontMatterError::malformed(format!("invalid YAML: {}", e)))?;
        // Comment-only headers load as null
        if value.is_null() {
            return Ok((FrontMatter::default(), body));
        }
        if !value.is_mapping() {
            return Err(FrontMatterError::malformed(
                "header is not a key-value mapping",
            ));
        }

        let fm = serde_yaml::from_value::<FrontMatter>(value)
            .map_err(|e| FrontMatterError::malformed(e.to_string()))?;
        Ok((fm, body))
    }

    /// Render as a delimited header block, ready to be followed by a body
    pub fn to_header(&self) -> Result<String, FrontMatterError> {
        let yaml = if *self == FrontMatter::default() {
            String::new()
        } else {
            serde_yaml::to_string(self).map_err(|e| FrontMatterError::Serialize(e.to_string()))?
        };
        Ok(format!("---\n{}---\n", yaml))
    }
}
