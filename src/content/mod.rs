//! Content module - front matter, content units and the corpus loader

pub mod date;
mod frontmatter;
pub mod lint;
pub mod loader;
mod unit;

pub use frontmatter::{split_header, FrontMatter, FrontMatterError, Image};
pub use unit::{ContentUnit, UnitKind};
