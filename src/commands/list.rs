//! List site content

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write;

use crate::content::loader::ContentLoader;
use crate::content::{ContentUnit, UnitKind};
use crate::Corpus;

/// A tag or category with the number of units using it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

/// Tally names across units, most used first, ties by name
pub fn count<'a, F>(units: &'a [ContentUnit], names: F) -> Vec<Count>
where
    F: Fn(&'a ContentUnit) -> &'a [String],
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for unit in units {
        for name in names(unit) {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<Count> = counts
        .into_iter()
        .map(|(name, count)| Count {
            name: name.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

/// Render the listing for one content type
pub fn render(corpus: &Corpus, content_type: &str, json: bool) -> Result<String> {
    let loader = ContentLoader::new(corpus)?;
    let drafts = matches!(content_type, "draft" | "drafts");
    let report = loader.load_all_with_drafts(drafts);

    let published: Vec<ContentUnit> = report.units.into_iter().filter(|u| u.published).collect();
    let of_kind = |kind: UnitKind| {
        published
            .iter()
            .filter(move |u| u.kind == kind)
            .collect::<Vec<_>>()
    };
    let posts: Vec<ContentUnit> = published
        .iter()
        .filter(|u| u.kind == UnitKind::Post)
        .cloned()
        .collect();

    let mut out = String::new();

    match content_type {
        "post" | "posts" | "draft" | "drafts" => {
            let kind = if drafts { UnitKind::Draft } else { UnitKind::Post };
            let units = of_kind(kind);
            if json {
                out = serde_json::to_string_pretty(&units)?;
                out.push('\n');
            } else {
                let heading = if drafts { "Drafts" } else { "Posts" };
                writeln!(out, "{} ({}):", heading, units.len())?;
                for unit in units {
                    writeln!(
                        out,
                        "  {}{} - {} [{}]",
                        unit.date.format("%Y-%m-%d"),
                        if unit.pin { " *" } else { "" },
                        unit.title,
                        unit.source
                    )?;
                }
            }
        }
        "tab" | "tabs" => {
            let tabs = of_kind(UnitKind::Tab);
            if json {
                out = serde_json::to_string_pretty(&tabs)?;
                out.push('\n');
            } else {
                writeln!(out, "Tabs ({}):", tabs.len())?;
                for tab in tabs {
                    writeln!(
                        out,
                        "  {} {} [{}] [{}]",
                        tab.order.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string()),
                        tab.title,
                        tab.icon.as_deref().unwrap_or("-"),
                        tab.source
                    )?;
                }
            }
        }
        "tag" | "tags" => {
            let tags = count(&posts, |u| u.tags.as_slice());
            render_counts(&mut out, "Tags", &tags, json)?;
        }
        "category" | "categories" => {
            let categories = count(&posts, |u| u.categories.as_slice());
            render_counts(&mut out, "Categories", &categories, json)?;
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, tab, tag, category",
                content_type
            );
        }
    }

    Ok(out)
}

fn render_counts(out: &mut String, heading: &str, counts: &[Count], json: bool) -> Result<()> {
    if json {
        *out = serde_json::to_string_pretty(counts)?;
        out.push('\n');
        return Ok(());
    }

    writeln!(out, "{} ({}):", heading, counts.len())?;
    for c in counts {
        writeln!(out, "  {} ({})", c.name, c.count)?;
    }
    Ok(())
}

/// List site content by type
pub fn run(corpus: &Corpus, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(corpus, content_type, json)?);
    Ok(())
}
