//! Authoring lints - warnings about units that parse but look wrong

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fmt;

use super::{ContentUnit, UnitKind};

/// A non-fatal warning about one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lint {
    pub source: String,
    pub message: String,
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Lint settings taken from the site config
#[derive(Debug, Clone, Copy)]
pub struct LintOptions {
    pub tz: Option<Tz>,
    /// When false, future-dated posts are flagged
    pub future: bool,
    pub now: DateTime<Utc>,
}

/// Run every lint over a loaded corpus
pub fn lint(units: &[ContentUnit], options: &LintOptions) -> Vec<Lint> {
    let mut lints = Vec::new();
    let mut slugs: HashMap<&str, &str> = HashMap::new();
    let mut orders: HashMap<i64, &str> = HashMap::new();

    for unit in units {
        let mut warn = |message: String| {
            lints.push(Lint {
                source: unit.source.clone(),
                message,
            })
        };

        match unit.kind {
            UnitKind::Post | UnitKind::Draft => {
                if let Some(prefix) = unit.filename_date() {
                    let local = match options.tz {
                        Some(tz) => unit.date.with_timezone(&tz).date_naive(),
                        None => unit.date.date_naive(),
                    };
                    if local != prefix {
                        warn(format!(
                            "file name is dated {} but `date` is {}",
                            prefix, local
                        ));
                    }
                }

                if !options.future && unit.date > options.now {
                    warn(format!("`date` {} is in the future", unit.date));
                }

                if unit.kind == UnitKind::Post {
                    if let Some(first) = slugs.insert(&unit.slug, &unit.source) {
                        warn(format!("slug `{}` is also used by {}", unit.slug, first));
                    }
                }
            }
            UnitKind::Tab => {
                if unit.icon.is_none() {
                    warn("tab has no `icon`".to_string());
                }
                match unit.order {
                    None => warn("tab has no `order`".to_string()),
                    Some(order) => {
                        if let Some(first) = orders.insert(order, &unit.source) {
                            warn(format!("`order: {}` is also used by {}", order, first));
                        }
                    }
                }
            }
        }
    }

    lints
}
