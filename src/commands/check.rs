//! Validate every content unit

use anyhow::Result;
use chrono::Utc;
use std::fmt::Write;

use crate::content::lint::{self, Lint, LintOptions};
use crate::content::loader::{ContentLoader, LoadReport};
use crate::Corpus;

/// Outcome of a check run
#[derive(Debug)]
pub struct CheckResult {
    pub report: LoadReport,
    pub lints: Vec<Lint>,
}

impl CheckResult {
    /// Whether the run should fail
    pub fn failed(&self, strict: bool) -> bool {
        !self.report.is_clean() || (strict && !self.lints.is_empty())
    }

    /// Human-readable report, one problem per line and a summary at the end
    pub fn render(&self) -> String {
        let mut out = String::new();
        for failure in &self.report.failures {
            let _ = writeln!(out, "{}: {}", failure.source, failure.error);
        }
        for lint in &self.lints {
            let _ = writeln!(out, "warning: {}", lint);
        }
        let _ = writeln!(
            out,
            "Checked {} units: {} failed, {} warnings",
            self.report.units.len() + self.report.failures.len(),
            self.report.failures.len(),
            self.lints.len()
        );
        out
    }
}

/// Load and lint everything, drafts included
pub fn collect(corpus: &Corpus) -> Result<CheckResult> {
    let loader = ContentLoader::new(corpus)?;
    let report = loader.load_all_with_drafts(true);

    let options = LintOptions {
        tz: corpus.config.tz()?,
        future: corpus.config.future,
        now: Utc::now(),
    };
    let lints = lint::lint(&report.units, &options);

    Ok(CheckResult { report, lints })
}

/// Run the check command
pub fn run(corpus: &Corpus, strict: bool) -> Result<()> {
    let result = collect(corpus)?;
    print!("{}", result.render());

    if result.failed(strict) {
        anyhow::bail!(
            "{} units failed validation{}",
            result.report.failures.len(),
            if strict && !result.lints.is_empty() {
                format!(" and {} warnings were raised", result.lints.len())
            } else {
                String::new()
            }
        );
    }

    Ok(())
}
