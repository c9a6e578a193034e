use chrono::prelude::*;
use std::io::{self, Write};
use std::path::Path;

use crate::cases::Case;
use crate::error_log::{HarnessError, Result};
use crate::runner::Verdict;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Summary {
    /// Verdicts never fail a run; harness errors do.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Writes the human-readable run log, one line at a time.
pub struct Reporter<W: Write> {
    out: W,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Reporter<W> {
        Reporter {
            out,
            summary: Summary::default(),
        }
    }

    pub fn start(&mut self, tests_dir: &Path) -> io::Result<()> {
        let time = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        self.line(format_args!(
            "Running all tests in {} (started {})",
            tests_dir.display(),
            time
        ))
    }

    pub fn category(&mut self, name: &str) -> io::Result<()> {
        self.line(format_args!("=== {} ===", name))
    }

    pub fn running(&mut self, case: &Case) -> io::Result<()> {
        self.line(format_args!("Running {}/{}...", case.category, case.name))
    }

    pub fn outcome(&mut self, outcome: &Result<Verdict>) -> io::Result<()> {
        match outcome {
            Ok(Verdict::Pass) => {
                self.summary.passed += 1;
                self.line(format_args!("PASS"))
            }
            Ok(Verdict::Fail) => {
                self.summary.failed += 1;
                self.line(format_args!("FAIL (differences found)"))
            }
            Ok(Verdict::Skipped) => {
                self.summary.skipped += 1;
                self.line(format_args!("SKIPPED (no expected output)"))
            }
            Err(e) => self.error(e),
        }
    }

    /// Case- and category-scoped errors both land here.
    pub fn error(&mut self, err: &HarnessError) -> io::Result<()> {
        self.summary.errors += 1;
        self.line(format_args!("ERROR [{}]: {}", err.reason(), err))
    }

    pub fn finish(&mut self) -> io::Result<Summary> {
        let s = self.summary;
        self.line(format_args!(
            "All tests completed: {} passed, {} failed, {} skipped, {} errors.",
            s.passed, s.failed, s.skipped, s.errors
        ))?;
        Ok(s)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments) -> io::Result<()> {
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
