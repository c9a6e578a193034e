use std::io;
use std::path::PathBuf;
use std::result::Result as StdResult;
use std::time::Duration;

use thiserror::Error;

pub type Result<T = (), E = HarnessError> = StdResult<T, E>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{0}")]
    Config(String),

    #[error("fixture {} does not exist", .0.display())]
    MissingFixture(PathBuf),

    #[error("fixture {} is unusable: {source}", path.display())]
    BadFixture { path: PathBuf, source: io::Error },

    #[error("cannot read tests directory {}: {source}", path.display())]
    Discovery { path: PathBuf, source: io::Error },

    #[error("category {category} aborted: {source}")]
    Category { category: String, source: io::Error },

    #[error("cannot open input {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("cannot create actual output {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },

    #[error("cannot launch subject program {program}: {source}")]
    Launch { program: String, source: io::Error },

    #[error("lost track of subject program {program}: {source}")]
    Wait { program: String, source: io::Error },

    #[error("subject program did not finish within {} ms and was killed", .0.as_millis())]
    TimedOut(Duration),

    #[error("cannot read {} for comparison: {source}", path.display())]
    Compare { path: PathBuf, source: io::Error },

    #[error("cannot write report: {0}")]
    Report(#[from] io::Error),
}

impl HarnessError {
    pub fn reason(&self) -> &'static str {
        match self {
            HarnessError::Config(_) => "ERR_CONFIG",
            HarnessError::MissingFixture(_) | HarnessError::BadFixture { .. } => "ERR_FIXTURE",
            HarnessError::Discovery { .. } => "ERR_DISCOVERY",
            HarnessError::Category { .. } => "ERR_CATEGORY",
            HarnessError::Input { .. } => "ERR_INPUT",
            HarnessError::Output { .. } => "ERR_OUTPUT",
            HarnessError::Launch { .. } => "ERR_LAUNCH",
            HarnessError::Wait { .. } => "ERR_WAIT",
            HarnessError::TimedOut(_) => "ERR_TIMEOUT",
            HarnessError::Compare { .. } => "ERR_COMPARE",
            HarnessError::Report(_) => "ERR_REPORT",
        }
    }

    /// Fatal errors stop the whole run; everything else is scoped to one
    /// category or one case and the run carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Config(_)
                | HarnessError::MissingFixture(_)
                | HarnessError::BadFixture { .. }
                | HarnessError::Discovery { .. }
                | HarnessError::Report(_)
        )
    }
}
