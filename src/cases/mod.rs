//! Test discovery.
//!
//! A tests directory holds one sub-directory per category:
//!
//! ```text
//! <tests_dir>/<category>/inputs/<name>.in.txt
//! <tests_dir>/<category>/expected_outputs/<name>.expected.transactions.txt
//! <tests_dir>/<category>/actual_outputs/<name>.actual.transactions.txt
//! ```
//!
//! `actual_outputs/` is created by the harness; the other two are read-only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error_log::{HarnessError, Result};

pub const INPUTS_DIR: &str = "inputs";
pub const EXPECTED_DIR: &str = "expected_outputs";
pub const ACTUAL_DIR: &str = "actual_outputs";

pub const INPUT_SUFFIX: &str = ".in.txt";
pub const EXPECTED_SUFFIX: &str = ".expected.transactions.txt";
pub const ACTUAL_SUFFIX: &str = ".actual.transactions.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub dir: PathBuf,
}

impl Category {
    pub fn new(tests_dir: &Path, name: &str) -> Category {
        Category {
            name: name.to_string(),
            dir: tests_dir.join(name),
        }
    }

    pub fn case(&self, base_name: &str) -> Case {
        Case {
            category: self.name.clone(),
            name: base_name.to_string(),
            input: self
                .dir
                .join(INPUTS_DIR)
                .join(format!("{}{}", base_name, INPUT_SUFFIX)),
            expected: self
                .dir
                .join(EXPECTED_DIR)
                .join(format!("{}{}", base_name, EXPECTED_SUFFIX)),
            actual: self
                .dir
                .join(ACTUAL_DIR)
                .join(format!("{}{}", base_name, ACTUAL_SUFFIX)),
        }
    }
}

/// Every path is derived from the category and base name, so a rerun
/// overwrites the same actual output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub category: String,
    pub name: String,
    pub input: PathBuf,
    pub expected: PathBuf,
    pub actual: PathBuf,
}

pub trait CaseSource {
    /// Categories in the order they should run.
    fn categories(&self) -> Result<Vec<Category>>;

    /// Cases of one category in the order they should run.
    fn cases(&self, category: &Category) -> Result<Vec<Case>>;
}

pub struct FsCaseSource {
    tests_dir: PathBuf,
}

impl FsCaseSource {
    pub fn new(tests_dir: impl Into<PathBuf>) -> FsCaseSource {
        FsCaseSource {
            tests_dir: tests_dir.into(),
        }
    }
}

impl CaseSource for FsCaseSource {
    fn categories(&self) -> Result<Vec<Category>> {
        let discovery_error = |source| HarnessError::Discovery {
            path: self.tests_dir.clone(),
            source,
        };

        let mut names = vec![];
        for entry in fs::read_dir(&self.tests_dir).map_err(discovery_error)? {
            let entry = entry.map_err(discovery_error)?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                // .git, .vscode and friends
                Ok(name) if name.starts_with('.') => continue,
                Ok(name) => names.push(name),
                Err(name) => log::warn!("Skipping non UTF-8 category {:?}", name),
            }
        }
        names.sort();

        Ok(names
            .iter()
            .map(|name| Category::new(&self.tests_dir, name))
            .collect())
    }

    fn cases(&self, category: &Category) -> Result<Vec<Case>> {
        let category_error = |source| HarnessError::Category {
            category: category.name.clone(),
            source,
        };

        fs::create_dir_all(category.dir.join(ACTUAL_DIR)).map_err(category_error)?;

        let inputs = category.dir.join(INPUTS_DIR);
        let entries = match fs::read_dir(&inputs) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Category {} has no {} directory", category.name, INPUTS_DIR);
                return Ok(vec![]);
            }
            Err(e) => return Err(category_error(e)),
        };

        let mut base_names = vec![];
        for entry in entries {
            let entry = entry.map_err(category_error)?;
            if entry.path().is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(base) = file_name.to_str().and_then(base_name) {
                base_names.push(base.to_string());
            }
        }
        base_names.sort();

        Ok(base_names.iter().map(|base| category.case(base)).collect())
    }
}

/// `deposit_01.in.txt` -> `deposit_01`. Anything else is not a case.
pub fn base_name(file_name: &str) -> Option<&str> {
    match file_name.strip_suffix(INPUT_SUFFIX) {
        Some(base) if !base.is_empty() => Some(base),
        _ => None,
    }
}
