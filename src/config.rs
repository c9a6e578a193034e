use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error_log::{HarnessError, Result};

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "harness.json";

#[derive(Parser, Debug, Default)]
#[clap(
    name = "txharness",
    version,
    about = "Runs a transaction-processing program against categorized test cases"
)]
pub struct Cli {
    /// JSON config file (defaults to ./harness.json when present)
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding one sub-directory per category
    #[clap(short = 'd', long, value_name = "DIR")]
    pub tests_dir: Option<PathBuf>,

    /// Read-only accounts file handed to every run
    #[clap(short, long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Working file handed to every run
    #[clap(short, long, value_name = "FILE")]
    pub scratch: Option<PathBuf>,

    /// Kill a run that takes longer than this
    #[clap(short, long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Compare byte for byte instead of ignoring CRLF/LF differences
    #[clap(long)]
    pub strict: bool,

    /// Only run this category (repeatable)
    #[clap(short = 'c', long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Pass the subject program's stderr through
    #[clap(long)]
    pub show_stderr: bool,

    /// Subject program and its leading arguments, e.g. `-- python3 main.py`
    #[clap(last = true, value_name = "SUBJECT")]
    pub subject: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Line-wise, trailing `\r` ignored.
    #[default]
    Standard,
    /// Byte-exact.
    Strict,
}

macro_rules! pub_struct {
    ($name:ident {$($field:ident: $t:ty,)*}) => {
        #[derive(Deserialize, Serialize, Clone, Default, Debug)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $(pub $field: $t),*
        }
    }
}

// Every key is optional in the file; missing ones fall back to the defaults.
pub_struct!(FileConfig {
    tests_dir: Option<PathBuf>,
    subject: Option<Vec<String>>,
    fixture: Option<PathBuf>,
    scratch: Option<PathBuf>,
    compare: Option<CompareMode>,
    timeout_ms: Option<u64>,
    categories: Option<Vec<String>>,
    show_stderr: Option<bool>,
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub tests_dir: PathBuf,
    pub subject: Vec<String>,
    pub fixture: PathBuf,
    pub scratch: PathBuf,
    pub compare: CompareMode,
    pub timeout_ms: Option<u64>,
    pub categories: Vec<String>,
    pub show_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tests_dir: PathBuf::from("tests"),
            subject: vec!["python3".to_string(), "main.py".to_string()],
            fixture: PathBuf::from("current_accounts.txt"),
            scratch: PathBuf::from("daily_transactions.txt"),
            compare: CompareMode::Standard,
            timeout_ms: None,
            categories: vec![],
            show_stderr: false,
        }
    }
}

impl Config {
    /// Defaults, then the config file, then command-line flags.
    pub fn load(cli: &Cli) -> Result<Config> {
        let file = match &cli.config {
            Some(path) => Some(parse_from_file(path)?),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Some(parse_from_file(fallback)?)
                } else {
                    None
                }
            }
        };

        let mut config = Config::default();
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_cli(cli);

        if config.subject.is_empty() || config.subject[0].is_empty() {
            return Err(HarnessError::Config(
                "no subject program configured".to_string(),
            ));
        }
        if config.timeout_ms == Some(0) {
            return Err(HarnessError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(tests_dir) = file.tests_dir {
            self.tests_dir = tests_dir;
        }
        if let Some(subject) = file.subject {
            self.subject = subject;
        }
        if let Some(fixture) = file.fixture {
            self.fixture = fixture;
        }
        if let Some(scratch) = file.scratch {
            self.scratch = scratch;
        }
        if let Some(compare) = file.compare {
            self.compare = compare;
        }
        if file.timeout_ms.is_some() {
            self.timeout_ms = file.timeout_ms;
        }
        if let Some(categories) = file.categories {
            self.categories = categories;
        }
        if let Some(show_stderr) = file.show_stderr {
            self.show_stderr = show_stderr;
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(tests_dir) = &cli.tests_dir {
            self.tests_dir = tests_dir.clone();
        }
        if !cli.subject.is_empty() {
            self.subject = cli.subject.clone();
        }
        if let Some(fixture) = &cli.fixture {
            self.fixture = fixture.clone();
        }
        if let Some(scratch) = &cli.scratch {
            self.scratch = scratch.clone();
        }
        if cli.strict {
            self.compare = CompareMode::Strict;
        }
        if cli.timeout_ms.is_some() {
            self.timeout_ms = cli.timeout_ms;
        }
        if !cli.categories.is_empty() {
            self.categories = cli.categories.clone();
        }
        if cli.show_stderr {
            self.show_stderr = true;
        }
    }

    /// The fixture is shared by every case; it must be a readable regular file.
    pub fn validate(&self) -> Result {
        let bad_fixture = |source| HarnessError::BadFixture {
            path: self.fixture.clone(),
            source,
        };
        match fs::metadata(&self.fixture) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(bad_fixture(io::Error::new(
                    io::ErrorKind::Other,
                    "not a regular file",
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(HarnessError::MissingFixture(self.fixture.clone()))
            }
            Err(e) => return Err(bad_fixture(e)),
        }
        File::open(&self.fixture).map_err(bad_fixture)?;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

pub fn parse_from_file(config_path: &Path) -> Result<FileConfig> {
    let file = File::open(config_path).map_err(|e| {
        HarnessError::Config(format!(
            "cannot read config file {}: {}",
            config_path.display(),
            e
        ))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        HarnessError::Config(format!(
            "config file {} has a wrong format: {}",
            config_path.display(),
            e
        ))
    })
}
