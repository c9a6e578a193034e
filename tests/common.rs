#![allow(dead_code)]

use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tempfile::TempDir;

lazy_static! {
    static ref EXE_PATH: PathBuf = PathBuf::from(env!("CARGO_BIN_EXE_txharness"));
}

pub const TESTS_DIR: &str = "suite";
pub const FIXTURE: &str = "current_accounts.txt";
pub const SCRATCH: &str = "daily_transactions.txt";

/// Reads `DEPOSIT 100` and answers `BALANCE 100`.
pub const ECHO_BALANCE: &str = r#"read cmd amount; echo "BALANCE $amount""#;

/// A throwaway tests directory plus a fixture, driven through the real binary
/// with a `sh -c` script standing in for the subject program.
pub struct Suite {
    dir: TempDir,
    subject: Vec<String>,
    tests_dir: String,
    args: Vec<String>,
}

pub struct RunResult {
    pub status: ExitStatus,
    pub lines: Vec<String>,
    pub stderr: String,
}

impl RunResult {
    /// Report lines after the timestamped start line.
    pub fn body(&self) -> Vec<&str> {
        self.lines.iter().skip(1).map(String::as_str).collect()
    }
}

impl Suite {
    pub fn new(script: &str) -> Suite {
        let dir = TempDir::new().expect("tempdir should be created");
        fs::write(dir.path().join(FIXTURE), "00001 ALICE            A 00000100.00\n").unwrap();
        fs::create_dir_all(dir.path().join(TESTS_DIR)).unwrap();
        Suite {
            dir,
            subject: vec![
                "sh".to_string(),
                "-c".to_string(),
                script.to_string(),
                "subject".to_string(),
            ],
            tests_dir: TESTS_DIR.to_string(),
            args: vec![],
        }
    }

    pub fn subject(mut self, subject: &[&str]) -> Suite {
        self.subject = subject.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn tests_dir(mut self, tests_dir: &str) -> Suite {
        self.tests_dir = tests_dir.to_string();
        self
    }

    pub fn arg(mut self, arg: &str) -> Suite {
        self.args.push(arg.to_string());
        self
    }

    pub fn case(self, category: &str, name: &str, input: &str, expected: Option<&str>) -> Suite {
        let root = self.category_dir(category);
        write(&root.join("inputs").join(format!("{}.in.txt", name)), input);
        if let Some(expected) = expected {
            write(
                &root
                    .join("expected_outputs")
                    .join(format!("{}.expected.transactions.txt", name)),
                expected,
            );
        }
        self
    }

    pub fn empty_category(self, category: &str) -> Suite {
        fs::create_dir_all(self.category_dir(category).join("inputs")).unwrap();
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.dir.path().join(TESTS_DIR).join(category)
    }

    pub fn actual(&self, category: &str, name: &str) -> String {
        fs::read_to_string(
            self.category_dir(category)
                .join("actual_outputs")
                .join(format!("{}.actual.transactions.txt", name)),
        )
        .unwrap()
    }

    pub fn run(&self) -> RunResult {
        let output = Command::new(&*EXE_PATH)
            .current_dir(self.dir.path())
            .env("RUST_LOG", "warn")
            .arg("--tests-dir")
            .arg(&self.tests_dir)
            .args(["--fixture", FIXTURE, "--scratch", SCRATCH])
            .args(&self.args)
            .arg("--")
            .args(&self.subject)
            .output()
            .expect("harness binary should start");
        RunResult {
            status: output.status,
            lines: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

pub fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}
