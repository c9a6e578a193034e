use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

use crate::cases::{Case, CaseSource, Category};
use crate::config::{CompareMode, Config};
use crate::error_log::{HarnessError, Result};
use crate::reporter::{Reporter, Summary};

mod diff;

pub use diff::Verdict;

/// Runs the subject program once per case as
/// `<program> [args..] <fixture> <scratch> < input > actual`.
#[derive(Clone, Debug)]
pub struct Invoker {
    program: String,
    args: Vec<String>,
    fixture: PathBuf,
    scratch: PathBuf,
    timeout: Option<Duration>,
    show_stderr: bool,
}

impl Invoker {
    pub fn new(config: &Config) -> Invoker {
        let (program, args) = match config.subject.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), vec![]),
        };
        Invoker {
            program,
            args,
            fixture: config.fixture.clone(),
            scratch: config.scratch.clone(),
            timeout: config.timeout(),
            show_stderr: config.show_stderr,
        }
    }

    /// Blocks until the subject exits. A non-zero exit is returned, not
    /// treated as an error: whatever it wrote still gets compared.
    pub fn run(&self, case: &Case) -> Result<ExitStatus> {
        let input = File::open(&case.input).map_err(|source| HarnessError::Input {
            path: case.input.clone(),
            source,
        })?;
        // truncates output left by an earlier run
        let output = File::create(&case.actual).map_err(|source| HarnessError::Output {
            path: case.actual.clone(),
            source,
        })?;
        let stderr = match self.show_stderr {
            true => Stdio::inherit(),
            false => Stdio::null(),
        };

        log::debug!(
            "Running {} {:?} {} {} < {}",
            self.program,
            self.args,
            self.fixture.display(),
            self.scratch.display(),
            case.input.display()
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.fixture)
            .arg(&self.scratch)
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .stderr(stderr)
            .spawn()
            .map_err(|source| HarnessError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let wait_error = |source| HarnessError::Wait {
            program: self.program.clone(),
            source,
        };
        let status = match self.timeout {
            None => child.wait().map_err(wait_error)?,
            Some(limit) => match child.wait_timeout(limit).map_err(wait_error)? {
                Some(status) => status,
                None => {
                    if let Err(e) = child.kill() {
                        log::warn!("Cannot kill {}: {}", self.program, e);
                    }
                    child.wait().map_err(wait_error)?;
                    return Err(HarnessError::TimedOut(limit));
                }
            },
        };

        if !status.success() {
            log::warn!("{}/{}: subject program exited with {}", case.category, case.name, status);
        }
        Ok(status)
    }
}

pub fn run_case(invoker: &Invoker, mode: CompareMode, case: &Case) -> Result<Verdict> {
    invoker.run(case)?;
    let verdict = diff::compare(mode, &case.expected, &case.actual)?;
    log::debug!("{}/{}: {:?}", case.category, case.name, verdict);
    Ok(verdict)
}

/// Runs every selected category in order. Only discovery and report-stream
/// failures end the run early; everything else is reported and skipped past.
pub fn run_suite<S: CaseSource, W: Write>(
    source: &S,
    config: &Config,
    reporter: &mut Reporter<W>,
) -> Result<Summary> {
    let invoker = Invoker::new(config);
    reporter.start(&config.tests_dir)?;

    for category in select(source.categories()?, &config.categories) {
        reporter.category(&category.name)?;
        let cases = match source.cases(&category) {
            Ok(cases) => cases,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::error!("{}", e);
                reporter.error(&e)?;
                continue;
            }
        };
        for case in cases {
            reporter.running(&case)?;
            let outcome = run_case(&invoker, config.compare, &case);
            if let Err(e) = &outcome {
                log::error!("{}/{}: {}", case.category, case.name, e);
            }
            reporter.outcome(&outcome)?;
        }
    }

    Ok(reporter.finish()?)
}

fn select(categories: Vec<Category>, wanted: &[String]) -> Vec<Category> {
    if wanted.is_empty() {
        return categories;
    }
    for name in wanted {
        if !categories.iter().any(|c| &c.name == name) {
            log::warn!("No category named {}", name);
        }
    }
    categories
        .into_iter()
        .filter(|c| wanted.contains(&c.name))
        .collect()
}
