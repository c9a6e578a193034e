use clap::Parser;
use std::io;
use std::process;

mod cases;
mod config;
mod error_log;
mod reporter;
mod runner;

use cases::FsCaseSource;
use config::{Cli, Config};
use error_log::Result;
use reporter::{Reporter, Summary};

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    match run(&cli) {
        Ok(summary) if summary.has_errors() => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("error [{}]: {}", e.reason(), e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<Summary> {
    let config = Config::load(cli)?;
    config.validate()?;
    log::info!(
        "subject {:?}, fixture {}, scratch {}, compare {:?}",
        config.subject,
        config.fixture.display(),
        config.scratch.display(),
        config.compare
    );

    let source = FsCaseSource::new(&config.tests_dir);
    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    runner::run_suite(&source, &config, &mut reporter)
}
