use std::process::ExitCode;

use clap::Parser;

use snapedit::cli::{self, CliArgs};
use snapedit::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Settings decide the log level, so they load first
    let settings = cli::load_settings(&args);
    let verbose = args.verbose || settings.as_ref().is_ok_and(|s| s.debug_logging);
    let guard = logger::init(verbose);
    if args.verbose
        && let Some(path) = logger::log_path()
    {
        eprintln!("log: {}", path.display());
    }

    let code = match settings {
        Ok(settings) => cli::run(args, settings),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    };

    // Flush the session log before exiting
    drop(guard);
    code
}
