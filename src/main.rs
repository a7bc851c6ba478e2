use stackplan::cli::commands::{CliArgs, Commands};
use stackplan::cli::handlers::{handle_detect, handle_plan, handle_providers};
use stackplan::util::logging::{self, LoggingConfig};
use stackplan::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("stackplan v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::Plan(plan_args) => handle_plan(plan_args),
        Commands::Providers(providers_args) => handle_providers(providers_args),
    };

    std::process::exit(exit_code);
}

/// Flag precedence: --log-level, then -v/-q, then STACKPLAN_LOG_LEVEL
fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("STACKPLAN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        logging::parse_level(&level_str)
    };

    logging::init_logging(LoggingConfig {
        level,
        use_json: logging::json_from_env(),
        ..Default::default()
    });
}
