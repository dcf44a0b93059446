//! Burrow CLI - call HTTP resource APIs from the shell
//!
//! This is the main entry point for the Burrow CLI application. It loads
//! configuration, builds the root node and dispatches to the verb handlers.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Values from a local .env file behave like exported variables
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let config = {
        let _config_timer = Timer::new("config_loading");
        Config::load_with_file(cli.config.as_deref())?
    };

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        config = ?config.source,
        "Executing command"
    );

    let connection = &cli.connection;
    match cli.command {
        Commands::Get(args) => {
            let api = handlers::build_api(connection, &config)?;
            handlers::handle_get(args, &api, &mut output)
        }
        Commands::Post(args) => {
            let api = handlers::build_api(connection, &config)?;
            handlers::handle_post(args, &api, &mut output)
        }
        Commands::Put(args) => {
            let api = handlers::build_api(connection, &config)?;
            handlers::handle_put(args, &api, &mut output)
        }
        Commands::Delete(args) => {
            let api = handlers::build_api(connection, &config)?;
            handlers::handle_delete(args, &api, &mut output)
        }
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    let warnings = logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)?;
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
    Ok(())
}
