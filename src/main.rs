use clap::Parser;
use codebase_compact::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    cli::init_logging(cli.verbose);
    codebase_compact::init();

    let result = match &cli.command {
        Commands::Compact(args) => cli::run_compact(args),
        Commands::Pick(args) => cli::run_pick(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
