//! Entry point for the command-line host.
//! Delegates to dedicated modules for argument handling, bundle loading
//! and output formatting.

use kickstand::args::{parse_cli, Commands};
use kickstand::kicks::{run_invoke, run_list, run_verify};

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    kickstand::init_tracing(cli.debug, cli.quiet);
    match cli.command {
        Commands::List(args) => run_list(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Invoke(args) => run_invoke(args),
    }
}
