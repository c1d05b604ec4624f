use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Kickstand - reference host for independently deployed Kick UI extensions",
    long_about = "Kickstand loads kick bundles, validates their registration payloads, \
filters them by the actor's roles and drives the readiness handshake so that a kick \
can be invoked against a selection of items.

Examples:
  kickstand list -s ./bundles/gallery          # show kicks visible to the actor
  kickstand verify ./bundles/gallery           # validate one bundle
  kickstand invoke gallery --items a,b -s ./bundles/gallery",
    subcommand_required = true
)]
pub struct Cli {
    /// Verbose diagnostics
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress log output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the kicks visible to the current actor
    List(ListArgs),
    /// Load a single bundle and report its validated descriptors
    Verify(VerifyArgs),
    /// Mount a kick and dispatch a selection to it
    Invoke(InvokeArgs),
}

#[derive(ClapArgs)]
pub struct ListArgs {
    /// Bundle sources on top of the configured ones
    #[arg(short = 's', long = "source")]
    pub sources: Vec<String>,
    /// Actor roles, comma separated (overrides the configured roles)
    #[arg(long, value_delimiter = ',')]
    pub roles: Vec<String>,
}

#[derive(ClapArgs)]
pub struct VerifyArgs {
    /// Bundle source to load
    pub source: String,
}

#[derive(ClapArgs)]
pub struct InvokeArgs {
    /// Id of the kick to invoke
    pub kick: String,
    /// Selected item ids, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub items: Vec<String>,
    /// Bundle sources on top of the configured ones
    #[arg(short = 's', long = "source")]
    pub sources: Vec<String>,
    /// Actor roles, comma separated (overrides the configured roles)
    #[arg(long, value_delimiter = ',')]
    pub roles: Vec<String>,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
