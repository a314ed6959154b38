use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "strand", bin_name = "strand")]
#[command(about = "Parser and import resolver for the Strand configuration language")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit a trace of grammar rule entries/exits to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a file and print its AST, without resolving imports
    #[command(after_help = r#"EXAMPLES:
  strand parse config.strand
  strand parse config.strand --memoize"#)]
    Parse(ParseArgs),

    /// Parse a file and resolve every import it contains
    #[command(after_help = r#"EXAMPLES:
  strand resolve config.strand
  strand resolve config.strand --max-depth 64"#)]
    Resolve(ResolveArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Source file to parse (use "-" for stdin)
    pub file: PathBuf,

    /// Enable packrat memoization
    #[arg(long)]
    pub memoize: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Source file to parse and resolve (use "-" for stdin)
    pub file: PathBuf,

    /// Enable packrat memoization for the initial parse
    #[arg(long)]
    pub memoize: bool,

    /// Maximum import nesting depth before the resolver gives up
    #[arg(long, value_name = "N", default_value_t = 1000)]
    pub max_depth: usize,

    /// Per-fetch timeout for remote imports, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 20)]
    pub fetch_timeout: u64,
}
