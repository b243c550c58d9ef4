use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mahdb",
    version,
    about = "Disk-resident tuple store indexed by a multi-attribute linear hash",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a relation (three files: <name>.info/.data/.ovflow)
    Create {
        name: PathBuf,
        /// Number of attributes per tuple
        nattrs: u32,
        /// Initial number of primary pages (2^depth <= npages < 2^(depth+1))
        npages: u32,
        /// Initial number of address bits
        depth: u32,
        /// Choice vector, e.g. "0:0,1:0,0:1,2:0"
        chvec: String,
    },
    /// Insert a tuple; "-" reads tuples line by line from stdin
    Insert { name: PathBuf, tuple: String },
    /// Partial-match query; '?' marks an unknown attribute
    Select { name: PathBuf, pattern: String },
    /// Print global counters and per-bucket chains
    Stats {
        name: PathBuf,
        #[arg(long)]
        json: bool,
    },
}
