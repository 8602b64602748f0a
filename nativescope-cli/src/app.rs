use std::path::PathBuf;

use clap::Parser;

/// nativescope - list the P/Invoke imports and unmanaged exports of .NET assemblies
#[derive(Debug, Parser)]
#[command(name = "nativescope", version, about, long_about = None)]
pub struct Cli {
    /// Assemblies or directories to analyze. Directories are searched recursively for
    /// .dll and .exe files.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Emit the report as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Analyze files in parallel.
    #[arg(short = 'j', long)]
    pub parallel: bool,
}
