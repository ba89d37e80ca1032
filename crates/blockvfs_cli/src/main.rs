//! BlockVFS CLI
//!
//! Command-line tools for files stored as block objects in a
//! directory-backed bucket.
//!
//! # Commands
//!
//! - `export` - Stream a file out of the bucket
//! - `import` - Store a local file in the bucket
//! - `size` - Display the size of a file
//! - `ls` - List the block objects of a file
//! - `cat` - Read a byte range of a file
//! - `truncate` - Shrink a file
//! - `rm` - Delete a file

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// BlockVFS command-line bucket tools.
#[derive(Parser)]
#[command(name = "blockvfs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the buckets
    #[arg(global = true, short, long, default_value = ".")]
    root: PathBuf,

    /// Bucket name, a directory under the root
    #[arg(global = true, short, long, default_value = blockvfs_core::DEFAULT_VFS_NAME)]
    bucket: String,

    /// Block size in bytes; must match the one the file was written with
    #[arg(global = true, long, default_value_t = blockvfs_core::DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a file out of the bucket
    Export {
        /// File name (key prefix)
        prefix: String,

        /// Destination path, or `-` for stdout
        output: PathBuf,
    },

    /// Store a local file in the bucket
    Import {
        /// File name (key prefix)
        prefix: String,

        /// Source path, or `-` for stdin
        input: PathBuf,

        /// Keep blocks past the imported length instead of deleting the file first
        #[arg(short, long)]
        keep_existing: bool,
    },

    /// Display the size of a file
    Size {
        /// File name (key prefix)
        prefix: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the block objects of a file
    Ls {
        /// File name (key prefix)
        prefix: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Read a byte range of a file
    Cat {
        /// File name (key prefix)
        prefix: String,

        /// Start offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Number of bytes (default: to the end of the file)
        #[arg(short, long)]
        length: Option<usize>,

        /// Write raw bytes instead of a hex dump
        #[arg(long)]
        raw: bool,
    },

    /// Shrink a file
    Truncate {
        /// File name (key prefix)
        prefix: String,

        /// New size in bytes
        size: u64,
    },

    /// Delete a file
    Rm {
        /// File name (key prefix)
        prefix: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so exported bytes on stdout stay clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let target = commands::Target::new(cli.root, cli.bucket, cli.block_size);

    match cli.command {
        Commands::Export { prefix, output } => {
            commands::transfer::export(&target, &prefix, &output)?;
        }
        Commands::Import {
            prefix,
            input,
            keep_existing,
        } => {
            commands::transfer::import(&target, &prefix, &input, keep_existing)?;
        }
        Commands::Size { prefix, format } => {
            commands::inspect::size(&target, &prefix, format.parse()?)?;
        }
        Commands::Ls { prefix, format } => {
            commands::inspect::ls(&target, &prefix, format.parse()?)?;
        }
        Commands::Cat {
            prefix,
            offset,
            length,
            raw,
        } => {
            commands::cat::run(&target, &prefix, offset, length, raw)?;
        }
        Commands::Truncate { prefix, size } => {
            commands::maintain::truncate(&target, &prefix, size)?;
        }
        Commands::Rm { prefix } => {
            commands::maintain::rm(&target, &prefix)?;
        }
        Commands::Version => {
            println!("BlockVFS CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("BlockVFS Core v{}", blockvfs_core::VERSION);
        }
    }

    Ok(())
}
