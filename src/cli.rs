use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chapterfy")]
#[command(about = "Split a PDF into per-chapter files using its bookmarks or page ranges")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Print the bookmark tree
    Toc {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// List the chapters derived from top-level bookmarks
    Chapters {
        /// PDF file to inspect
        path: PathBuf,

        /// Only keep chapters whose title contains this (case-insensitive)
        #[arg(short, long, default_value = "")]
        keyword: String,
    },

    /// Write selected chapters to separate PDFs
    #[command(alias = "chapterfy")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Existing output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Only keep bookmark chapters whose title contains this (case-insensitive)
        #[arg(short, long, default_value = "")]
        keyword: String,

        /// Chapter rows to export, as numbered by `chapters` (e.g. "1,3")
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<usize>,

        /// Export every bookmark chapter
        #[arg(short, long)]
        all: bool,

        /// Page ranges to export as extra chapters (e.g. "1-5, 7-9")
        #[arg(short, long)]
        ranges: Option<String>,
    },

    /// Pick chapters in a line-driven session
    Interactive {
        /// PDF file to open right away
        path: Option<PathBuf>,

        /// Initial chapter title filter
        #[arg(short, long, default_value = "")]
        keyword: String,
    },
}
