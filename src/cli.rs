use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Marketplace catalog with content-addressed image storage")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema and the image directory
    Init,

    /// List a new item for sale
    Add {
        /// Item name
        #[arg(long)]
        name: String,

        /// Category name (created if it does not exist)
        #[arg(long)]
        category: String,

        /// JPEG photo of the item
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Show every listed item
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single item
    Get {
        /// Item id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find items whose name contains a keyword
    Search {
        /// Keyword to look for
        keyword: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the file that would be served for an image name
    Image {
        /// Image filename
        filename: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
