//! Commands enum and subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Bank, category and sheet selection shared by the pipeline stages.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StageArgs {
    /// Bank id or name
    #[arg(short, long)]
    pub bank: String,
    /// Category id or name ('*' for the whole bank)
    #[arg(short, long)]
    pub category: String,
    /// Sheet id or name ('*' runs every sheet of the category)
    #[arg(short, long, default_value = "*")]
    pub sheet: String,
}

/// Render target options shared by convert, upload and sync.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Output format (falls back to the configured default, then markdown)
    #[arg(short, long)]
    pub output: Option<String>,
    /// Root of the delivery tree (default: <data root>/output)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths for the qsync data directories
    Paths,

    /// Work with the vendor's banks
    Bank {
        #[command(subcommand)]
        command: BankCommand,
    },

    /// Work with a bank's categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Work with a category's sheets
    Sheet {
        #[command(subcommand)]
        command: SheetCommand,
    },

    /// Log in to the vendor, or show the cached session
    Login {
        /// Password; omit to show the cached session
        #[arg(short, long, env = "QSYNC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Pull raw items of a sheet into the cache
    Fetch {
        #[command(flatten)]
        target: StageArgs,
        /// Replay every cached item instead of asking the vendor
        #[arg(long)]
        refetch: bool,
    },

    /// Render cached raw items into artifacts
    Convert {
        #[command(flatten)]
        target: StageArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Drop existing artifacts and render everything again
        #[arg(long)]
        reconvert: bool,
    },

    /// Deliver artifacts to the output in item order
    Upload {
        #[command(flatten)]
        target: StageArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Start delivery from the first artifact
        #[arg(long)]
        reupload: bool,
    },

    /// Fetch, convert and upload in one go
    Sync {
        #[command(flatten)]
        target: StageArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long)]
        refetch: bool,
        #[arg(long)]
        reconvert: bool,
        #[arg(long)]
        reupload: bool,
    },

    /// Manage the local cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// View or change pipeline settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum BankCommand {
    /// List banks
    List {
        /// Ask the vendor again instead of using the cache
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Print the category tree of a bank
    List {
        /// Bank id or name
        #[arg(short, long)]
        bank: String,
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Subcommand)]
pub enum SheetCommand {
    /// List the sheets of a category
    List {
        #[arg(short, long)]
        bank: String,
        #[arg(short, long)]
        category: String,
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Drop one scope: banks, categories, sheets, login, origin-items or items
    Invalidate {
        scope: String,
        #[arg(short, long)]
        bank: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        sheet: Option<String>,
        /// Output whose artifacts to drop (items scope)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the current settings
    Show,
    /// Update settings
    Set {
        /// Consecutive empty batches before a fetch gives up (1-100)
        #[arg(long)]
        fetch_no_progress_limit: Option<u32>,
        /// Chunk size of replayed batches (1-1000)
        #[arg(long)]
        source_batch_size: Option<u32>,
        #[arg(long)]
        fetch_item_delay_ms: Option<u64>,
        #[arg(long)]
        convert_item_delay_ms: Option<u64>,
        #[arg(long)]
        upload_item_delay_ms: Option<u64>,
        #[arg(long)]
        finish_delay_ms: Option<u64>,
        /// Output used when a command does not name one
        #[arg(long)]
        default_output: Option<String>,
        /// Seconds a cached bank/category/sheet listing stays valid
        #[arg(long)]
        listing_ttl_secs: Option<u64>,
        /// Reset every setting to its default
        #[arg(long, conflicts_with_all = [
            "fetch_no_progress_limit",
            "source_batch_size",
            "fetch_item_delay_ms",
            "convert_item_delay_ms",
            "upload_item_delay_ms",
            "finish_delay_ms",
            "default_output",
            "listing_ttl_secs",
        ])]
        reset: bool,
    },
}
