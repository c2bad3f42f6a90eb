#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, VendorSession, bootstrap, bootstrap_with};
pub use commands::{
    BankCommand, CacheCommand, CategoryCommand, Commands, ConfigCommand, OutputArgs, SheetCommand,
    StageArgs,
};
pub use error::CliError;
pub use parser::Cli;
