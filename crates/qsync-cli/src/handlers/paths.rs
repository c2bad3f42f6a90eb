//! Paths command handler.
//!
//! Displays every resolved path, for diagnosing where the cache and the
//! delivered files live.

use qsync_core::paths::{DATA_DIR_ENV, data_root, database_path, env_file_path, output_root};

use crate::error::CliError;

pub fn execute() -> Result<(), CliError> {
    let root = data_root()?;
    println!("data_root = {}", root.display());
    println!("database = {}", database_path()?.display());
    println!("env_file = {}", env_file_path()?.display());
    println!("output_root = {}", output_root(&root).display());
    match std::env::var(DATA_DIR_ENV) {
        Ok(value) => println!("{DATA_DIR_ENV} = {value}"),
        Err(_) => println!("{DATA_DIR_ENV} = (unset)"),
    }
    Ok(())
}
