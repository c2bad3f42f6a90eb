//! Config command handler.

use qsync_core::{Settings, SettingsUpdate};

use crate::bootstrap::CliContext;
use crate::commands::ConfigCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let settings = ctx.current_settings().await?;
            print_settings(&settings);
            Ok(())
        }
        ConfigCommand::Set {
            fetch_no_progress_limit,
            source_batch_size,
            fetch_item_delay_ms,
            convert_item_delay_ms,
            upload_item_delay_ms,
            finish_delay_ms,
            default_output,
            listing_ttl_secs,
            reset,
        } => {
            if reset {
                ctx.settings.reset().await?;
                println!("✓ Settings reset to defaults.");
                return Ok(());
            }

            let update = SettingsUpdate {
                fetch_no_progress_limit: fetch_no_progress_limit.map(Some),
                source_batch_size: source_batch_size.map(Some),
                fetch_item_delay_ms: fetch_item_delay_ms.map(Some),
                convert_item_delay_ms: convert_item_delay_ms.map(Some),
                upload_item_delay_ms: upload_item_delay_ms.map(Some),
                finish_delay_ms: finish_delay_ms.map(Some),
                default_output: default_output.map(Some),
                listing_ttl_secs: listing_ttl_secs.map(Some),
            };
            if update.is_empty() {
                println!("No settings provided. Use --help to see available options.");
                return Ok(());
            }

            if let Some(Some(output)) = &update.default_output {
                ctx.config.vendor.output(output)?;
            }

            let settings = ctx.settings.update(update).await?;
            println!("✓ Settings updated.");
            print_settings(&settings);
            Ok(())
        }
    }
}

fn print_settings(settings: &Settings) {
    println!("Current pipeline settings:");
    println!(
        "  fetch_no_progress_limit: {}",
        settings.effective_no_progress_limit()
    );
    println!("  source_batch_size:       {}", settings.effective_batch_size());
    println!(
        "  fetch_item_delay_ms:     {}",
        settings.fetch_item_delay().as_millis()
    );
    println!(
        "  convert_item_delay_ms:   {}",
        settings.convert_item_delay().as_millis()
    );
    println!(
        "  upload_item_delay_ms:    {}",
        settings.upload_item_delay().as_millis()
    );
    println!(
        "  finish_delay_ms:         {}",
        settings.finish_delay().as_millis()
    );
    println!(
        "  default_output:          {}",
        settings.default_output.as_deref().unwrap_or("(markdown)")
    );
    match settings.listing_ttl_secs {
        Some(ttl) => println!("  listing_ttl_secs:        {ttl}"),
        None => println!("  listing_ttl_secs:        (until refreshed)"),
    }
}
