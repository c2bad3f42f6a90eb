//! Bank, category and sheet listings.

use qsync_core::{Bank, Category};

use crate::bootstrap::{CliContext, VendorSession};
use crate::error::CliError;
use crate::handlers::select::find;
use crate::presentation::{print_banks, print_categories, print_sheets};

pub async fn list_banks(ctx: &CliContext, refresh: bool) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let banks = session.catalog.banks(refresh).await?;
    if banks.is_empty() {
        println!("No banks offered by {}.", session.vendor.kind);
        return Ok(());
    }
    print_banks(&banks);
    Ok(())
}

pub async fn list_categories(ctx: &CliContext, bank: &str, refresh: bool) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let bank = bank_named(session, bank).await?;
    let categories = session.catalog.categories(&bank, refresh).await?;
    println!("{} [{}]", bank.name, bank.id);
    print_categories(&categories);
    Ok(())
}

pub async fn list_sheets(
    ctx: &CliContext,
    bank: &str,
    category: &str,
    refresh: bool,
) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let bank = bank_named(session, bank).await?;
    let category = category_named(session, &bank, category).await?;
    let sheets = session.catalog.sheets(&bank, &category, refresh).await?;
    println!("{} / {} [{}]", bank.name, category.name, category.id);
    print_sheets(&sheets);
    Ok(())
}

pub(crate) async fn bank_named(session: &VendorSession, query: &str) -> Result<Bank, CliError> {
    let banks = session.catalog.banks(false).await?;
    Ok(find("bank", &banks, query)?.clone())
}

pub(crate) async fn category_named(
    session: &VendorSession,
    bank: &Bank,
    query: &str,
) -> Result<Category, CliError> {
    let categories = session.catalog.categories(bank, false).await?;
    Ok(find("category", &categories, query)?.clone())
}
