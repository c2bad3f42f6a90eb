//! Cache command handler.

use qsync_core::{ArtifactCoordinate, CacheScope, KeyScope, SheetCoordinate, keys};

use crate::bootstrap::CliContext;
use crate::commands::CacheCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: CacheCommand) -> Result<(), CliError> {
    match command {
        CacheCommand::Invalidate {
            scope,
            bank,
            category,
            sheet,
            output,
        } => {
            let ids = ScopeIds {
                vendor: ctx.config.vendor.key(),
                username: &ctx.config.username,
                bank: bank.as_deref(),
                category: category.as_deref(),
                sheet: sheet.as_deref(),
                output: output.as_deref().unwrap_or("markdown"),
            };
            let scope = KeyScope::parse(&scope).ok_or_else(|| {
                CliError::Arguments(format!(
                    "Unknown cache scope '{scope}'; expected one of: {}",
                    KeyScope::ALL.map(KeyScope::as_str).join(", ")
                ))
            })?;

            let removed = ids.invalidate(ctx, scope).await?;
            println!("✓ Removed {removed} cached entries ({})", scope.as_str());
            Ok(())
        }
    }
}

/// Raw ids addressing a scope. Cache keys hold ids, never display names.
struct ScopeIds<'a> {
    vendor: &'a str,
    username: &'a str,
    bank: Option<&'a str>,
    category: Option<&'a str>,
    sheet: Option<&'a str>,
    output: &'a str,
}

impl ScopeIds<'_> {
    async fn invalidate(&self, ctx: &CliContext, scope: KeyScope) -> Result<u64, CliError> {
        let store = ctx.stores.cache.as_ref();
        let vendor = self.vendor;
        let removed = match scope {
            KeyScope::Banks => keys::invalidate(store, &CacheScope::Banks { vendor }).await?,
            KeyScope::Categories => {
                let bank = required("bank", self.bank)?;
                keys::invalidate(store, &CacheScope::Categories { vendor, bank }).await?
            }
            KeyScope::Sheets => {
                let bank = required("bank", self.bank)?;
                let category = required("category", self.category)?;
                keys::invalidate(
                    store,
                    &CacheScope::Sheets {
                        vendor,
                        bank,
                        category,
                    },
                )
                .await?
            }
            KeyScope::Login => {
                let username = self.username;
                keys::invalidate(store, &CacheScope::Login { vendor, username }).await?
            }
            KeyScope::OriginItems => {
                let sheet = self.sheet_coordinate()?;
                keys::invalidate(store, &CacheScope::OriginItems(&sheet)).await?
            }
            KeyScope::Items => {
                let artifact: ArtifactCoordinate =
                    self.sheet_coordinate()?.with_output(self.output);
                keys::invalidate(store, &CacheScope::Items(&artifact)).await?
            }
        };
        Ok(removed)
    }

    fn sheet_coordinate(&self) -> Result<SheetCoordinate, CliError> {
        Ok(SheetCoordinate::new(
            self.vendor,
            required("bank", self.bank)?,
            required("category", self.category)?,
            required("sheet", self.sheet)?,
        ))
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, CliError> {
    value.ok_or_else(|| CliError::Arguments(format!("--{name} is required for this scope")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_names_the_flag() {
        let err = required("bank", None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid arguments: --bank is required for this scope");
        assert_eq!(required("bank", Some("b1")).unwrap(), "b1");
    }
}
