//! Login command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Log in with `password`, or report the cached session without one.
pub async fn execute(ctx: &CliContext, password: Option<&str>) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let login = session
        .catalog
        .login(&ctx.config.username, password)
        .await?;

    if password.is_some() {
        println!("✓ Logged in to {} as {}", session.vendor.kind, login.username);
    } else {
        println!(
            "Logged in to {} as {} since {}",
            session.vendor.kind,
            login.username,
            login.logged_in_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}
