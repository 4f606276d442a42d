use crate::client::{AppContext, CliResult, fetch_version};

pub(crate) async fn handle_version(ctx: &AppContext) -> CliResult<()> {
    let version = fetch_version(ctx).await?;
    println!("{version}");
    Ok(())
}
