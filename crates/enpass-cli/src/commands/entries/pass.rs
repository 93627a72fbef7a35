use crate::app::AppContext;
use crate::cli::FilterArgs;
use crate::errors::CliError;

/// Print the secret of the single matching entry and nothing else.
pub fn handle_pass(ctx: &AppContext, args: &FilterArgs) -> anyhow::Result<()> {
    let mut vault = ctx.open_vault()?;
    let entry = vault
        .get_unique_entry(&ctx.entry_query(&args.filters))
        .map_err(|err| CliError::from_vault_error(&err))?;
    vault.close();

    let secret = entry
        .decrypt()
        .map_err(|err| anyhow::anyhow!("could not decrypt {}: {}", entry.title, err))?;
    println!("{}", secret.as_str());
    Ok(())
}
