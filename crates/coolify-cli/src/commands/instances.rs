//! Local management of configured instances. Nothing here talks to the API.

use std::io::{self, IsTerminal};

use anyhow::anyhow;
use coolify_config::{CliConfig, ConfigError, ConfigStore, Instance};

use crate::cli::{InstanceAddArgs, InstanceNameArgs};
use crate::client::{CliError, CliResult};
use crate::output::{Table, ViewOptions, render_value};

pub(crate) fn handle_instance_list(store: &ConfigStore, view: ViewOptions) -> CliResult<()> {
    let config = store.load()?;
    let shown = masked_config(&config, &view);
    if render_value(&shown, view.mode)? {
        return Ok(());
    }
    instance_table(&config, &view).print();
    Ok(())
}

pub(crate) fn handle_instance_add(
    store: &ConfigStore,
    args: InstanceAddArgs,
    token: Option<&str>,
) -> CliResult<()> {
    let mut config = store.load()?;
    let token = resolve_token(token, &args.name)?;
    config.add(
        Instance {
            name: args.name,
            fqdn: args.fqdn,
            token,
            default: false,
        },
        args.default,
    )?;
    store.save(&config)?;

    if let Some(added) = config.instances.last() {
        println!("Instance '{}' added ({})", added.name, added.fqdn);
    }
    Ok(())
}

pub(crate) fn handle_instance_remove(store: &ConfigStore, args: InstanceNameArgs) -> CliResult<()> {
    let mut config = store.load()?;
    let removed = config.remove(&args.name)?;
    store.save(&config)?;
    println!("Instance '{}' removed", removed.name);
    if removed.default
        && let Some(promoted) = config.default_instance()
    {
        println!("Default instance is now '{}'", promoted.name);
    }
    Ok(())
}

pub(crate) fn handle_instance_set_default(
    store: &ConfigStore,
    args: InstanceNameArgs,
) -> CliResult<()> {
    let mut config = store.load()?;
    config.set_default(&args.name)?;
    store.save(&config)?;
    println!("Default instance set to '{}'", args.name);
    Ok(())
}

pub(crate) fn handle_instance_set_token(
    store: &ConfigStore,
    args: InstanceNameArgs,
    token: Option<&str>,
) -> CliResult<()> {
    let mut config = store.load()?;
    if config.find(&args.name).is_none() {
        return Err(ConfigError::UnknownInstance { name: args.name }.into());
    }
    let token = resolve_token(token, &args.name)?;
    config.set_token(&args.name, &token)?;
    store.save(&config)?;
    println!("Token updated for instance '{}'", args.name);
    Ok(())
}

/// Use the `--token` value when given, otherwise prompt on a terminal.
pub(crate) fn resolve_token(flag: Option<&str>, instance: &str) -> CliResult<String> {
    if let Some(value) = flag {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CliError::validation("token cannot be empty"));
        }
        return Ok(trimmed.to_string());
    }

    if io::stdin().is_terminal() {
        let token = rpassword::prompt_password(format!("API token for '{instance}': "))
            .map_err(|err| CliError::failure(anyhow!("failed to read token from stdin: {err}")))?;
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CliError::validation("token cannot be empty"));
        }
        Ok(trimmed.to_string())
    } else {
        Err(CliError::validation(
            "token required; supply via --token or COOLIFY_TOKEN when running non-interactively",
        ))
    }
}

fn masked_config(config: &CliConfig, view: &ViewOptions) -> CliConfig {
    let mut shown = config.clone();
    for instance in &mut shown.instances {
        instance.token = view.sensitive(&instance.token).into_owned();
    }
    shown
}

pub(crate) fn instance_table(config: &CliConfig, view: &ViewOptions) -> Table {
    let mut table = Table::new(&["Name", "Fqdn", "Token", "Default"]);
    for instance in &config.instances {
        let token = if instance.token.is_empty() {
            String::new()
        } else {
            view.sensitive(&instance.token).into_owned()
        };
        table.push_row([
            instance.name.clone(),
            instance.fqdn.clone(),
            token,
            instance.default.to_string(),
        ]);
    }
    table.set_masked(
        !view.show_sensitive
            && config
                .instances
                .iter()
                .any(|instance| !instance.token.is_empty()),
    );
    table
}
