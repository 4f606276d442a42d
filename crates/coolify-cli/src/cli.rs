//! Argument parsing and command dispatch for the `coolify` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coolify_config::{CONFIG_ENV_VAR, CliConfig, ConfigStore, InstanceSelector};
use coolify_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, invocation_span};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, build_http_client};
use crate::commands::instances::{
    handle_instance_add, handle_instance_list, handle_instance_remove,
    handle_instance_set_default, handle_instance_set_token,
};
use crate::commands::private_keys::{
    handle_private_key_add, handle_private_key_get, handle_private_key_list,
    handle_private_key_remove,
};
use crate::commands::projects::{
    handle_project_add, handle_project_get, handle_project_list, handle_project_remove,
};
use crate::commands::servers::{
    handle_server_add, handle_server_get, handle_server_list, handle_server_remove,
    handle_server_validate,
};
use crate::commands::version::handle_version;
use crate::output::ViewOptions;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let request_id = Uuid::new_v4().to_string();
    let span = invocation_span(command_label(&cli.command), &request_id);

    match dispatch(cli, &request_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::debug!(exit_code = err.exit_code(), "command failed");
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, request_id: &str) -> CliResult<()> {
    let view = ViewOptions::from_flags(cli.json, cli.pretty, cli.show_sensitive);
    let target = Target {
        config: cli.config,
        selector: InstanceSelector {
            name: cli.instance,
            url: cli.url,
            token: cli.token,
        },
        timeout: cli.timeout,
    };

    match cli.command {
        Command::Instances(command) => {
            let store = ConfigStore::locate(target.config)?;
            let token = target.selector.token.as_deref();
            match command {
                InstanceCommand::List => handle_instance_list(&store, view),
                InstanceCommand::Add(args) => handle_instance_add(&store, args, token),
                InstanceCommand::Remove(args) => handle_instance_remove(&store, args),
                InstanceCommand::SetDefault(args) => handle_instance_set_default(&store, args),
                InstanceCommand::SetToken(args) => handle_instance_set_token(&store, args, token),
            }
        }
        Command::PrivateKeys(command) => {
            let ctx = target.connect(request_id)?;
            match command {
                PrivateKeyCommand::List => handle_private_key_list(&ctx, view).await,
                PrivateKeyCommand::Get(args) => handle_private_key_get(&ctx, args, view).await,
                PrivateKeyCommand::Add(args) => handle_private_key_add(&ctx, args).await,
                PrivateKeyCommand::Remove(args) => handle_private_key_remove(&ctx, args).await,
            }
        }
        Command::Projects(command) => {
            let ctx = target.connect(request_id)?;
            match command {
                ProjectCommand::List => handle_project_list(&ctx, view).await,
                ProjectCommand::Get(args) => handle_project_get(&ctx, args, view).await,
                ProjectCommand::Add(args) => handle_project_add(&ctx, args).await,
                ProjectCommand::Remove(args) => handle_project_remove(&ctx, args).await,
            }
        }
        Command::Servers(command) => {
            let ctx = target.connect(request_id)?;
            match command {
                ServerCommand::List => handle_server_list(&ctx, view).await,
                ServerCommand::Get(args) => handle_server_get(&ctx, args, view).await,
                ServerCommand::Add(args) => handle_server_add(&ctx, args).await,
                ServerCommand::Remove(args) => handle_server_remove(&ctx, args).await,
                ServerCommand::Validate(args) => handle_server_validate(&ctx, args).await,
            }
        }
        Command::Version => handle_version(&target.connect(request_id)?).await,
    }
}

/// Where remote commands send their requests.
struct Target {
    config: Option<PathBuf>,
    selector: InstanceSelector,
    timeout: u64,
}

impl Target {
    fn connect(&self, request_id: &str) -> CliResult<AppContext> {
        // An ad-hoc URL never consults the configuration file.
        let config = if self.selector.url.is_some() {
            CliConfig::default()
        } else {
            ConfigStore::locate(self.config.clone())?.load()?
        };
        let resolved = config.resolve(&self.selector)?;
        tracing::debug!(instance = %resolved.name, api_root = %resolved.api_root, "instance resolved");

        let client = build_http_client(self.timeout, request_id)?;
        Ok(AppContext::new(client, resolved))
    }
}

#[derive(Parser)]
#[command(name = "coolify", about = "Command-line client for the Coolify API")]
pub(crate) struct Cli {
    /// Show sensitive information (IP addresses, users, ports, keys, tokens).
    #[arg(short = 's', long = "show-sensitive", global = true)]
    show_sensitive: bool,
    /// Print the response as tab-indented JSON.
    #[arg(long, global = true, conflicts_with = "json")]
    pretty: bool,
    /// Print the raw JSON response.
    #[arg(long, global = true)]
    json: bool,
    /// Configured instance to use instead of the default one.
    #[arg(long, global = true, env = "COOLIFY_INSTANCE")]
    instance: Option<String>,
    /// Instance URL to use without touching the configuration file.
    #[arg(long, global = true, env = "COOLIFY_URL")]
    url: Option<String>,
    /// API token; overrides the configured one.
    #[arg(long, global = true, env = "COOLIFY_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Configuration file path.
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
    /// HTTP timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "COOLIFY_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    /// Log output format (`pretty` or `json`).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Private key related commands.
    #[command(subcommand)]
    PrivateKeys(PrivateKeyCommand),
    /// Project related commands.
    #[command(subcommand)]
    Projects(ProjectCommand),
    /// Server related commands.
    #[command(subcommand)]
    Servers(ServerCommand),
    /// Manage configured instances.
    #[command(subcommand)]
    Instances(InstanceCommand),
    /// Print the version reported by the instance.
    Version,
}

#[derive(Subcommand)]
pub(crate) enum PrivateKeyCommand {
    /// List all private keys.
    List,
    /// Get private key details by uuid.
    Get(UuidArgs),
    /// Add a private key from a literal value or a file.
    Add(PrivateKeyAddArgs),
    /// Remove a private key.
    Remove(UuidArgs),
}

#[derive(Subcommand)]
pub(crate) enum ProjectCommand {
    /// List all projects.
    List,
    /// Get a project by uuid.
    Get(ProjectGetArgs),
    /// Add a project.
    Add(NameArgs),
    /// Remove a project.
    Remove(UuidArgs),
}

#[derive(Subcommand)]
pub(crate) enum ServerCommand {
    /// List all servers.
    List,
    /// Get server details by uuid.
    Get(ServerGetArgs),
    /// Add a server.
    Add(ServerAddArgs),
    /// Remove a server.
    Remove(UuidArgs),
    /// Validate a server.
    Validate(UuidArgs),
}

#[derive(Subcommand)]
pub(crate) enum InstanceCommand {
    /// List configured instances.
    List,
    /// Add an instance; the token comes from --token or a prompt.
    Add(InstanceAddArgs),
    /// Remove an instance.
    Remove(InstanceNameArgs),
    /// Make an instance the default.
    SetDefault(InstanceNameArgs),
    /// Replace the token of an instance.
    SetToken(InstanceNameArgs),
}

#[derive(Args, Debug)]
pub(crate) struct UuidArgs {
    pub(crate) uuid: String,
}

#[derive(Args, Debug)]
pub(crate) struct NameArgs {
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct PrivateKeyAddArgs {
    pub(crate) name: String,
    /// Private key material, or a path to a file containing it.
    #[arg(value_name = "PRIVATE_KEY_OR_FILE")]
    pub(crate) private_key: String,
}

#[derive(Args, Debug)]
pub(crate) struct ProjectGetArgs {
    pub(crate) uuid: String,
    /// Environment name; lists the environment's applications.
    #[arg(short = 'e', long)]
    pub(crate) environment: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ServerGetArgs {
    pub(crate) uuid: String,
    /// List the resources hosted on the server.
    #[arg(long)]
    pub(crate) resources: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ServerAddArgs {
    pub(crate) name: String,
    pub(crate) ip: String,
    pub(crate) private_key_uuid: String,
    /// SSH port.
    #[arg(short = 'p', long, default_value_t = 22)]
    pub(crate) port: u16,
    /// SSH user.
    #[arg(short = 'u', long, default_value = "root")]
    pub(crate) user: String,
    /// Validate the server right after adding it.
    #[arg(long)]
    pub(crate) validate: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InstanceAddArgs {
    pub(crate) name: String,
    /// Base URL of the instance, e.g. `https://app.coolify.io`.
    pub(crate) fqdn: String,
    /// Make this the default instance.
    #[arg(long)]
    pub(crate) default: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InstanceNameArgs {
    pub(crate) name: String,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::PrivateKeys(PrivateKeyCommand::List) => "private_keys_list",
        Command::PrivateKeys(PrivateKeyCommand::Get(_)) => "private_keys_get",
        Command::PrivateKeys(PrivateKeyCommand::Add(_)) => "private_keys_add",
        Command::PrivateKeys(PrivateKeyCommand::Remove(_)) => "private_keys_remove",
        Command::Projects(ProjectCommand::List) => "projects_list",
        Command::Projects(ProjectCommand::Get(_)) => "projects_get",
        Command::Projects(ProjectCommand::Add(_)) => "projects_add",
        Command::Projects(ProjectCommand::Remove(_)) => "projects_remove",
        Command::Servers(ServerCommand::List) => "servers_list",
        Command::Servers(ServerCommand::Get(_)) => "servers_get",
        Command::Servers(ServerCommand::Add(_)) => "servers_add",
        Command::Servers(ServerCommand::Remove(_)) => "servers_remove",
        Command::Servers(ServerCommand::Validate(_)) => "servers_validate",
        Command::Instances(InstanceCommand::List) => "instances_list",
        Command::Instances(InstanceCommand::Add(_)) => "instances_add",
        Command::Instances(InstanceCommand::Remove(_)) => "instances_remove",
        Command::Instances(InstanceCommand::SetDefault(_)) => "instances_set_default",
        Command::Instances(InstanceCommand::SetToken(_)) => "instances_set_token",
        Command::Version => "version",
    }
}
