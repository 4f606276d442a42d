use coolify_api_models::{
    CreateServerRequest, SERVERS_MIN_VERSION, Server, ServerResources, UuidResponse,
};

use crate::cli::{ServerAddArgs, ServerGetArgs, UuidArgs};
use crate::client::{AppContext, CliError, CliResult, decode_ack, ensure_min_version};
use crate::commands::{ack_message, fetch_and_render};
use crate::output::{Table, ViewOptions};

const SERVER_HEADER: [&str; 7] = [
    "Uuid",
    "Name",
    "IP Address",
    "User",
    "Port",
    "Reachable",
    "Usable",
];

pub(crate) async fn handle_server_list(ctx: &AppContext, view: ViewOptions) -> CliResult<()> {
    ensure_min_version(ctx, SERVERS_MIN_VERSION).await?;
    let url = ctx.endpoint(&["servers"])?;
    fetch_and_render(ctx, url, view, "servers", |servers: &Vec<Server>, view| {
        server_table(servers, view)
    })
    .await
}

pub(crate) async fn handle_server_get(
    ctx: &AppContext,
    args: ServerGetArgs,
    view: ViewOptions,
) -> CliResult<()> {
    ensure_min_version(ctx, SERVERS_MIN_VERSION).await?;
    let mut url = ctx.endpoint(&["servers", &args.uuid])?;
    if args.resources {
        url.query_pairs_mut().append_pair("resources", "true");
        fetch_and_render(ctx, url, view, "server resources", |detail: &ServerResources, _| {
            resource_table(detail)
        })
        .await
    } else {
        fetch_and_render(ctx, url, view, "server", |server: &Server, view| {
            server_table(std::slice::from_ref(server), view)
        })
        .await
    }
}

pub(crate) async fn handle_server_add(ctx: &AppContext, args: ServerAddArgs) -> CliResult<()> {
    ensure_min_version(ctx, SERVERS_MIN_VERSION).await?;

    let name = args.name.trim();
    let ip = args.ip.trim();
    if name.is_empty() || ip.is_empty() {
        return Err(CliError::validation("server name and IP address are required"));
    }

    let request = CreateServerRequest {
        name: name.to_string(),
        ip: ip.to_string(),
        port: args.port,
        user: args.user,
        private_key_uuid: args.private_key_uuid,
        instant_validate: args.validate,
    };
    let body = ctx.post(ctx.endpoint(&["servers"])?, &request).await?;
    let created: UuidResponse = decode_ack(&body);
    println!("{}", added_message(&created.uuid, args.validate));
    Ok(())
}

pub(crate) async fn handle_server_remove(ctx: &AppContext, args: UuidArgs) -> CliResult<()> {
    ensure_min_version(ctx, SERVERS_MIN_VERSION).await?;
    let body = ctx.delete(ctx.endpoint(&["servers", &args.uuid])?).await?;
    println!("{}", ack_message(&body, "Server deleted."));
    Ok(())
}

pub(crate) async fn handle_server_validate(ctx: &AppContext, args: UuidArgs) -> CliResult<()> {
    ensure_min_version(ctx, SERVERS_MIN_VERSION).await?;
    let body = ctx
        .fetch(ctx.endpoint(&["servers", &args.uuid, "validate"])?)
        .await?;
    println!("{}", ack_message(&body, "Validation started."));
    Ok(())
}

fn added_message(uuid: &str, validated: bool) -> String {
    if validated {
        format!("Server added successfully with uuid {uuid}")
    } else {
        format!(
            "Server added successfully with uuid {uuid}. Server is not validated. \
             Use 'servers validate {uuid}' to validate the server."
        )
    }
}

pub(crate) fn server_table(servers: &[Server], view: &ViewOptions) -> Table {
    let mut table = Table::new(&SERVER_HEADER);
    for server in servers {
        let port = server.port.to_string();
        table.push_row([
            server.uuid.clone(),
            server.name.clone(),
            view.sensitive(&server.ip).into_owned(),
            view.sensitive(&server.user).into_owned(),
            view.sensitive(&port).into_owned(),
            server.settings.reachable.to_string(),
            server.settings.usable.to_string(),
        ]);
    }
    table.set_masked(!view.show_sensitive && !servers.is_empty());
    table
}

pub(crate) fn resource_table(detail: &ServerResources) -> Table {
    let mut table = Table::new(&["Uuid", "Name", "Type", "Status"]);
    for resource in &detail.resources {
        table.push_row([
            resource.uuid.as_str(),
            resource.name.as_str(),
            resource.kind.as_str(),
            resource.status.as_str(),
        ]);
    }
    table
}
