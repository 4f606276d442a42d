use coolify_api_models::{CreateProjectRequest, Environment, Project, UuidResponse};

use crate::cli::{NameArgs, ProjectGetArgs, UuidArgs};
use crate::client::{AppContext, CliError, CliResult, decode_ack};
use crate::commands::{ack_message, fetch_and_render};
use crate::output::{Table, ViewOptions};

pub(crate) async fn handle_project_list(ctx: &AppContext, view: ViewOptions) -> CliResult<()> {
    let url = ctx.endpoint(&["projects"])?;
    fetch_and_render(ctx, url, view, "projects", |projects: &Vec<Project>, _| {
        project_list_table(projects)
    })
    .await
}

pub(crate) async fn handle_project_get(
    ctx: &AppContext,
    args: ProjectGetArgs,
    view: ViewOptions,
) -> CliResult<()> {
    match args
        .environment
        .as_deref()
        .map(str::trim)
        .filter(|env| !env.is_empty())
    {
        Some(environment) => {
            let url = ctx.endpoint(&["projects", &args.uuid, environment])?;
            fetch_and_render(ctx, url, view, "environment", |env: &Environment, _| {
                environment_table(env)
            })
            .await
        }
        None => {
            let url = ctx.endpoint(&["projects", &args.uuid])?;
            fetch_and_render(ctx, url, view, "project", |project: &Project, _| {
                project_detail_table(project)
            })
            .await
        }
    }
}

pub(crate) async fn handle_project_add(ctx: &AppContext, args: NameArgs) -> CliResult<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::validation("project name cannot be empty"));
    }

    let request = CreateProjectRequest {
        name: name.to_string(),
    };
    let body = ctx.post(ctx.endpoint(&["projects"])?, &request).await?;
    println!("{}", added_message(&body));
    Ok(())
}

pub(crate) async fn handle_project_remove(ctx: &AppContext, args: UuidArgs) -> CliResult<()> {
    let body = ctx.delete(ctx.endpoint(&["projects", &args.uuid])?).await?;
    println!("{}", ack_message(&body, "Project deleted."));
    Ok(())
}

/// Success line for a create response carrying the new project's uuid.
fn added_message(body: &str) -> String {
    let created: UuidResponse = decode_ack(body);
    format!("Project added successfully with uuid {}", created.uuid)
}

pub(crate) fn project_list_table(projects: &[Project]) -> Table {
    let mut table = Table::new(&["Uuid", "Name"]);
    for project in projects {
        table.push_row([project.uuid.as_str(), project.name.as_str()]);
    }
    table
}

pub(crate) fn project_detail_table(project: &Project) -> Table {
    let mut table = Table::new(&["Uuid", "Name", "Environments"]);
    table.push_row([
        project.uuid.clone(),
        project.name.clone(),
        project.environment_labels(),
    ]);
    table
}

pub(crate) fn environment_table(environment: &Environment) -> Table {
    let mut table = Table::new(&["Uuid", "Name", "Status"]);
    for app in &environment.applications {
        table.push_row([app.uuid.as_str(), app.name.as_str(), app.status.as_str()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{BEARER, context_for};
    use coolify_api_models::Application;
    use httpmock::prelude::*;
    use serde_json::json;

    fn env(name: &str, uuid: &str) -> Environment {
        Environment {
            uuid: uuid.into(),
            name: name.into(),
            ..Environment::default()
        }
    }

    #[test]
    fn detail_table_joins_environments() {
        let project = Project {
            uuid: "pj-1".into(),
            name: "shop".into(),
            environments: vec![env("production", "e-1"), env("staging", "e-2")],
        };
        assert_eq!(
            project_detail_table(&project).render(),
            "Uuid  Name  Environments\n\
             pj-1  shop  production (e-1), staging (e-2)\n"
        );
    }

    #[test]
    fn environment_table_lists_applications() {
        let mut production = env("production", "e-1");
        production.applications = vec![
            Application {
                uuid: "app-1".into(),
                name: "web".into(),
                status: "running:healthy".into(),
                ..Application::default()
            },
            Application {
                uuid: "app-22".into(),
                name: "worker".into(),
                status: "exited".into(),
                ..Application::default()
            },
        ];
        assert_eq!(
            environment_table(&production).render(),
            "Uuid    Name    Status\n\
             app-1   web     running:healthy\n\
             app-22  worker  exited\n"
        );
    }

    #[test]
    fn list_table_renders_each_project() {
        let projects = vec![
            Project {
                uuid: "pj-1".into(),
                name: "shop".into(),
                environments: Vec::new(),
            },
            Project {
                uuid: "pj-20".into(),
                name: "blog".into(),
                environments: Vec::new(),
            },
        ];
        assert_eq!(
            project_list_table(&projects).render(),
            "Uuid   Name\npj-1   shop\npj-20  blog\n"
        );
    }

    #[test]
    fn added_message_reports_created_uuid() {
        assert_eq!(
            added_message(r#"{"uuid":"pj-9"}"#),
            "Project added successfully with uuid pj-9"
        );
    }

    #[tokio::test]
    async fn get_with_environment_fetches_nested_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/projects/pj-1/production")
                    .header("authorization", BEARER);
                then.status(200).json_body(json!({
                    "uuid": "e-1",
                    "name": "production",
                    "applications": [{"uuid": "app-1", "name": "web", "status": "running"}]
                }));
            })
            .await;

        let ctx = context_for(&server);
        handle_project_get(
            &ctx,
            ProjectGetArgs {
                uuid: "pj-1".into(),
                environment: Some("production".into()),
            },
            ViewOptions::default(),
        )
        .await
        .expect("get succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_without_environment_fetches_project() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/projects/pj-1");
                then.status(200).json_body(json!({
                    "uuid": "pj-1",
                    "name": "shop",
                    "environments": [{"uuid": "e-1", "name": "production"}]
                }));
            })
            .await;

        let ctx = context_for(&server);
        handle_project_get(
            &ctx,
            ProjectGetArgs {
                uuid: "pj-1".into(),
                environment: None,
            },
            ViewOptions::default(),
        )
        .await
        .expect("get succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_posts_project_name() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/projects")
                    .header("authorization", BEARER)
                    .json_body(json!({"name": "shop"}));
                then.status(201).json_body(json!({"uuid": "pj-9"}));
            })
            .await;

        let ctx = context_for(&server);
        handle_project_add(&ctx, NameArgs { name: "shop".into() })
            .await
            .expect("add succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_rejects_blank_name_without_request() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server);
        let err = handle_project_add(&ctx, NameArgs { name: "  ".into() })
            .await
            .expect_err("blank name");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn remove_deletes_project() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/projects/pj-1");
                then.status(200)
                    .json_body(json!({"message": "Project deleted."}));
            })
            .await;

        let ctx = context_for(&server);
        handle_project_remove(&ctx, UuidArgs { uuid: "pj-1".into() })
            .await
            .expect("remove succeeds");
        mock.assert_async().await;
    }
}
