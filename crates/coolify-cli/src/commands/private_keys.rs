use std::path::Path;

use anyhow::anyhow;
use coolify_api_models::{CreatePrivateKeyRequest, PRIVATE_KEY_WRITE_MIN_VERSION, PrivateKey};

use crate::cli::{PrivateKeyAddArgs, UuidArgs};
use crate::client::{AppContext, CliError, CliResult, ensure_min_version};
use crate::commands::fetch_and_render;
use crate::output::{Table, ViewOptions};

const REMOVED_MESSAGE: &str = "Private key removed successfully";

pub(crate) async fn handle_private_key_list(ctx: &AppContext, view: ViewOptions) -> CliResult<()> {
    let url = ctx.endpoint(&["security", "keys"])?;
    fetch_and_render(ctx, url, view, "private keys", |keys: &Vec<PrivateKey>, _| {
        private_key_list_table(keys)
    })
    .await
}

pub(crate) async fn handle_private_key_get(
    ctx: &AppContext,
    args: UuidArgs,
    view: ViewOptions,
) -> CliResult<()> {
    let url = ctx.endpoint(&["security", "keys", &args.uuid])?;
    fetch_and_render(ctx, url, view, "private key", private_key_detail_table).await
}

pub(crate) async fn handle_private_key_add(
    ctx: &AppContext,
    args: PrivateKeyAddArgs,
) -> CliResult<()> {
    ensure_min_version(ctx, PRIVATE_KEY_WRITE_MIN_VERSION).await?;

    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::validation("private key name cannot be empty"));
    }
    let private_key = read_key_material(&args.private_key)?;
    if private_key.trim().is_empty() {
        return Err(CliError::validation("private key cannot be empty"));
    }

    let request = CreatePrivateKeyRequest {
        name: name.to_string(),
        private_key,
    };
    ctx.post(ctx.endpoint(&["security", "keys"])?, &request)
        .await?;
    println!("{}", added_message(name));
    Ok(())
}

pub(crate) async fn handle_private_key_remove(ctx: &AppContext, args: UuidArgs) -> CliResult<()> {
    ensure_min_version(ctx, PRIVATE_KEY_WRITE_MIN_VERSION).await?;
    ctx.delete(ctx.endpoint(&["security", "keys", &args.uuid])?)
        .await?;
    println!("{REMOVED_MESSAGE}");
    Ok(())
}

fn added_message(name: &str) -> String {
    format!("Private key '{name}' added successfully")
}

/// Treat `input` as a file path when it names an existing file, otherwise as
/// the key itself.
pub(crate) fn read_key_material(input: &str) -> CliResult<String> {
    let path = Path::new(input);
    if !path.is_file() {
        return Ok(input.to_string());
    }
    tracing::debug!(path = %path.display(), "reading private key from file");
    std::fs::read_to_string(path).map_err(|err| {
        CliError::failure(anyhow!(
            "failed to read private key file '{}': {err}",
            path.display()
        ))
    })
}

pub(crate) fn private_key_list_table(keys: &[PrivateKey]) -> Table {
    let mut table = Table::new(&["Uuid", "Name"]);
    for key in keys {
        table.push_row([key.uuid.as_str(), key.name.as_str()]);
    }
    table
}

pub(crate) fn private_key_detail_table(key: &PrivateKey, view: &ViewOptions) -> Table {
    let mut table = Table::new(&["Uuid", "Name", "PublicKey", "PrivateKey"]);
    let private_key = if view.show_sensitive {
        key.private_key.replace('\n', "\\n")
    } else {
        view.sensitive(&key.private_key).into_owned()
    };
    table.push_row([
        key.uuid.clone(),
        key.name.clone(),
        view.sensitive(&key.public_key).into_owned(),
        private_key,
    ]);
    table.set_masked(!view.show_sensitive);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{BEARER, context_for};
    use crate::output::{RenderMode, SENSITIVE_OVERLAY};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    fn sample_key() -> PrivateKey {
        PrivateKey {
            id: 1,
            uuid: "key-1".into(),
            name: "deploy".into(),
            public_key: "ssh-ed25519 AAAA deploy".into(),
            private_key: "-----BEGIN KEY-----\nabc\n-----END KEY-----\n".into(),
        }
    }

    async fn mock_version(server: &MockServer, version: &str) {
        let version = version.to_string();
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/api/v1/version");
                then.status(200).body(version);
            })
            .await;
    }

    #[test]
    fn success_lines_match_cli_output() {
        assert_eq!(added_message("deploy"), "Private key 'deploy' added successfully");
        assert_eq!(REMOVED_MESSAGE, "Private key removed successfully");
    }

    #[test]
    fn detail_table_masks_key_material_by_default() {
        let table = private_key_detail_table(&sample_key(), &ViewOptions::default());
        assert!(table.is_masked());
        assert_eq!(
            table.rows()[0],
            vec!["key-1", "deploy", SENSITIVE_OVERLAY, SENSITIVE_OVERLAY]
        );
    }

    #[test]
    fn detail_table_escapes_newlines_when_shown() {
        let view = ViewOptions::from_flags(false, false, true);
        let table = private_key_detail_table(&sample_key(), &view);
        assert!(!table.is_masked());
        assert_eq!(
            table.rows()[0][3],
            "-----BEGIN KEY-----\\nabc\\n-----END KEY-----\\n"
        );
        assert_eq!(table.rows()[0][2], "ssh-ed25519 AAAA deploy");
    }

    #[test]
    fn list_table_has_no_sensitive_columns() {
        let table = private_key_list_table(&[sample_key()]);
        assert!(!table.is_masked());
        assert_eq!(table.render(), "Uuid   Name\nkey-1  deploy\n");
    }

    #[test]
    fn key_material_is_read_from_existing_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "-----BEGIN KEY-----\nfrom-file\n")?;
        let path = file.path().to_string_lossy().into_owned();

        assert_eq!(read_key_material(&path)?, "-----BEGIN KEY-----\nfrom-file\n");
        assert_eq!(read_key_material("inline-key")?, "inline-key");
        Ok(())
    }

    #[tokio::test]
    async fn list_fetches_security_keys() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/security/keys")
                    .header("authorization", BEARER);
                then.status(200)
                    .json_body(json!([{"uuid": "key-1", "name": "deploy"}]));
            })
            .await;

        let ctx = context_for(&server);
        handle_private_key_list(&ctx, ViewOptions::default())
            .await
            .expect("list succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_in_pretty_mode_rejects_invalid_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/security/keys/key-1");
                then.status(200).body("<html>");
            })
            .await;

        let ctx = context_for(&server);
        let view = ViewOptions {
            mode: RenderMode::Pretty,
            show_sensitive: false,
        };
        let err = handle_private_key_get(&ctx, UuidArgs { uuid: "key-1".into() }, view)
            .await
            .expect_err("invalid JSON");
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn add_posts_name_and_key() {
        let server = MockServer::start_async().await;
        mock_version(&server, "4.0.0-beta.400").await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/security/keys")
                    .header("authorization", BEARER)
                    .json_body(json!({"name": "deploy", "private_key": "inline-key"}));
                then.status(201).json_body(json!({"uuid": "key-9"}));
            })
            .await;

        let ctx = context_for(&server);
        handle_private_key_add(
            &ctx,
            PrivateKeyAddArgs {
                name: "deploy".into(),
                private_key: "inline-key".into(),
            },
        )
        .await
        .expect("add succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_is_refused_on_older_instances() {
        let server = MockServer::start_async().await;
        mock_version(&server, "4.0.0-beta.382").await;

        let ctx = context_for(&server);
        let err = handle_private_key_add(
            &ctx,
            PrivateKeyAddArgs {
                name: "deploy".into(),
                private_key: "inline-key".into(),
            },
        )
        .await
        .expect_err("gate rejects");
        assert!(
            matches!(err, CliError::Validation(message) if message.contains("requires Coolify 4.0.0-beta.383"))
        );
    }

    #[tokio::test]
    async fn remove_deletes_by_uuid() {
        let server = MockServer::start_async().await;
        mock_version(&server, "4.0.0-beta.383").await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/security/keys/key-1");
                then.status(200)
                    .json_body(json!({"message": "Private Key deleted."}));
            })
            .await;

        let ctx = context_for(&server);
        handle_private_key_remove(&ctx, UuidArgs { uuid: "key-1".into() })
            .await
            .expect("remove succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn remove_of_unknown_key_is_validation_error() {
        let server = MockServer::start_async().await;
        mock_version(&server, "4.0.0-beta.383").await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/security/keys/missing");
                then.status(404)
                    .json_body(json!({"message": "Private Key not found."}));
            })
            .await;

        let ctx = context_for(&server);
        let err = handle_private_key_remove(&ctx, UuidArgs { uuid: "missing".into() })
            .await
            .expect_err("not found");
        assert!(matches!(err, CliError::Validation(message) if message == "Private Key not found."));
    }
}
