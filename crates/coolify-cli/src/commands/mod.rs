//! Command handlers grouped by resource.

pub(crate) mod instances;
pub(crate) mod private_keys;
pub(crate) mod projects;
pub(crate) mod servers;
pub(crate) mod version;

use reqwest::Url;
use serde::de::DeserializeOwned;

use coolify_api_models::MessageResponse;

use crate::client::{AppContext, CliResult, decode, decode_ack};
use crate::output::{Table, ViewOptions, render_raw};

/// GET `url` and print it raw, pretty, or as the table built by `build`.
pub(crate) async fn fetch_and_render<T, F>(
    ctx: &AppContext,
    url: Url,
    view: ViewOptions,
    what: &str,
    build: F,
) -> CliResult<()>
where
    T: DeserializeOwned,
    F: FnOnce(&T, &ViewOptions) -> Table,
{
    let body = ctx.fetch(url).await?;
    if render_raw(&body, view.mode)? {
        return Ok(());
    }
    let decoded: T = decode(&body, what)?;
    build(&decoded, &view).print();
    Ok(())
}

/// Message carried by an acknowledgement body, or `fallback` when absent.
pub(crate) fn ack_message(body: &str, fallback: &str) -> String {
    let ack: MessageResponse = decode_ack(body);
    let message = ack.message.trim();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_message_prefers_server_text() {
        assert_eq!(
            ack_message(r#"{"message":"Project deleted."}"#, "fallback"),
            "Project deleted."
        );
        assert_eq!(ack_message(r#"{"message":null}"#, "fallback"), "fallback");
        assert_eq!(ack_message("", "fallback"), "fallback");
    }
}
