//! Output renderers: raw JSON passthrough, tab-indented JSON, and aligned tables.

use std::borrow::Cow;

use anyhow::anyhow;
use serde::Serialize;
use serde::de::IgnoredAny;

use crate::client::{CliError, CliResult};

/// Placeholder printed instead of sensitive values.
pub(crate) const SENSITIVE_OVERLAY: &str = "********";

const SENSITIVE_NOTE: &str = "Note: Use -s to show sensitive information.";

/// Spaces inserted after the widest cell of each column.
const COLUMN_PADDING: usize = 2;

/// How a command presents its response.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum RenderMode {
    #[default]
    Table,
    /// Response body exactly as received.
    Json,
    /// Response body re-indented with tabs.
    Pretty,
}

/// Presentation flags shared by every command.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct ViewOptions {
    pub(crate) mode: RenderMode,
    pub(crate) show_sensitive: bool,
}

impl ViewOptions {
    pub(crate) const fn from_flags(json: bool, pretty: bool, show_sensitive: bool) -> Self {
        let mode = if pretty {
            RenderMode::Pretty
        } else if json {
            RenderMode::Json
        } else {
            RenderMode::Table
        };
        Self {
            mode,
            show_sensitive,
        }
    }

    /// Return `value`, or the overlay when sensitive output is disabled.
    pub(crate) fn sensitive<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.show_sensitive {
            Cow::Borrowed(value)
        } else {
            Cow::Borrowed(SENSITIVE_OVERLAY)
        }
    }
}

/// Print `body` according to a raw mode.
///
/// Returns `false` in table mode so the caller decodes and renders instead.
pub(crate) fn render_raw(body: &str, mode: RenderMode) -> CliResult<bool> {
    match format_raw(body, mode)? {
        Some(text) => {
            println!("{text}");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Text printed for a raw mode, or `None` in table mode.
pub(crate) fn format_raw(body: &str, mode: RenderMode) -> CliResult<Option<String>> {
    match mode {
        RenderMode::Table => Ok(None),
        RenderMode::Json => Ok(Some(body.to_string())),
        RenderMode::Pretty => pretty_json(body).map(Some),
    }
}

/// Serialise `value` and print it according to a raw mode.
pub(crate) fn render_value<T: Serialize>(value: &T, mode: RenderMode) -> CliResult<bool> {
    if mode == RenderMode::Table {
        return Ok(false);
    }
    let body = serde_json::to_string(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    render_raw(&body, mode)
}

/// Re-indent a JSON document with one tab per level.
///
/// Works on tokens: only insignificant whitespace changes, so keys, strings
/// and number literals come out exactly as received.
pub(crate) fn pretty_json(body: &str) -> CliResult<String> {
    serde_json::from_str::<IgnoredAny>(body)
        .map_err(|err| CliError::failure(anyhow!("response is not valid JSON: {err}")))?;

    let mut out = String::with_capacity(body.len() * 2);
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = body.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            ' ' | '\t' | '\n' | '\r' => {}
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' | '[' => {
                out.push(ch);
                while chars.next_if(char::is_ascii_whitespace).is_some() {}
                match chars.next_if(|next| matches!(*next, '}' | ']')) {
                    Some(close) => out.push(close),
                    None => {
                        depth += 1;
                        push_indent(&mut out, depth);
                    }
                }
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                push_indent(&mut out, depth);
                out.push(ch);
            }
            ',' => {
                out.push(ch);
                push_indent(&mut out, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

fn push_indent(out: &mut String, depth: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n('\t', depth));
}

/// Column-aligned table.
///
/// Every cell but the last in a row is padded to its column width plus
/// [`COLUMN_PADDING`]; the last cell is written as-is.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    masked: bool,
}

impl Table {
    pub(crate) fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|cell| (*cell).to_string()).collect(),
            rows: Vec::new(),
            masked: false,
        }
    }

    pub(crate) fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Record that sensitive cells were hidden, which appends a hint line.
    pub(crate) const fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    #[cfg(test)]
    pub(crate) const fn is_masked(&self) -> bool {
        self.masked
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub(crate) fn render(&self) -> String {
        let lines = std::iter::once(&self.header).chain(&self.rows);

        let mut widths: Vec<usize> = Vec::new();
        for line in lines.clone() {
            let aligned = line.len().saturating_sub(1);
            if widths.len() < aligned {
                widths.resize(aligned, 0);
            }
            for (width, cell) in widths.iter_mut().zip(&line[..aligned]) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for line in lines {
            for (index, cell) in line.iter().enumerate() {
                out.push_str(cell);
                if index + 1 < line.len() {
                    let pad = widths[index] - cell.chars().count() + COLUMN_PADDING;
                    out.extend(std::iter::repeat_n(' ', pad));
                }
            }
            out.push('\n');
        }

        if self.masked {
            out.push('\n');
            out.push_str(SENSITIVE_NOTE);
            out.push('\n');
        }
        out
    }

    pub(crate) fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_all_but_last_column() {
        let mut table = Table::new(&["Uuid", "Name", "Status"]);
        table.push_row(["a1", "web", "running"]);
        table.push_row(["b2-long", "db", "exited"]);

        assert_eq!(
            table.render(),
            "Uuid     Name  Status\n\
             a1       web   running\n\
             b2-long  db    exited\n"
        );
    }

    #[test]
    fn masked_table_appends_hint() {
        let mut table = Table::new(&["Uuid", "Secret"]);
        table.push_row(["x", SENSITIVE_OVERLAY]);
        table.set_masked(true);

        assert_eq!(
            table.render(),
            "Uuid  Secret\nx     ********\n\nNote: Use -s to show sensitive information.\n"
        );
    }

    #[test]
    fn header_only_table_renders_single_line() {
        assert_eq!(Table::new(&["Uuid", "Name"]).render(), "Uuid  Name\n");
    }

    #[test]
    fn pretty_json_uses_tabs_and_keeps_key_order() {
        let pretty = pretty_json(r#"{"zeta":1,"alpha":{"inner":[true]}}"#).expect("pretty");
        assert_eq!(
            pretty,
            "{\n\t\"zeta\": 1,\n\t\"alpha\": {\n\t\t\"inner\": [\n\t\t\ttrue\n\t\t]\n\t}\n}"
        );
        assert!(pretty_json("not json").is_err());
    }

    #[test]
    fn pretty_json_keeps_literals_verbatim() {
        let pretty = pretty_json(
            r#" {"a":1e2,"b":"<x> [\"q\", {}]","c":123456789012345678901234,"d":1.50,"e":{},"f":[ ]} "#,
        )
        .expect("pretty");
        assert_eq!(
            pretty,
            "{\n\t\"a\": 1e2,\n\t\"b\": \"<x> [\\\"q\\\", {}]\",\n\t\"c\": 123456789012345678901234,\n\t\"d\": 1.50,\n\t\"e\": {},\n\t\"f\": []\n}"
        );
    }

    #[test]
    fn json_mode_passes_body_through() {
        let body = r#"{"uuid":"pj-1", "n":1.50}"#;
        assert_eq!(
            format_raw(body, RenderMode::Json).expect("json mode"),
            Some(body.to_string())
        );
        assert_eq!(format_raw(body, RenderMode::Table).expect("table mode"), None);
    }

    #[test]
    fn view_flags_select_mode_and_masking() {
        assert_eq!(
            ViewOptions::from_flags(false, false, false).mode,
            RenderMode::Table
        );
        assert_eq!(
            ViewOptions::from_flags(true, false, false).mode,
            RenderMode::Json
        );
        assert_eq!(
            ViewOptions::from_flags(false, true, false).mode,
            RenderMode::Pretty
        );

        let hidden = ViewOptions::from_flags(false, false, false);
        assert_eq!(hidden.sensitive("10.0.0.1"), SENSITIVE_OVERLAY);
        let shown = ViewOptions::from_flags(false, false, true);
        assert_eq!(shown.sensitive("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn table_mode_defers_to_caller() {
        assert!(!render_raw("{}", RenderMode::Table).expect("table mode"));
        assert!(!render_value(&[1, 2], RenderMode::Table).expect("table mode"));
        assert!(render_raw("{}", RenderMode::Json).expect("json mode"));
    }
}
