//! `tk api`: send one raw request through the ticket API.
//!
//! Useful for exercising the exact request/response contract without a
//! network server: the response status and JSON body are printed as-is.

use crate::output::{CliError, OutputMode, render, render_error};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;
use tickets_core::api::{ApiRequest, Method};

#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Request method: GET, POST, or PUT.
    pub method: Method,

    /// Request path, e.g. `/api/Tickets/read`.
    pub path: String,

    /// Query parameter as `key=value` (repeatable).
    #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,

    /// JSON request body.
    #[arg(short, long)]
    pub body: Option<String>,
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

impl ApiArgs {
    fn request(&self) -> ApiRequest {
        let mut request = ApiRequest::new(self.method, &self.path);
        for (key, value) in &self.query {
            request = request.with_query(key, value);
        }
        if let Some(body) = &self.body {
            request = request.with_body(body);
        }
        request
    }
}

/// Execute `tk api`.
///
/// # Errors
///
/// Returns an error when the response status is not 2xx, after printing it.
pub fn run_api(args: &ApiArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let api = super::open_api(project_root, output)?;
    let response = api.handle(&args.request());

    render(output, &response, |r, w| {
        writeln!(w, "{}", r.status)?;
        writeln!(w, "{:#}", r.body)
    })?;

    if response.is_success() {
        return Ok(());
    }
    let msg = format!("request failed with status {}", response.status);
    render_error(output, &CliError::new(&msg))?;
    anyhow::bail!(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ApiArgs,
    }

    #[test]
    fn builds_request_from_flags() {
        let w = Wrapper::parse_from([
            "test",
            "put",
            "/api/Tickets/update-status",
            "-q",
            "id=t-1",
            "--query",
            "status=2",
        ]);
        let request = w.args.request();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.query.get("id").map(String::as_str), Some("t-1"));
        assert_eq!(request.query.get("status").map(String::as_str), Some("2"));
        assert!(request.body.is_none());
    }

    #[test]
    fn query_value_may_contain_equals() {
        assert_eq!(
            parse_query_pair("content=a=b"),
            Ok(("content".to_string(), "a=b".to_string()))
        );
        assert!(parse_query_pair("novalue").is_err());
    }

    #[test]
    fn unsupported_method_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "DELETE", "/api/Tickets/read"]).is_err());
    }
}
