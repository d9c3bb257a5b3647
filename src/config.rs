use clap::{Parser, Subcommand};

use crate::api::{ApiRequest, ApiVersion, Method};

#[derive(Debug, Clone, Parser)]
#[command(name = "user_patch_api")]
#[command(about = "Versioned users API with JSON Patch updates over an in-memory store")]
pub struct Cli {
    /// Tracing filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_filter: String,
    /// Capacity of the store actor's request channel.
    #[arg(long, default_value_t = 32)]
    pub buffer_size: usize,
    /// Version assumed when a request names none.
    #[arg(long, default_value_t = ApiVersion::V1)]
    pub default_version: ApiVersion,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replays the scripted PATCH exchanges against a fresh store.
    Demo,
    /// Sends one request against a fresh store and prints the response.
    Request(RequestCommand),
}

#[derive(Debug, Clone, clap::Args)]
pub struct RequestCommand {
    #[arg(long, default_value = "GET")]
    pub method: Method,
    #[arg(long)]
    pub path: String,
    /// `name=value`, repeatable.
    #[arg(long = "query", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,
    /// `name:value`, repeatable.
    #[arg(long = "header", value_parser = parse_header_pair)]
    pub headers: Vec<(String, String)>,
    #[arg(long)]
    pub body: Option<String>,
}

/// Settings the running system needs, split from the CLI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_filter: String,
    pub buffer_size: usize,
    pub default_version: ApiVersion,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            buffer_size: 32,
            default_version: ApiVersion::V1,
        }
    }
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            log_filter: self.log_filter.clone(),
            buffer_size: self.buffer_size.max(1),
            default_version: self.default_version,
        }
    }

    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Demo)
    }
}

impl RequestCommand {
    pub fn into_request(self) -> ApiRequest {
        let mut request = ApiRequest::new(self.method, self.path);
        request.query = self.query;
        request.headers = self.headers;
        request.body = self.body;
        request
    }
}

fn split_pair(raw: &str, separator: char) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(separator)
        .ok_or_else(|| format!("expected name{separator}value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, '=')
}

fn parse_header_pair(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, ':')
}
