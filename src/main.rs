mod actor_framework;
mod api;
mod app_system;
mod clients;
mod config;
mod domain;
mod patch;
mod user_actor;
mod validation;

#[cfg(test)]
mod mock_framework;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, info_span, Instrument};

use crate::api::{ApiRequest, ApiResponse, Method, UsersApi};
use crate::app_system::{setup_tracing, UserSystem};
use crate::config::{Cli, Command};

/// Sends one request and logs both sides of the exchange.
async fn send(api: &UsersApi, request: ApiRequest) -> ApiResponse {
    info!(
        method = %request.method,
        path = %request.path,
        query = ?request.query,
        headers = ?request.headers,
        body = request.body.as_deref().unwrap_or(""),
        "Request"
    );
    let response = api.handle(request).await;
    info!(
        status = response.status,
        headers = ?response.headers,
        body = %response.body.as_ref().map(|b| b.to_string()).unwrap_or_default(),
        "Response"
    );
    response
}

/// The scripted exchanges of the console client.
fn demo_requests() -> Vec<(&'static str, ApiRequest)> {
    let patch = |path: &str| {
        ApiRequest::new(Method::Patch, path)
            .with_header("Content-Type", "application/json-patch+json")
            .with_header("x-application-id", "my-test-app")
    };

    vec![
        (
            "replace email",
            patch("/api/users/1")
                .with_json(&json!([{ "op": "replace", "path": "/Email", "value": "test789@email.com" }])),
        ),
        ("read back", ApiRequest::new(Method::Get, "/api/users/1")),
        (
            "v2 envelope",
            patch("/api/v2/users/2").with_header("x-username", "console").with_json(&json!({
                "clientId": "console",
                "jsonPatchDocument": [{ "op": "replace", "path": "/Phone", "value": "469-000-0000" }],
            })),
        ),
        (
            "clear every contact",
            patch("/api/users/2").with_header("api-version", "2.0").with_json(&json!({
                "clientId": "console",
                "jsonPatchDocument": [
                    { "op": "replace", "path": "/Email", "value": "" },
                    { "op": "remove", "path": "/Phone" },
                ],
            })),
        ),
        (
            "unknown field",
            patch("/api/users/1")
                .with_json(&json!([{ "op": "replace", "path": "/Nonexistent", "value": "x" }])),
        ),
        ("null body", patch("/api/users/1").with_body("null")),
        ("v1 delete", ApiRequest::new(Method::Delete, "/api/users/2")),
        ("v2 delete", ApiRequest::new(Method::Delete, "/api/v2/users/2")),
        ("list", ApiRequest::new(Method::Get, "/api/v2/users")),
    ]
}

async fn run_demo(api: &UsersApi) {
    for (name, request) in demo_requests() {
        let response = send(api, request).instrument(info_span!("exchange", name)).await;
        if response.status == 204 {
            info!(exchange = name, "SUCCESSFUL");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = cli.app_config();

    // Setup tracing once for the entire application
    setup_tracing(&config.log_filter);

    info!(?config, "Starting users API");
    let system = UserSystem::new(&config);

    match cli.command_or_default() {
        Command::Demo => run_demo(&system.api).await,
        Command::Request(command) => {
            let response = send(&system.api, command.into_request()).await;
            if !response.is_success() {
                error!(status = response.status, "Request did not succeed");
            }
        }
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
