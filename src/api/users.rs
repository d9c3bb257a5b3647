use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::UserClient;
use crate::domain::User;
use crate::user_actor::{UserError, UserPatch, UserReplacement};
use crate::validation::validate;

use super::error::ApiError;
use super::payload::{decode_patch_payload, decode_user};
use super::request::{ApiRequest, ApiResponse, Method};
use super::version::{resolve_version, ApiVersion, VersionPolicy};

/// Where a request path points: `/api/users[/{id}]` or `/api/v{n}/users[/{id}]`.
#[derive(Debug, PartialEq)]
struct Route<'a> {
    version: Option<&'a str>,
    id: Option<&'a str>,
}

fn is(segment: &str, expected: &str) -> bool {
    segment.eq_ignore_ascii_case(expected)
}

fn parse_route(path: &str) -> Option<Route<'_>> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let (version, rest) = match segments.as_slice() {
        [api, users, rest @ ..] if is(api, "api") && is(users, "users") => (None, rest),
        [api, version, users, rest @ ..] if is(api, "api") && is(users, "users") => {
            let number = version.strip_prefix(|c: char| c == 'v' || c == 'V')?;
            (Some(number), rest)
        }
        _ => return None,
    };

    match rest {
        [] => Some(Route { version, id: None }),
        [id] => Some(Route { version, id: Some(*id) }),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("The value '{raw}' is not valid.")))
}

/// The users resource: one handler for every API version, parameterized by
/// the resolved [`VersionPolicy`].
#[derive(Clone)]
pub struct UsersApi {
    client: UserClient,
    default_version: ApiVersion,
}

impl UsersApi {
    pub fn new(client: UserClient, default_version: ApiVersion) -> Self {
        Self { client, default_version }
    }

    /// Serves one request. Failures are turned into error responses here;
    /// every response carries the version report headers.
    #[instrument(name = "users_api", skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        let response = match self.dispatch(&request).await {
            Ok(response) => {
                info!(status = response.status, "Request handled");
                response
            }
            Err(e @ ApiError::Unexpected(_)) => {
                error!(error = ?e, "Request failed");
                e.into_response()
            }
            Err(e) => {
                warn!(status = e.status(), error = %e, "Request rejected");
                e.into_response()
            }
        };
        response
            .with_header("api-supported-versions", ApiVersion::supported_header())
            .with_header("api-deprecated-versions", ApiVersion::deprecated_header())
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let route = parse_route(&request.path)
            .ok_or_else(|| ApiError::RouteNotFound(request.path.clone()))?;
        let version = resolve_version(request, route.version, self.default_version)?;
        let policy = version.policy();
        debug!(%version, "API version resolved");

        match (request.method, route.id) {
            (Method::Get, None) => self.list(policy).await,
            (Method::Post, None) => self.create(policy, request).await,
            (Method::Get, Some(id)) => self.get(policy, parse_id(id)?).await,
            (Method::Put, Some(id)) => self.replace(policy, parse_id(id)?, request).await,
            (Method::Patch, Some(id)) => self.patch(policy, parse_id(id)?, request).await,
            (Method::Delete, Some(id)) if policy.allows_delete => self.delete(parse_id(id)?).await,
            (method, _) => Err(ApiError::MethodNotAllowed(method, request.path.clone())),
        }
    }

    async fn list(&self, policy: &VersionPolicy) -> Result<ApiResponse, ApiError> {
        let users = self.client.list_users().await?;
        let body = users.iter().map(|user| policy.fields.to_json(user)).collect();
        Ok(ApiResponse::ok(Value::Array(body)))
    }

    async fn get(&self, policy: &VersionPolicy, id: i32) -> Result<ApiResponse, ApiError> {
        if id == 0 {
            return Err(ApiError::BadRequest("Id 0 is never assigned.".into()));
        }
        let user = self
            .client
            .get_user(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        Ok(ApiResponse::ok(policy.fields.to_json(&user)))
    }

    async fn create(&self, policy: &VersionPolicy, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let body = decode_user(request.body.as_deref())?;
        let mut user = User::default();
        policy.fields.copy_writable(&mut user, &body);

        let report = validate(&user, policy.rules);
        if !report.is_valid() {
            return Err(ApiError::Validation(report));
        }

        let id = self.client.create_user(user.clone().into()).await?;
        let location = format!("/api/v{}/users/{id}", policy.version.major());
        Ok(ApiResponse::created(policy.fields.to_json(&user.with_id(id))).with_header("location", location))
    }

    async fn replace(&self, policy: &VersionPolicy, id: i32, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let user = decode_user(request.body.as_deref())?;
        if user.id != id {
            return Err(UserError::IdMismatch { route: id, body: user.id }.into());
        }

        let report = validate(&user, policy.rules);
        if !report.is_valid() {
            return Err(ApiError::Validation(report));
        }

        let replacement = UserReplacement { user, fields: policy.fields };
        let stored = self.client.replace_user(id, replacement).await?;
        Ok(ApiResponse::ok(policy.fields.to_json(&stored)))
    }

    async fn patch(&self, policy: &VersionPolicy, id: i32, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let payload = decode_patch_payload(request.body.as_deref(), policy.patch_body)?;
        debug!(
            client_id = ?payload.client_id,
            application_id = ?request.header("x-application-id"),
            username = ?request.header("x-username"),
            operations = payload.document.len(),
            "Patch received"
        );

        let patch = UserPatch {
            document: payload.document,
            fields: policy.fields,
            rules: policy.rules,
        };
        self.client.patch_user(id, patch).await?;
        Ok(ApiResponse::no_content())
    }

    async fn delete(&self, id: i32) -> Result<ApiResponse, ApiError> {
        self.client.delete_user(id).await?;
        Ok(ApiResponse::no_content())
    }
}
