use std::fmt;
use std::str::FromStr;

use crate::domain::User;
use crate::patch::FieldTable;
use crate::user_actor::{USER_FIELDS_V1, USER_FIELDS_V2, USER_RULES_V1, USER_RULES_V2};
use crate::validation::RuleSet;

use super::error::ApiError;
use super::request::ApiRequest;

/// Name of the query parameter, header and media-type parameter carrying the version.
pub const VERSION_PARAMETER: &str = "api-version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub const SUPPORTED: [ApiVersion; 2] = [ApiVersion::V1, ApiVersion::V2];

    /// Accepts `2`, `2.0`, `v2` and `V2.0` alike.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let number = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        match number {
            "1" | "1.0" => Some(ApiVersion::V1),
            "2" | "2.0" => Some(ApiVersion::V2),
            _ => None,
        }
    }

    pub fn major(self) -> u8 {
        match self {
            ApiVersion::V1 => 1,
            ApiVersion::V2 => 2,
        }
    }

    pub fn policy(self) -> &'static VersionPolicy {
        match self {
            ApiVersion::V1 => &V1_POLICY,
            ApiVersion::V2 => &V2_POLICY,
        }
    }

    /// Value of the `api-supported-versions` response header.
    pub fn supported_header() -> String {
        Self::join(Self::SUPPORTED.iter().copied())
    }

    /// Value of the `api-deprecated-versions` response header.
    pub fn deprecated_header() -> String {
        Self::join(Self::SUPPORTED.iter().copied().filter(|v| v.policy().deprecated))
    }

    fn join(versions: impl Iterator<Item = ApiVersion>) -> String {
        versions.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("1.0"),
            ApiVersion::V2 => f.write_str("2.0"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(s).ok_or_else(|| format!("unsupported API version: {s}"))
    }
}

/// How a PATCH body is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchBodyShape {
    /// A bare RFC 6902 array.
    Document,
    /// `{ "clientId": ..., "jsonPatchDocument": [...] }`.
    Envelope,
}

/// Everything that differs between API versions.
#[derive(Debug)]
pub struct VersionPolicy {
    pub version: ApiVersion,
    pub fields: &'static FieldTable<User>,
    pub rules: &'static RuleSet<User>,
    pub patch_body: PatchBodyShape,
    pub allows_delete: bool,
    pub deprecated: bool,
}

static V1_POLICY: VersionPolicy = VersionPolicy {
    version: ApiVersion::V1,
    fields: &USER_FIELDS_V1,
    rules: &USER_RULES_V1,
    patch_body: PatchBodyShape::Document,
    allows_delete: false,
    deprecated: true,
};

static V2_POLICY: VersionPolicy = VersionPolicy {
    version: ApiVersion::V2,
    fields: &USER_FIELDS_V2,
    rules: &USER_RULES_V2,
    patch_body: PatchBodyShape::Envelope,
    allows_delete: true,
    deprecated: false,
};

/// Reads `api-version` from a `;`-separated media type list.
fn media_type_version(value: &str) -> Option<&str> {
    value
        .split(',')
        .flat_map(|media_type| media_type.split(';').skip(1))
        .filter_map(|parameter| parameter.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(VERSION_PARAMETER))
        .map(|(_, version)| version.trim().trim_matches('"'))
}

/// Picks the API version of `request`.
///
/// Sources, all optional: the URL segment, the query string, the
/// `api-version` header and the media-type parameter of `Accept` or
/// `Content-Type`. With none present `default` applies. Sources naming
/// different versions are rejected as ambiguous.
pub fn resolve_version(
    request: &ApiRequest,
    url_segment: Option<&str>,
    default: ApiVersion,
) -> Result<ApiVersion, ApiError> {
    let requested: Vec<&str> = [
        url_segment,
        request.query_param(VERSION_PARAMETER),
        request.header(VERSION_PARAMETER),
        request.header("accept").and_then(media_type_version),
        request.header("content-type").and_then(media_type_version),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut distinct: Vec<Result<ApiVersion, &str>> = Vec::new();
    for raw in &requested {
        let candidate = ApiVersion::parse(raw).ok_or(*raw);
        if !distinct.contains(&candidate) {
            distinct.push(candidate);
        }
    }

    match distinct.as_slice() {
        [] => Ok(default),
        [Ok(version)] => Ok(*version),
        [Err(raw)] => Err(ApiError::UnsupportedApiVersion {
            path: request.path.clone(),
            version: raw.to_string(),
        }),
        _ => Err(ApiError::AmbiguousApiVersion(requested.join(", "))),
    }
}
