use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::auth::access_jwt::VerifiedAccessToken;

/// Scope that grants access to the whole admin API.
pub const SCOPE_ALL: &str = "all";

/// Claims lifted into `UserInfo` fields rather than `additional_claims`.
const PROFILE_CLAIMS: [&str; 5] = ["sub", "name", "preferred_username", "email", "picture"];

/// Registered JWT claims that never describe the user.
const TOKEN_CLAIMS: [&str; 9] = [
    "iss",
    "aud",
    "client_id",
    "scp",
    "scope",
    "iat",
    "exp",
    "nbf",
    "jti",
];

/// The caller's profile as published by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preferred_username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
    /// Provider-specific claims (groups, entitlements, ...).
    #[serde(default)]
    pub additional_claims: Map<String, Value>,
}

impl UserInfo {
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            claims
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let additional_claims = claims
            .iter()
            .filter(|(k, _)| {
                !PROFILE_CLAIMS.contains(&k.as_str()) && !TOKEN_CLAIMS.contains(&k.as_str())
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            subject: text("sub"),
            name: text("name"),
            preferred_username: text("preferred_username"),
            email: text("email"),
            picture: text("picture"),
            additional_claims,
        }
    }
}

/// Who is calling, for the lifetime of one request.
///
/// Values are never mutated once built; `with_execution_user_identifier`
/// returns a derived copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityContext {
    audience: String,
    user_id: String,
    app_id: String,
    execution_identity: String,
    scopes: HashSet<String>,
    user_info: Option<UserInfo>,
    claims: Option<Map<String, Value>>,
}

impl IdentityContext {
    pub fn new<S>(
        audience: impl Into<String>,
        user_id: impl Into<String>,
        app_id: impl Into<String>,
        scopes: impl IntoIterator<Item = S>,
        user_info: Option<UserInfo>,
        claims: Option<Map<String, Value>>,
    ) -> Self
    where
        S: Into<String>,
    {
        Self {
            audience: audience.into(),
            user_id: user_id.into(),
            app_id: app_id.into(),
            execution_identity: String::new(),
            scopes: scopes.into_iter().map(Into::into).collect(),
            user_info,
            claims,
        }
    }

    /// Build the identity for a verified access token: `sub` is the user,
    /// `client_id` the app, and the full claim set is kept for entitlement lookups.
    pub fn from_token(token: VerifiedAccessToken) -> Self {
        let audience = token.audience().unwrap_or_default().to_string();
        let user_info = UserInfo::from_claims(&token.raw_claims);
        let scopes = token.scopes();

        Self::new(
            audience,
            token.claims.sub,
            token.claims.client_id,
            scopes,
            Some(user_info),
            Some(token.raw_claims),
        )
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn execution_identity(&self) -> &str {
        &self.execution_identity
    }

    pub fn scopes(&self) -> &HashSet<String> {
        &self.scopes
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn user_info(&self) -> Option<&UserInfo> {
        self.user_info.as_ref()
    }

    /// Top-level token claims; `None` when the identity was not built from a token.
    pub fn claims(&self) -> Option<&Map<String, Value>> {
        self.claims.as_ref()
    }

    /// Neither a user nor an app: the request is unauthenticated.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_empty() && self.app_id.is_empty()
    }

    pub fn with_execution_user_identifier(&self, execution_identity: impl Into<String>) -> Self {
        Self {
            execution_identity: execution_identity.into(),
            ..self.clone()
        }
    }
}
