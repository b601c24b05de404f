use serde_json::Value;

use crate::error::AuthzError;
use crate::services::auth::identity_context::IdentityContext;

/// The shapes an entitlement claim can take once decoded from JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementClaim {
    /// No claim, or an explicit `null`.
    Absent,
    /// A single group name or a flat list of them.
    Strings(Vec<String>),
    /// Numbers, booleans, objects, or lists holding anything but strings.
    Unsupported,
}

impl EntitlementClaim {
    pub fn decode(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(s)) => Self::Strings(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map_or(Self::Unsupported, Self::Strings),
            Some(_) => Self::Unsupported,
        }
    }

    pub fn into_entitlements(self, claim_key: &str) -> Result<Vec<String>, AuthzError> {
        match self {
            Self::Absent => Ok(Vec::new()),
            Self::Strings(entitlements) => Ok(entitlements),
            Self::Unsupported => Err(AuthzError::ClaimConversion(claim_key.to_string())),
        }
    }
}

/// The identity's entitlements, in claim order.
///
/// A top-level token claim wins over the same claim in the user info. An
/// absent claim means no entitlements; any other shape than a string or a
/// list of strings is an error.
pub fn resolve_entitlements(
    identity: &IdentityContext,
    claim_key: &str,
) -> Result<Vec<String>, AuthzError> {
    let top_level = identity
        .claims()
        .and_then(|claims| claims.get(claim_key))
        .filter(|v| !v.is_null());

    let value = top_level.or_else(|| {
        identity
            .user_info()
            .and_then(|info| info.additional_claims.get(claim_key))
    });

    EntitlementClaim::decode(value).into_entitlements(claim_key)
}
