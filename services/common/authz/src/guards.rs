use axum::http::{HeaderMap, Method};

use crate::error::{AuthzError, AuthzResult};
use crate::policy::RoutePolicy;
use crate::roles::{RoleUniverse, ROLE_HEADER};

/// Role claim asserted by the caller. Missing, empty and non UTF-8 values all read as `None`;
/// any valid UTF-8 value, including non-ASCII, is returned as sent.
pub fn role_claim(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ROLE_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .filter(|value| !value.is_empty())
}

/// Decides whether `claim` may reach a route guarded by `policy`.
///
/// `resource` and `method` only feed the `RoleNotPermitted` diagnostic.
pub fn authorize(
    claim: Option<&str>,
    policy: &RoutePolicy,
    universe: &RoleUniverse,
    resource: &str,
    method: &Method,
) -> AuthzResult<()> {
    let role = match claim {
        Some(role) if !role.is_empty() => role,
        _ => return Err(AuthzError::NoRoleAsserted),
    };

    match policy {
        RoutePolicy::Open => {
            if universe.contains(role) {
                Ok(())
            } else {
                Err(AuthzError::UnknownRole {
                    role: role.to_owned(),
                })
            }
        }
        RoutePolicy::Allowed(allowed) => {
            if allowed.contains(role) {
                Ok(())
            } else {
                Err(AuthzError::RoleNotPermitted {
                    role: role.to_owned(),
                    resource: resource.to_owned(),
                    method: method.as_str().to_owned(),
                })
            }
        }
    }
}
