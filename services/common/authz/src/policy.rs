use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyError;
use crate::roles::{split_role_list, Role, RoleUniverse};

/// Textual marker for a policy open to every role of the universe.
pub const OPEN_POLICY_MARKER: &str = "all";

/// Access rule bound to one route+method pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Any role drawn from the role universe.
    Open,
    /// Only the listed roles.
    Allowed(BTreeSet<Role>),
}

impl RoutePolicy {
    pub fn open() -> Self {
        RoutePolicy::Open
    }

    /// Explicit policy. The list must name at least one role.
    pub fn allow<I, R>(roles: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let roles = roles
            .into_iter()
            .map(Role::new)
            .collect::<Result<BTreeSet<_>, _>>()?;
        if roles.is_empty() {
            return Err(PolicyError::EmptyPolicy);
        }
        Ok(RoutePolicy::Allowed(roles))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, RoutePolicy::Open)
    }

    /// Listed roles the universe does not know. Always empty for open policies.
    pub fn unknown_roles<'a>(&'a self, universe: &RoleUniverse) -> Vec<&'a Role> {
        match self {
            RoutePolicy::Open => Vec::new(),
            RoutePolicy::Allowed(roles) => roles
                .iter()
                .filter(|role| !universe.contains(role.as_str()))
                .collect(),
        }
    }
}

impl FromStr for RoutePolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == OPEN_POLICY_MARKER {
            return Ok(RoutePolicy::Open);
        }
        RoutePolicy::allow(split_role_list(s))
    }
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePolicy::Open => f.write_str(OPEN_POLICY_MARKER),
            RoutePolicy::Allowed(roles) => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}
