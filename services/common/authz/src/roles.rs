use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::PolicyError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TREASURY: &str = "treasury";
pub const ROLE_LAWYER: &str = "lawyer";
pub const ROLE_SECRETARY: &str = "secretary";

pub const ROLE_LIST: &[&str] = &[ROLE_ADMIN, ROLE_TREASURY, ROLE_LAWYER, ROLE_SECRETARY];

/// Header carrying the caller's role claim.
pub const ROLE_HEADER: &str = "Role";

static DEFAULT_UNIVERSE: Lazy<Arc<RoleUniverse>> =
    Lazy::new(|| Arc::new(RoleUniverse::from_known(ROLE_LIST)));

/// Opaque role label. Compared by exact, case-sensitive equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role(String);

impl Role {
    pub fn new(value: impl Into<String>) -> Result<Self, PolicyError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PolicyError::EmptyRole);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Role {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::new(s)
    }
}

/// The complete, ordered set of roles the process recognizes.
///
/// Built once at startup and shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RoleUniverse {
    ordered: Vec<Role>,
    index: HashSet<Role>,
}

impl RoleUniverse {
    /// Builds a universe, keeping first-seen order and dropping duplicates.
    pub fn new<I, R>(roles: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut index = HashSet::new();
        for raw in roles {
            let role = Role::new(raw)?;
            if index.insert(role.clone()) {
                ordered.push(role);
            }
        }
        if ordered.is_empty() {
            return Err(PolicyError::EmptyUniverse);
        }
        Ok(Self { ordered, index })
    }

    /// Process-wide default: admin, treasury, lawyer, secretary.
    pub fn standard() -> Arc<RoleUniverse> {
        DEFAULT_UNIVERSE.clone()
    }

    fn from_known(roles: &[&str]) -> Self {
        let ordered: Vec<Role> = roles.iter().map(|role| Role(role.to_string())).collect();
        let index = ordered.iter().cloned().collect();
        Self { ordered, index }
    }

    pub fn contains(&self, role: &str) -> bool {
        self.index.contains(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl FromStr for RoleUniverse {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleUniverse::new(split_role_list(s))
    }
}

impl fmt::Display for RoleUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.ordered.iter().map(Role::as_str).collect();
        f.write_str(&names.join(","))
    }
}

pub(crate) fn split_role_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim)
}
