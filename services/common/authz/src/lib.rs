pub mod error;
pub mod guards;
pub mod middleware;
pub mod policy;
pub mod roles;

pub use error::{AuthzError, AuthzResult, PolicyError};
pub use guards::{authorize, role_claim};
pub use middleware::{annotate_policy, authorize_roles, AnnotatedPolicy, ProtectExt};
pub use policy::{RoutePolicy, OPEN_POLICY_MARKER};
pub use roles::{
    Role, RoleUniverse, ROLE_ADMIN, ROLE_HEADER, ROLE_LAWYER, ROLE_LIST, ROLE_SECRETARY,
    ROLE_TREASURY,
};
