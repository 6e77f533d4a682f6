// Role-based access control endpoints

pub mod models;
pub mod permissions;
pub mod roles;

pub use models::*;
pub use permissions::PermissionService;
pub use roles::RoleService;
