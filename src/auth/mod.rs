//! Authentication and authorization module

pub mod gate;
pub mod password;
pub mod role;
pub mod token;

pub use gate::{authorize, enforce_roles, extract_token, AuthContext, RoleGate};
pub use password::PasswordHasher;
pub use role::Role;
pub use token::{Claims, TokenError, TokenPair, TokenPurpose, TokenService, VerifiedToken};
