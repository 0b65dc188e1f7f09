pub mod auth_service;
pub mod auth_service_impl;

pub use auth_service::{AuthError, AuthService, AuthenticatedUser, LoginResult};
pub use auth_service_impl::{Claims, JwtAuthService};
