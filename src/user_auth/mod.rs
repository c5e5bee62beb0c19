//! Users and identity
//!
//! Registration, password login issuing an HS256 JWT, and the middleware
//! that turns a bearer token into `Claims` for the handlers. The token
//! subject is the username, which is also the account owner.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod service;
pub mod store;

pub use error::AuthError;
pub use middleware::jwt_auth_middleware;
pub use service::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserAuthService};
pub use store::{MemoryUserStore, NewUser, PgUserStore, User, UserResponse, UserStore};
