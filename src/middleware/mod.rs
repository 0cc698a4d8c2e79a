pub mod auth;
pub mod response;

pub use auth::{admin_middleware, authenticate, jwt_auth_middleware};
pub use response::{ApiResponse, ApiResult};
