mod helpers;
mod middleware;
mod session;
mod token;

pub use helpers::{TokenValidationError, ValidatedToken, extract_token_from_header, validate_token};
pub use middleware::{AuthError, RequireAdmin, RequireUser};
pub use session::Session;
pub use token::{GeneratedToken, TokenGenerator, parse_token};
