//! Authentication infrastructure module
//!
//! JWT access/refresh tokens, single-use account tokens, the session manager
//! and the role/ownership checks used by the use cases.

mod guard;
mod jwt;
mod one_time;
mod session;

pub use guard::{require_admin, require_owner};
pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtService, TokenCodec, TokenError, TokenKind};
pub use one_time::OneTimeTokenIssuer;
pub use session::{LoginIdentifier, SessionManager, SessionTokens};
