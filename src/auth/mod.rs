//! Account authentication: password hashing, bearer tokens and the
//! extractor that guards routes.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::AuthUser;
pub use token::{Claims, TokenIssuer};
