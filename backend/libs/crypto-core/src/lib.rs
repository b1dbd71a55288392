//! Credential primitives shared by CondoVoice services
//!
//! - `jwt`: RS256 access/refresh tokens for residents
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use jwt::{Claims, TokenPair, TokenType};
pub use password::{hash_password, verify_password, PasswordError};
