//! bcrypt password hashing with an explicit input bound.
//!
//! bcrypt only looks at the first 72 bytes of its input. Longer passwords are
//! rejected with [`HashError::TooLong`] instead of being silently truncated.

use bcrypt::BcryptError;
use thiserror::Error;

/// Largest password bcrypt accepts, in bytes of UTF-8.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Lowest cost factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password is {len} bytes, the limit is 72")]
    TooLong { len: usize },

    #[error("stored password hash is invalid: {0}")]
    InvalidHash(String),

    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] BcryptError),
}

/// Salted one-way hashing with a tunable cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong {
                len: password.len(),
            });
        }

        // Within the bound bcrypt sees every byte; only its NUL terminator can be cut.
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Checks `password` against a stored hash. The digest comparison inside
    /// bcrypt is constant time. Oversized input can never match since it could
    /// never have been hashed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        match bcrypt::verify(password, hash) {
            Ok(matches) => Ok(matches),
            Err(BcryptError::InvalidHash(reason)) => Err(HashError::InvalidHash(reason)),
            Err(e) => Err(HashError::Bcrypt(e)),
        }
    }
}
