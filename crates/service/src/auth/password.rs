//! Password hashing and verification (Argon2id, PHC string format).

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self { memory_kib, iterations, parallelism }
    }

    fn to_argon2(self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::hashing("password.params", e))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// OWASP minimum for Argon2id: 19 MiB, 2 passes, 1 lane
    fn default() -> Self {
        Self { memory_kib: 19456, iterations: 2, parallelism: 1 }
    }
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str, params: Argon2Params) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::hashing("password.hash", e))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash. A malformed hash never verifies.
///
/// Verification uses the parameters embedded in the hash itself.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}
