//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 默认配置为 OWASP 推荐参数：m=64MiB, t=3, p=4
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        Self::with_params(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored PHC hash.
    /// A mismatch is `InvalidCredentials`; an unparsable hash is an internal fault.
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }

    /// Validate password against policy
    pub fn validate_password_policy(password: &str, config: &SecurityConfig) -> Result<(), AppError> {
        if password.chars().count() < config.password_min_length {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                config.password_min_length
            )));
        }

        Ok(())
    }
}
