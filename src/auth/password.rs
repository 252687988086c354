//! Credential rules: the password policy, Argon2 hashing, and login checks.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AppError, FieldError};

pub const MIN_PASSWORD_LEN: usize = 7;

lazy_static! {
    // Stand-in hash verified when the login email matches no account.
    static ref ABSENT_ACCOUNT_HASH: Option<String> =
        hash_password("absent-account-placeholder").ok();
}

/// Policy applied on registration and on password change.
pub fn check_password(plain: &str) -> Result<(), FieldError> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if plain.to_lowercase().contains("password") {
        return Err(FieldError::new(
            "password",
            "cannot include the word 'password'",
        ));
    }
    Ok(())
}

/// Checks the policy, then hashes. A policy failure is a `Validation` error.
pub fn hash_new_password(plain: &str) -> Result<String, AppError> {
    check_password(plain).map_err(|e| AppError::Validation(vec![e]))?;
    Ok(hash_password(plain)?)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Verifies a login attempt against the stored hash, if there is one.
/// Without an account the attempt still runs one Argon2 verification, so
/// both failure paths cost the same.
pub fn verify_login(plain: &str, stored: Option<&str>) -> anyhow::Result<bool> {
    match stored {
        Some(hash) => verify_password(plain, hash),
        None => {
            if let Some(hash) = ABSENT_ACCOUNT_HASH.as_deref() {
                verify_password(plain, hash)?;
            }
            Ok(false)
        }
    }
}
