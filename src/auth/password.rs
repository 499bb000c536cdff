use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way transform of a plaintext password into a storable digest.
/// A fresh salt is drawn on every call, so repeated hashes of the same
/// plaintext differ while all of them verify.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    verify(password, digest)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
