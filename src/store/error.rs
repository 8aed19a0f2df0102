use thiserror::Error;

/// Error taxonomy surfaced by every store and session operation.
///
/// Operations fail with exactly one of these kinds; the HTTP layer maps each
/// kind to a status code and a short human-readable message. There is no
/// retry model: the backing store is local, so failures are not transient.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The referenced record does not exist. Carries the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Sign-up attempted with an email that is already registered.
    #[error("email already in use")]
    DuplicateEmail,

    /// Sign-in attempted for an email no user record carries.
    #[error("user not found")]
    UserNotFound,

    /// Password reset requested for an unknown email.
    #[error("email not found")]
    EmailNotFound,

    /// A mutating session operation was attempted without a session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A required field was missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The underlying key-value adapter failed to read or write.
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_stable() {
        assert_eq!(VaultError::NotFound("work").to_string(), "work not found");
        assert_eq!(VaultError::DuplicateEmail.to_string(), "email already in use");
        assert_eq!(
            VaultError::Validation("title is required".into()).to_string(),
            "validation failed: title is required"
        );
    }
}
