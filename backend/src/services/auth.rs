//! Account creation and credential checks
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{NewUser, UserRepository, UserStoreError};
use acquisitions_shared::{SignInInput, SignupInput, UserResponse};
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;

/// Generic message for failed sign-in; never reveals which check failed
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Verified against when the email is unknown, so both sign-in failures
/// cost one argon2 verification
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordService::hash("unknown-account-placeholder").ok());

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateEmail => AuthError::DuplicateEmail,
            UserStoreError::Database(e) => AuthError::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::Conflict("Email already exists".to_string()),
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::Database(e) => ApiError::Database(e),
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        AuthError::from(err).into()
    }
}

/// Authentication operations over a [`UserRepository`]
pub struct AuthService;

impl AuthService {
    /// Create a user unless the email is already taken.
    ///
    /// The pre-insert lookup gives the common case a clean error; the store's
    /// unique constraint still decides races between concurrent signups.
    pub async fn create_user(
        users: &dyn UserRepository,
        input: &SignupInput,
    ) -> Result<UserResponse, AuthError> {
        if users.email_exists(&input.email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = PasswordService::hash_async(input.password.clone()).await?;

        let user = users
            .create(NewUser {
                name: &input.name,
                email: &input.email,
                password_hash: &password_hash,
                role: input.role,
            })
            .await?;

        debug!(user_id = %user.id, "User record created");
        Ok(user.to_public())
    }

    /// Check an email/password pair
    pub async fn authenticate_user(
        users: &dyn UserRepository,
        input: &SignInInput,
    ) -> Result<UserResponse, AuthError> {
        let Some(user) = users.find_by_email(&input.email).await? else {
            burn_verification(input.password.clone()).await;
            return Err(AuthError::UserNotFound);
        };

        let valid =
            PasswordService::verify_async(input.password.clone(), user.password_hash.clone())
                .await?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.to_public())
    }
}

/// Run one throwaway verification against [`DUMMY_HASH`]
async fn burn_verification(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = PasswordService::verify(&password, hash);
        }
    })
    .await;
}
