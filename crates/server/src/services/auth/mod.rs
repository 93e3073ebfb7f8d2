//! Authentication service.
//!
//! Password registration and login, API token issue and revocation, and
//! password changes. Passwords are hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::{Email, UserId, Username};

use crate::db::{RepositoryError, TokenRepository, UserRepository};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of first and last names.
const MAX_NAME_LENGTH: usize = 150;

/// Random bytes in an API token before encoding.
const TOKEN_BYTES: usize = 32;

/// Raw registration input, validated by [`AuthService::register`].
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `InvalidUsername`, `InvalidField` or
    /// `WeakPassword` for bad input, and `AuthError::UserAlreadyExists` if the
    /// email or username is taken.
    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        let email = Email::parse(&registration.email)?;
        let username = Username::parse(&registration.username)?;
        let first_name = validate_name("first_name", &registration.first_name)?;
        let last_name = validate_name("last_name", &registration.last_name)?;
        validate_password("password", &registration.password)?;

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .users
            .create(&NewUser {
                email,
                username,
                first_name,
                last_name,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(field) if field == "email" => {
                    AuthError::UserAlreadyExists { field: "email" }
                }
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists { field: "username" },
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and return the user's API token, issuing one if
    /// they have none.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash).map_err(|_| AuthError::InvalidCredentials)?;

        let token = self.tokens.get_or_create(user.id, &generate_token()).await?;
        tracing::info!(user_id = %user.id, "Token issued");
        Ok(token)
    }

    /// Revoke a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.delete(token).await?;
        Ok(())
    }

    /// Resolve an API token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if no user holds the token.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.tokens
            .find_user(token)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongPassword` if `current` does not match, or
    /// `AuthError::WeakPassword` if `new` is too short.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn set_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self.users.get_password_hash(user_id).await?;
        verify_password(current, &password_hash).map_err(|_| AuthError::WrongPassword)?;
        validate_password("new_password", new)?;

        let new_hash = hash_password(new)?;
        self.users.update_password(user_id, &new_hash).await?;

        tracing::info!("Password changed");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password meets requirements.
fn validate_password(field: &'static str, password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            field,
            message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
        });
    }

    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::InvalidField {
            field,
            message: "This field may not be blank.".to_string(),
        });
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidField {
            field,
            message: format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        });
    }
    Ok(value.to_string())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// A fresh random API token, URL-safe base64.
fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
