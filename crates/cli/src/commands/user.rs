//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! foodgram user create -e cook@example.com -u cook --first-name Ann --last-name Cook -p secret123
//! foodgram user delete -e cook@example.com
//! ```

use foodgram_core::Email;
use foodgram_server::db::UserRepository;
use foodgram_server::services::media::MediaStore;
use foodgram_server::services::{AuthService, Registration};

use super::{CommandError, connect};

/// Account details given on the command line.
#[derive(Debug)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Register a user through the same rules as the API.
///
/// # Errors
///
/// Returns an error if a field is invalid, the email or username is taken,
/// or the database is unreachable.
pub async fn create(account: NewAccount) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    let registration = Registration {
        email: account.email,
        username: account.username,
        first_name: account.first_name,
        last_name: account.last_name,
        password: account.password,
    };

    tracing::info!("Creating user: {}", registration.email);
    let user = AuthService::new(&pool).register(&registration).await?;

    tracing::info!(user_id = %user.id, "User created!");
    Ok(())
}

/// Delete a user, their recipes and every row pointing at either.
///
/// Images of the deleted recipes are removed afterwards.
///
/// # Errors
///
/// Returns an error if the email is invalid, no such user exists, or the
/// database is unreachable.
pub async fn delete(email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(format!("{email}: {e}")))?;
    let (config, pool) = connect().await?;

    tracing::info!("Deleting user: {email}");
    let images = UserRepository::new(&pool)
        .delete_cascade(&email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    let media = MediaStore::new(config.media_root, config.base_url);
    for image in &images {
        media.remove(image).await;
    }

    tracing::info!(recipes = images.len(), "User deleted!");
    Ok(())
}
