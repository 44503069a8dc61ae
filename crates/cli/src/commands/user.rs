//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! petcare user create -u alice -p secret
//! ```

use petcare_server::services::AuthService;

use super::CommandError;

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the username is invalid or taken, the password is
/// empty, or database operations fail.
pub async fn create(username: &str, password: &str) -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool).signup(username, password).await?;

    tracing::info!(user_id = %user.id, "Created user {}", user.username);
    Ok(())
}
