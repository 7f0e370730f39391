use sqlx::SqlitePool;

use crate::config::Bootstrap;
use crate::error::ServiceError;
use crate::services::CredentialStore;

pub async fn create_user(pool: &SqlitePool, email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("email and password must not be empty".into());
    }

    let user = CredentialStore::new(pool.clone()).register(email, password).await?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Email: {}", user.email);

    Ok(())
}

/// Register the configured seed account, leaving an existing one in place.
pub async fn bootstrap_user(credentials: &CredentialStore, bootstrap: &Bootstrap) -> Result<(), ServiceError> {
    match credentials.register(&bootstrap.email, &bootstrap.password).await {
        Ok(_) => Ok(()),
        Err(ServiceError::DuplicateIdentity(email)) => {
            tracing::info!("bootstrap user {email} already exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
