//! Credential service: registration, login and token validation.

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::UserRepository;
use crate::utils::jwt::{self, Claims};
use crate::utils::password;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Hashes passwords, checks credentials and issues HS256 session tokens.
///
/// The signing settings are fixed at construction and shared read-only.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: JwtConfig) -> Self {
        Self {
            users,
            jwt: Arc::new(jwt),
        }
    }

    /// Registers a user with an Argon2id hash of `password`.
    ///
    /// # Errors
    /// `AppError::Duplicate` when the username is already taken
    pub async fn register(&self, username: String, password: String) -> AppResult<User> {
        let password_hash = run_blocking(move || password::hash_password(&password)).await?;

        let user = self
            .users
            .create(NewUser {
                username,
                password: password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues a token.
    ///
    /// Unknown usernames and wrong passwords fail with the same error, and
    /// both pay for one hash verification.
    pub async fn login(&self, username: &str, password: String) -> AppResult<String> {
        let user = self.users.find_by_username(username).await?;

        let verified = match user {
            Some(user) => {
                let hash = user.password.clone();
                let ok = run_blocking(move || password::verify_password(&password, &hash)).await?;
                ok.then_some(user)
            }
            None => {
                run_blocking(move || {
                    password::verify_against_dummy(&password);
                    Ok(())
                })
                .await?;
                None
            }
        };

        let Some(user) = verified else {
            tracing::info!(username = %username, "Login rejected");
            return Err(AppError::Unauthorized {
                message: INVALID_CREDENTIALS.to_string(),
            });
        };

        let token = jwt::generate_token(
            user.id,
            user.username.clone(),
            &self.jwt.secret,
            self.jwt.expiration_hours,
        )?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(token)
    }

    /// Verifies signature and expiry of a bearer token.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        jwt::validate_token(token, &self.jwt.secret)
    }
}

/// Runs CPU-bound password hashing off the async worker threads
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
}
