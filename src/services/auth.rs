use std::sync::Arc;

use crate::auth::{hash_password, verify_password, Registration, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, PublicUser};
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registers users and exchanges credentials for tokens.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService, hash_cost: u32) -> Self {
        Self {
            users,
            tokens,
            hash_cost,
        }
    }

    /// Hashes the password and stores the user.
    ///
    /// # Errors
    /// * `Conflict` - the email is already registered
    pub async fn register(&self, registration: Registration) -> Result<PublicUser, AppError> {
        let password_hash = hash_password(&registration.password, self.hash_cost).await?;

        let user = self
            .users
            .create(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: registration.role,
            })
            .await?;

        log::info!("Registered user {} as {}", user.id, user.role);
        Ok(user.into())
    }

    /// Verifies the credentials and issues a signed token.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            log::warn!("Login attempt for unknown email {}", email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &user.password).await? {
            log::warn!("Wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.tokens.generate_token(&user)
    }
}
