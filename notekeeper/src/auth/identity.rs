//! Find-or-create identity resolution keyed on email.

use super::{
    errors::{AuthError, AuthResult},
    models::{NewUser, User, UserId},
};
use crate::db::UserRepository;
use std::sync::Arc;

/// Resolves verified emails to user records
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepository>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Look up a user by email
    pub async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    /// Look up a user by ID
    pub async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    /// Return the user for `attributes.email`, creating it when absent
    ///
    /// Existing records are returned untouched. When a concurrent call creates
    /// the same email first, the winner's record is returned.
    pub async fn resolve_or_create(&self, attributes: NewUser) -> AuthResult<User> {
        if let Some(user) = self.users.find_by_email(&attributes.email).await? {
            return Ok(user);
        }

        match self.users.create_user(&attributes).await {
            Ok(user) => {
                log::info!("Created user {} for {}", user.id, user.email);
                Ok(user)
            }
            Err(AuthError::UserAlreadyExists) => self
                .users
                .find_by_email(&attributes.email)
                .await?
                .ok_or(AuthError::UserNotFound),
            Err(e) => Err(e),
        }
    }

    /// Create a user, failing if the email is taken
    ///
    /// # Errors
    ///
    /// * `AuthError::UserAlreadyExists` - A user with this email exists
    pub async fn create(&self, attributes: NewUser) -> AuthResult<User> {
        let user = self.users.create_user(&attributes).await?;
        log::info!("Created user {} for {}", user.id, user.email);
        Ok(user)
    }
}
