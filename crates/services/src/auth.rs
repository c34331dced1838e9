//! Identity boundary.
//!
//! Authentication lives outside this core: callers hand over an opaque
//! session token and the provider either resolves it to a user id or fails
//! with a detail-free `AuthError`.

use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::UserId;

use crate::error::AuthError;

/// Resolves an opaque session token to the calling user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token does not resolve.
    async fn authenticate(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Fixed token-to-user mapping for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, UserId>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_resolves() {
        let provider =
            StaticIdentityProvider::new().with_user("session-1", UserId::new("u1"));
        let user = provider.authenticate("session-1").await.unwrap();
        assert_eq!(user, UserId::new("u1"));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let provider = StaticIdentityProvider::new();
        assert_eq!(
            provider.authenticate("nope").await.unwrap_err(),
            AuthError::Unauthenticated
        );
    }
}
