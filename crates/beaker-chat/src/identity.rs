//! Identity service contract

use async_trait::async_trait;

/// The authenticated user behind a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
}

/// Resolves the current user/session.
///
/// Anonymous sessions (`None`) may chat but are never persisted.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn current_session(&self) -> Option<UserSession>;
}

/// An identity service that never authenticates anyone
pub struct Anonymous;

#[async_trait]
impl Identity for Anonymous {
    async fn current_session(&self) -> Option<UserSession> {
        None
    }
}

/// An identity service pinned to a single known user
pub struct StaticUser {
    user_id: String,
}

impl StaticUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl Identity for StaticUser {
    async fn current_session(&self) -> Option<UserSession> {
        Some(UserSession {
            user_id: self.user_id.clone(),
        })
    }
}
