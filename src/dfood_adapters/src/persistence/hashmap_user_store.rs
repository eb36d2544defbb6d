use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dfood_core::{Email, HashedPassword, User, UserId, UserStore, UserStoreError};
use tokio::sync::RwLock;

#[derive(Default)]
struct Users {
    by_email: HashMap<Email, User>,
    email_by_id: HashMap<UserId, Email>,
}

#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<Users>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .by_email
            .get(email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .email_by_id
            .get(id)
            .and_then(|email| users.by_email.get(email))
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserStoreError> {
        Ok(self.users.read().await.by_email.contains_key(email))
    }

    async fn insert(&self, user: User) -> Result<UserId, UserStoreError> {
        let mut users = self.users.write().await;
        if users.by_email.contains_key(user.email()) || users.email_by_id.contains_key(user.id())
        {
            return Err(UserStoreError::UserAlreadyExists);
        }
        let id = user.id().clone();
        users.email_by_id.insert(id.clone(), user.email().clone());
        users.by_email.insert(user.email().clone(), user);
        Ok(id)
    }

    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: HashedPassword,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users
            .by_email
            .remove(email)
            .ok_or(UserStoreError::UserNotFound)?;
        users.by_email.insert(
            email.clone(),
            user.with_password_hash(password_hash, Utc::now()),
        );
        Ok(())
    }

    async fn delete(&self, email: &Email) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users
            .by_email
            .remove(email)
            .ok_or(UserStoreError::UserNotFound)?;
        users.email_by_id.remove(user.id());
        Ok(())
    }
}
