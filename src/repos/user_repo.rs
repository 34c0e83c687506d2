/*
 * Responsibility
 * - users の保存と email による検索
 * - 永続化は扱わない (プロセス内の HashMap。再起動で消える)
 * - email は小文字に正規化したものをキーにする
 */
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    // Fails with `RepoError::Conflict` when the email is already taken.
    async fn create(&self, user: NewUser) -> RepoResult<UserRow>;

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<String, UserRow>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        let key = user.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(RepoError::Conflict);
        }

        let row = UserRow {
            id: Uuid::new_v4(),
            email: key.clone(),
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
        };
        users.insert(key, row.clone());

        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let users = self.users.read().await;
        Ok(users.get(&email.to_lowercase()).cloned())
    }
}
