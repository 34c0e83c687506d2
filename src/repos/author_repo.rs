/*
 * Responsibility
 * - authors の参照 (id 検索のみ。作成・更新の API は持たない)
 * - 起動時の seed データを保持する
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

#[async_trait]
pub trait AuthorRepo: Send + Sync {
    async fn get(&self, author_id: i64) -> RepoResult<Option<AuthorRow>>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuthorRepo {
    authors: RwLock<BTreeMap<i64, AuthorRow>>,
}

impl InMemoryAuthorRepo {
    pub fn new(authors: impl IntoIterator<Item = AuthorRow>) -> Self {
        Self {
            authors: RwLock::new(authors.into_iter().map(|a| (a.id, a)).collect()),
        }
    }

    /// Authors 1 (John Steinbeck) and 2 (Harper Lee).
    pub fn seeded() -> Self {
        Self::new(seed::authors())
    }
}

#[async_trait]
impl AuthorRepo for InMemoryAuthorRepo {
    async fn get(&self, author_id: i64) -> RepoResult<Option<AuthorRow>> {
        Ok(self.authors.read().await.get(&author_id).cloned())
    }
}

pub(crate) mod seed {
    use chrono::NaiveDate;

    use super::AuthorRow;

    pub const STEINBECK: i64 = 1;
    pub const LEE: i64 = 2;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    pub fn authors() -> Vec<AuthorRow> {
        vec![
            AuthorRow {
                id: STEINBECK,
                first_name: "John".to_string(),
                last_name: "Steinbeck".to_string(),
                date_of_birth: date(1902, 2, 27),
                date_of_death: Some(date(1968, 12, 20)),
            },
            AuthorRow {
                id: LEE,
                first_name: "Harper".to_string(),
                last_name: "Lee".to_string(),
                date_of_birth: date(1926, 4, 28),
                date_of_death: Some(date(2016, 2, 19)),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_authors_are_found_by_id() {
        let repo = InMemoryAuthorRepo::seeded();

        let lee = repo.get(seed::LEE).await.unwrap().unwrap();
        assert_eq!(lee.last_name, "Lee");
        assert_eq!(lee.date_of_birth, NaiveDate::from_ymd_opt(1926, 4, 28).unwrap());

        assert!(repo.get(99).await.unwrap().is_none());
    }
}
