/*
 * Responsibility
 * - books CRUD (プロセス内。id は 1 からの連番)
 * - title の一意性はここで保証する (create / update とも、同じ title の別 book があれば Conflict)
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::repos::author_repo::seed as author_seed;
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub publish_date: NaiveDate,
    pub author_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub publish_date: NaiveDate,
    pub author_id: i64,
}

#[async_trait]
pub trait BookRepo: Send + Sync {
    async fn create(&self, book: NewBook) -> RepoResult<BookRow>;

    async fn get(&self, book_id: i64) -> RepoResult<Option<BookRow>>;

    // `Ok(None)` when the book does not exist.
    async fn update(&self, book_id: i64, book: NewBook) -> RepoResult<Option<BookRow>>;

    async fn delete(&self, book_id: i64) -> RepoResult<bool>;
}

#[derive(Debug, Default)]
struct Books {
    last_id: i64,
    rows: BTreeMap<i64, BookRow>,
}

impl Books {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|b| b.title == title && Some(b.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBookRepo {
    books: RwLock<Books>,
}

impl InMemoryBookRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three seed books of the two seed authors, ids 1..=3.
    pub fn seeded() -> Self {
        let mut books = Books::default();
        for (title, (y, m, d), author_id) in [
            ("The Grapes of Wrath", (1939, 4, 14), author_seed::STEINBECK),
            ("East of Eden", (1952, 9, 19), author_seed::STEINBECK),
            ("To Kill a Mockingbird", (1960, 7, 11), author_seed::LEE),
        ] {
            books.last_id += 1;
            let row = BookRow {
                id: books.last_id,
                title: title.to_string(),
                publish_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
                author_id,
            };
            books.rows.insert(row.id, row);
        }

        Self {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl BookRepo for InMemoryBookRepo {
    async fn create(&self, book: NewBook) -> RepoResult<BookRow> {
        let mut books = self.books.write().await;
        if books.title_taken(&book.title, None) {
            return Err(RepoError::Conflict);
        }

        books.last_id += 1;
        let row = BookRow {
            id: books.last_id,
            title: book.title,
            publish_date: book.publish_date,
            author_id: book.author_id,
        };
        books.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn get(&self, book_id: i64) -> RepoResult<Option<BookRow>> {
        Ok(self.books.read().await.rows.get(&book_id).cloned())
    }

    async fn update(&self, book_id: i64, book: NewBook) -> RepoResult<Option<BookRow>> {
        let mut books = self.books.write().await;
        if !books.rows.contains_key(&book_id) {
            return Ok(None);
        }
        if books.title_taken(&book.title, Some(book_id)) {
            return Err(RepoError::Conflict);
        }

        let row = BookRow {
            id: book_id,
            title: book.title,
            publish_date: book.publish_date,
            author_id: book.author_id,
        };
        books.rows.insert(book_id, row.clone());

        Ok(Some(row))
    }

    async fn delete(&self, book_id: i64) -> RepoResult<bool> {
        Ok(self.books.write().await.rows.remove(&book_id).is_some())
    }
}
